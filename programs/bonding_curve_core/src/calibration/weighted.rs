//! Multi segment curves whose liquidities are fixed multiples of one scalar.
//!
//! Segment `i` spans `[p_(i-1), p_i]` with liquidity `w_i * l1`. `l1` is chosen so the
//! base sold across the curve plus the base the migrated pool needs at the final price
//! add up to everything not vested or left over. Curves with fewer than
//! `MAX_CURVE_POINT` segments get a tail segment for whatever supply remains.

use crate::calibration::params::{
    BuildCurveWithCustomSqrtPricesParams, BuildCurveWithLiquidityWeightsParams, CommonCurveParams,
};
use crate::calibration::supply::{
    fit_curve_to_supply, get_base_token_for_swap, get_swap_amount_with_buffer, CurveBody,
};
use crate::error::CurveError;
use crate::math::core_arithmetic::{mul_div_u64, Rounding};
use crate::math::decimal_math::{
    bigint_to_u128, decimal_floor_to_u128, decimal_from_f64, decimal_from_u128, decimal_nth_root,
    decimal_pow,
};
use crate::math::price_math::get_sqrt_price_from_market_cap;
use crate::state::{ConfigParameters, CurveSegment};
use crate::utils::constants::{MAX_CURVE_POINT, MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::{debug, trace, warn};

/// Builds a curve of `MAX_CURVE_POINT` segments spaced geometrically between the
/// initial and migration market cap prices.
///
/// # Arguments
/// * `params` - Market caps plus exactly one positive weight per segment.
/// # Returns
/// * `Result<ConfigParameters>` - The config with the calibrated curve, or
///   `InvalidConfiguration` when the weights do not match the segment count.
pub fn build_curve_with_liquidity_weights(
    params: &BuildCurveWithLiquidityWeightsParams,
) -> Result<ConfigParameters> {
    let common = &params.common;
    if params.liquidity_weights.len() != MAX_CURVE_POINT {
        warn!(
            weights = params.liquidity_weights.len(),
            expected = MAX_CURVE_POINT,
            "liquidity weight count does not match the segment count"
        );
        return err!(CurveError::InvalidConfiguration);
    }
    let initial_market_cap = decimal_from_f64(params.initial_market_cap)?;
    let migration_market_cap = decimal_from_f64(params.migration_market_cap)?;
    if initial_market_cap <= BigDecimal::zero() || migration_market_cap <= initial_market_cap {
        warn!(
            initial_market_cap = params.initial_market_cap,
            migration_market_cap = params.migration_market_cap,
            "migration market cap must exceed a positive initial market cap"
        );
        return err!(CurveError::InvalidConfiguration);
    }

    let sqrt_min_price = get_sqrt_price_from_market_cap(
        &initial_market_cap,
        common.total_token_supply,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;
    let sqrt_max_price = get_sqrt_price_from_market_cap(
        &migration_market_cap,
        common.total_token_supply,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;

    let ratio = decimal_from_u128(sqrt_max_price) / decimal_from_u128(sqrt_min_price);
    let step = decimal_nth_root(&ratio, MAX_CURVE_POINT as u32)?;
    let min_price = decimal_from_u128(sqrt_min_price);
    let mut sqrt_prices = Vec::with_capacity(MAX_CURVE_POINT + 1);
    for i in 0..MAX_CURVE_POINT {
        sqrt_prices.push(decimal_floor_to_u128(
            &(&min_price * decimal_pow(&step, i as u32)),
        )?);
    }
    sqrt_prices.push(sqrt_max_price);

    build_weighted_curve(common, &sqrt_prices, &params.liquidity_weights)
}

/// Builds a curve over caller supplied boundaries. The first price is the start price
/// and each following one closes a segment; weights default to equal.
pub fn build_curve_with_custom_sqrt_prices(
    params: &BuildCurveWithCustomSqrtPricesParams,
) -> Result<ConfigParameters> {
    let sqrt_prices = &params.sqrt_prices;
    let segment_count = sqrt_prices.len().saturating_sub(1);
    if segment_count == 0 || segment_count > MAX_CURVE_POINT {
        warn!(
            sqrt_prices = sqrt_prices.len(),
            "custom curve needs between 2 and 17 sqrt prices"
        );
        return err!(CurveError::InvalidConfiguration);
    }

    let weights = match &params.liquidity_weights {
        Some(weights) if weights.len() != segment_count => {
            warn!(
                weights = weights.len(),
                expected = segment_count,
                "liquidity weight count does not match the segment count"
            );
            return err!(CurveError::InvalidConfiguration);
        }
        Some(weights) => weights.clone(),
        None => vec![1.0; segment_count],
    };

    build_weighted_curve(&params.common, sqrt_prices, &weights)
}

fn build_weighted_curve(
    common: &CommonCurveParams,
    sqrt_prices: &[u128],
    weights: &[f64],
) -> Result<ConfigParameters> {
    let sqrt_start_price = sqrt_prices[0];
    let sqrt_migration_price = sqrt_prices[sqrt_prices.len() - 1];
    require!(
        sqrt_start_price >= MIN_SQRT_PRICE && sqrt_migration_price < MAX_SQRT_PRICE,
        CurveError::InvalidSqrtPrice
    );
    if sqrt_prices.windows(2).any(|pair| pair[1] <= pair[0]) {
        warn!("curve sqrt prices must be strictly increasing");
        return err!(CurveError::InvalidCurve);
    }

    let weights = weights
        .iter()
        .map(|weight| decimal_from_f64(*weight))
        .collect::<Result<Vec<_>>>()?;
    if weights.iter().any(|weight| *weight <= BigDecimal::zero()) {
        warn!("liquidity weights must be positive");
        return err!(CurveError::InvalidConfiguration);
    }

    let migration_fee_percentage = common.migration_fee.fee_percentage;
    require!(
        migration_fee_percentage < 100,
        CurveError::InvalidMigrationFee
    );
    let supply = common.supply_inputs()?;
    let reserved = u128::from(supply.total_vesting_amount) + u128::from(supply.total_leftover);
    if reserved >= u128::from(supply.total_supply) {
        warn!(
            total_supply = supply.total_supply,
            total_vesting_amount = supply.total_vesting_amount,
            total_leftover = supply.total_leftover,
            "nothing left for the curve and the migration"
        );
        return err!(CurveError::InvalidTokenSupply);
    }
    let swap_and_migration_amount = supply.total_supply - reserved as u64;

    // base per unit of liquidity sold in a band, plus the base its quote buys at the
    // migration price net of the migration fee
    let fee_factor =
        BigDecimal::from(100 - migration_fee_percentage) / BigDecimal::from(100u8);
    let max_price = decimal_from_u128(sqrt_migration_price);
    let max_price_squared = &max_price * &max_price;
    let mut sum_factor = BigDecimal::zero();
    for (i, weight) in weights.iter().enumerate() {
        let lower = decimal_from_u128(sqrt_prices[i]);
        let upper = decimal_from_u128(sqrt_prices[i + 1]);
        let delta = &upper - &lower;
        let base_factor = &delta / (&lower * &upper);
        let migration_factor = &delta * &fee_factor / &max_price_squared;
        sum_factor += weight * (base_factor + migration_factor);
    }
    require!(!sum_factor.is_zero(), CurveError::DivisionByZero);

    let body = fit_curve_to_supply(
        |target| {
            let first_liquidity = BigDecimal::from(target) / &sum_factor;
            let mut curve = Vec::with_capacity(weights.len());
            for (i, weight) in weights.iter().enumerate() {
                let liquidity = decimal_floor_to_u128(&(weight * &first_liquidity))?;
                require!(liquidity > 0, CurveError::InvalidCurve);
                curve.push(CurveSegment {
                    sqrt_price: sqrt_prices[i + 1],
                    liquidity,
                });
            }
            let migration_quote_threshold = get_weighted_migration_quote_threshold(
                &curve,
                target,
                sqrt_start_price,
                sqrt_migration_price,
                migration_fee_percentage,
            )?;
            Ok(Some(CurveBody {
                sqrt_start_price,
                curve,
                migration_quote_threshold,
            }))
        },
        swap_and_migration_amount,
        supply.total_supply,
        sqrt_migration_price,
        &supply.locked_vesting,
        common.migration_option,
        supply.total_leftover,
        migration_fee_percentage,
    )?
    .ok_or(CurveError::InvalidCurve)?;
    debug!(
        segments = body.curve.len(),
        migration_quote_threshold = body.migration_quote_threshold,
        "built weighted curve"
    );

    common.to_config_parameters(
        supply.locked_vesting,
        body.migration_quote_threshold,
        body.sqrt_start_price,
        body.curve,
    )
}

/// Quote threshold that migrates whatever `swap_and_migration_amount` has left once the
/// buffered curve sale is taken out, valued at the migration price and grossed up by
/// the migration fee.
fn get_weighted_migration_quote_threshold(
    curve: &[CurveSegment],
    swap_and_migration_amount: u64,
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    migration_fee_percentage: u8,
) -> Result<u64> {
    let swap_base_amount = get_base_token_for_swap(sqrt_start_price, sqrt_migration_price, curve)?;
    let swap_base_amount_with_buffer =
        get_swap_amount_with_buffer(swap_base_amount, sqrt_start_price, curve)?;
    let migration_amount = swap_and_migration_amount
        .checked_sub(swap_base_amount_with_buffer)
        .ok_or(CurveError::SupplyOverrun)?;

    let migration_quote_amount = (BigInt::from(migration_amount)
        * BigInt::from(sqrt_migration_price)
        * BigInt::from(sqrt_migration_price))
        >> 128u32;
    let migration_quote_amount = u64::try_from(bigint_to_u128(&migration_quote_amount)?)
        .map_err(|_| CurveError::MathOverflow)?;
    let migration_quote_threshold = mul_div_u64(
        migration_quote_amount,
        100,
        100 - u64::from(migration_fee_percentage),
        Rounding::Down,
    )?;
    require!(
        migration_quote_threshold > 0,
        CurveError::InvalidQuoteThreshold
    );
    trace!(
        swap_base_amount,
        migration_amount,
        migration_quote_threshold,
        "weighted migration threshold"
    );
    Ok(migration_quote_threshold)
}
