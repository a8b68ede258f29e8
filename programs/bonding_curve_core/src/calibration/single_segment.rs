//! One segment curves from a supply share and a quote threshold, or from two market caps.

use crate::calibration::params::{BuildCurveParams, BuildCurveWithMarketCapParams, CommonCurveParams};
use crate::calibration::supply::{
    fit_curve_to_supply, get_liquidity, get_migration_base_token,
    get_migration_quote_amount, get_percentage_supply_on_migration, CurveBody,
};
use crate::error::CurveError;
use crate::math::decimal_math::{
    convert_to_lamports, decimal_floor_to_u128, decimal_from_f64, decimal_from_u128,
};
use crate::math::price_math::get_sqrt_price_from_price;
use crate::state::{ConfigParameters, CurveSegment};
use crate::utils::constants::MIN_SQRT_PRICE;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use tracing::{debug, warn};

/// Start price and single segment selling `swap_amount` between the start price and
/// `sqrt_migration_price` while collecting `migration_quote_threshold`.
///
/// # Arguments
/// * `sqrt_migration_price` - Upper bound of the segment.
/// * `migration_base_amount` - Base deposited in the migrated pool.
/// * `swap_amount` - Base sold along the segment.
/// * `migration_quote_threshold` - Quote collected once the segment is exhausted.
/// * `migration_fee_percentage` - Share of the collected quote withheld at migration.
/// # Returns
/// * `Result<(u128, Vec<CurveSegment>)>` - The start sqrt price and the one segment curve.
pub fn get_first_curve(
    sqrt_migration_price: u128,
    migration_base_amount: u64,
    swap_amount: u64,
    migration_quote_threshold: u64,
    migration_fee_percentage: u8,
) -> Result<(u128, Vec<CurveSegment>)> {
    require!(
        migration_fee_percentage < 100,
        CurveError::InvalidMigrationFee
    );
    let denominator = BigDecimal::from(swap_amount)
        * BigDecimal::from(100 - migration_fee_percentage)
        / BigDecimal::from(100u8);
    require!(!denominator.is_zero(), CurveError::DivisionByZero);

    let sqrt_start_price = decimal_floor_to_u128(
        &(decimal_from_u128(sqrt_migration_price) * BigDecimal::from(migration_base_amount)
            / denominator),
    )?;
    if sqrt_start_price < MIN_SQRT_PRICE || sqrt_start_price >= sqrt_migration_price {
        warn!(
            sqrt_start_price,
            sqrt_migration_price, "start price outside the curve range"
        );
        return err!(CurveError::InvalidCurve);
    }

    let liquidity = get_liquidity(
        swap_amount,
        migration_quote_threshold,
        sqrt_start_price,
        sqrt_migration_price,
    )?;
    require!(liquidity > 0, CurveError::InvalidCurve);

    Ok((
        sqrt_start_price,
        vec![CurveSegment {
            sqrt_price: sqrt_migration_price,
            liquidity,
        }],
    ))
}

/// Builds a one segment curve that sells everything but the migration supply,
/// vesting and leftover before collecting `migration_quote_threshold`.
pub fn build_curve(params: &BuildCurveParams) -> Result<ConfigParameters> {
    build_single_segment(
        &params.common,
        &decimal_from_f64(params.percentage_supply_on_migration)?,
        &decimal_from_f64(params.migration_quote_threshold)?,
    )
}

/// Builds a one segment curve running from `initial_market_cap` to
/// `migration_market_cap`.
///
/// The supply share left for migration follows from the ratio of the two caps and the
/// quote threshold is grossed up by the migration fee.
pub fn build_curve_with_market_cap(params: &BuildCurveWithMarketCapParams) -> Result<ConfigParameters> {
    let common = &params.common;
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
    require!(
        common.migration_fee.fee_percentage < 100,
        CurveError::InvalidMigrationFee
    );

    let supply = common.supply_inputs()?;
    let percentage_supply_on_migration = get_percentage_supply_on_migration(
        &initial_market_cap,
        &migration_market_cap,
        supply.total_vesting_amount,
        supply.total_leftover,
        supply.total_supply,
    )?;
    let migration_quote_amount =
        get_migration_quote_amount(&migration_market_cap, &percentage_supply_on_migration);
    let migration_quote_threshold = migration_quote_amount * BigDecimal::from(100u8)
        / BigDecimal::from(100 - common.migration_fee.fee_percentage);
    debug!(
        percentage_supply_on_migration = %percentage_supply_on_migration,
        migration_quote_threshold = %migration_quote_threshold,
        "derived single segment targets from market caps"
    );

    build_single_segment(
        common,
        &percentage_supply_on_migration,
        &migration_quote_threshold,
    )
}

fn build_single_segment(
    common: &CommonCurveParams,
    percentage_supply_on_migration: &BigDecimal,
    migration_quote_threshold: &BigDecimal,
) -> Result<ConfigParameters> {
    let hundred = BigDecimal::from(100u8);
    if *percentage_supply_on_migration <= BigDecimal::zero()
        || *percentage_supply_on_migration >= hundred
    {
        warn!(
            percentage_supply_on_migration = %percentage_supply_on_migration,
            "migration supply share must lie in (0, 100)"
        );
        return err!(CurveError::InvalidConfiguration);
    }
    require!(
        *migration_quote_threshold > BigDecimal::zero(),
        CurveError::InvalidQuoteThreshold
    );
    let migration_fee_percentage = common.migration_fee.fee_percentage;
    require!(
        migration_fee_percentage < 100,
        CurveError::InvalidMigrationFee
    );

    let supply = common.supply_inputs()?;
    let migration_base_supply =
        BigDecimal::from(common.total_token_supply) * percentage_supply_on_migration / &hundred;
    let migration_quote_amount = migration_quote_threshold
        * BigDecimal::from(100 - migration_fee_percentage)
        / &hundred;
    let migration_price = &migration_quote_amount / migration_base_supply;
    let sqrt_migration_price = get_sqrt_price_from_price(
        &migration_price,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;

    let migration_quote_threshold =
        convert_to_lamports(migration_quote_threshold, common.token_quote_decimal)?;
    let migration_quote_amount =
        convert_to_lamports(&migration_quote_amount, common.token_quote_decimal)?;
    let migration_base_amount = get_migration_base_token(
        migration_quote_amount,
        sqrt_migration_price,
        common.migration_option,
    )?;

    let reserved = u128::from(migration_base_amount)
        + u128::from(supply.total_vesting_amount)
        + u128::from(supply.total_leftover);
    if reserved >= u128::from(supply.total_supply) {
        warn!(
            total_supply = supply.total_supply,
            migration_base_amount,
            total_vesting_amount = supply.total_vesting_amount,
            total_leftover = supply.total_leftover,
            "nothing left to sell on the curve"
        );
        return err!(CurveError::InvalidTokenSupply);
    }
    let swap_amount = supply.total_supply - reserved as u64;

    let body = fit_curve_to_supply(
        |target| {
            let (sqrt_start_price, curve) = get_first_curve(
                sqrt_migration_price,
                migration_base_amount,
                target,
                migration_quote_threshold,
                migration_fee_percentage,
            )?;
            Ok(Some(CurveBody {
                sqrt_start_price,
                curve,
                migration_quote_threshold,
            }))
        },
        swap_amount,
        supply.total_supply,
        sqrt_migration_price,
        &supply.locked_vesting,
        common.migration_option,
        supply.total_leftover,
        migration_fee_percentage,
    )?
    .ok_or(CurveError::InvalidCurve)?;
    debug!(
        sqrt_start_price = body.sqrt_start_price,
        sqrt_migration_price,
        segments = body.curve.len(),
        "built single segment curve"
    );

    common.to_config_parameters(
        supply.locked_vesting,
        body.migration_quote_threshold,
        body.sqrt_start_price,
        body.curve,
    )
}
