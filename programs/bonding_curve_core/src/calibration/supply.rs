//! Supply accounting shared by every curve builder and by the config validator.
//!
//! All amounts are raw token units. The migration threshold price is found by walking
//! the curve the same way config creation does, so the numbers here line up with what
//! the pool will actually hold at migration.

use crate::error::CurveError;
use crate::math::core_arithmetic::{div_u256, mul_div_u64, to_u128, to_u64, Rounding};
use crate::math::decimal_math::{bigint_to_u128, decimal_sqrt};
use crate::math::liquidity_math::{
    get_delta_amount_base_unsigned, get_delta_amount_base_unsigned_256,
    get_delta_amount_quote_unsigned_256, get_next_sqrt_price_from_input,
};
use crate::state::{CurveSegment, LockedVestingParams, MigrationOption};
use crate::utils::constants::*;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use ethnum::U256;
use num_bigint::BigInt;
use num_traits::{One, Zero};
use tracing::{debug, warn};

/// Quote that reaches the migrated pool once the migration fee is withheld.
pub fn get_migration_quote_amount_from_migration_quote_threshold(
    migration_quote_threshold: u64,
    migration_fee_percentage: u8,
) -> Result<u64> {
    require!(
        migration_fee_percentage <= 100,
        CurveError::InvalidMigrationFee
    );
    mul_div_u64(
        migration_quote_threshold,
        100 - u64::from(migration_fee_percentage),
        100,
        Rounding::Down,
    )
}

/// Inverse of [`get_migration_quote_amount_from_migration_quote_threshold`], rounded up.
pub fn get_migration_quote_threshold_from_migration_quote_amount(
    migration_quote_amount: u64,
    migration_fee_percentage: u8,
) -> Result<u64> {
    require!(
        migration_fee_percentage < 100,
        CurveError::InvalidMigrationFee
    );
    mul_div_u64(
        migration_quote_amount,
        100,
        100 - u64::from(migration_fee_percentage),
        Rounding::Up,
    )
}

/// Base tokens deposited next to `migration_quote_amount` in the migrated pool.
///
/// Constant product pools take `quote / price` rounded up. Concentrated pools hold the
/// quote as liquidity over `[MIN_SQRT_PRICE, price]` and need the base side of that
/// liquidity over `[price, MAX_SQRT_PRICE]`.
pub fn get_migration_base_token(
    migration_quote_amount: u64,
    sqrt_migration_price: u128,
    migration_option: MigrationOption,
) -> Result<u64> {
    match migration_option {
        MigrationOption::DammV1 => {
            let price = U256::from(sqrt_migration_price) * U256::from(sqrt_migration_price);
            let quote = U256::from(migration_quote_amount) << 128u32;
            to_u64(div_u256(quote, price, Rounding::Up)?)
        }
        MigrationOption::DammV2 => {
            let liquidity = get_initial_liquidity_from_delta_quote(
                migration_quote_amount,
                MIN_SQRT_PRICE,
                sqrt_migration_price,
            )?;
            get_delta_amount_base_unsigned(
                sqrt_migration_price,
                MAX_SQRT_PRICE,
                liquidity,
                Rounding::Up,
            )
        }
    }
}

/// `(quote << 128) / (sqrt_price - sqrt_min_price)`
pub fn get_initial_liquidity_from_delta_quote(
    quote_amount: u64,
    sqrt_min_price: u128,
    sqrt_price: u128,
) -> Result<u128> {
    let price_delta = sqrt_price.safe_sub(sqrt_min_price)?;
    require!(price_delta > 0, CurveError::DivisionByZero);
    let quote_shifted = U256::from(quote_amount) << 128u32;
    to_u128(quote_shifted / U256::from(price_delta))
}

/// `base * sqrt_price * sqrt_max_price / (sqrt_max_price - sqrt_price)`
pub fn get_initial_liquidity_from_delta_base(
    base_amount: u64,
    sqrt_max_price: u128,
    sqrt_price: u128,
) -> Result<u128> {
    let price_delta = sqrt_max_price.safe_sub(sqrt_price)?;
    require!(price_delta > 0, CurveError::DivisionByZero);
    let product = BigInt::from(base_amount) * BigInt::from(sqrt_price) * BigInt::from(sqrt_max_price);
    bigint_to_u128(&(product / BigInt::from(price_delta)))
}

/// Largest liquidity over `[min, max]` that needs neither more than `base_amount` nor
/// more than `quote_amount`.
pub fn get_liquidity(
    base_amount: u64,
    quote_amount: u64,
    min_sqrt_price: u128,
    max_sqrt_price: u128,
) -> Result<u128> {
    let liquidity_from_base =
        get_initial_liquidity_from_delta_base(base_amount, max_sqrt_price, min_sqrt_price)?;
    let liquidity_from_quote =
        get_initial_liquidity_from_delta_quote(quote_amount, min_sqrt_price, max_sqrt_price)?;
    Ok(liquidity_from_base.min(liquidity_from_quote))
}

/// Sqrt price at which the curve has absorbed `migration_quote_threshold`.
pub fn get_migration_threshold_price(
    migration_quote_threshold: u64,
    sqrt_start_price: u128,
    curve: &[CurveSegment],
) -> Result<u128> {
    require!(!curve.is_empty(), CurveError::InvalidCurve);
    let mut next_sqrt_price = sqrt_start_price;
    let mut amount_left = migration_quote_threshold;

    for segment in curve {
        let max_amount = get_delta_amount_quote_unsigned_256(
            next_sqrt_price,
            segment.sqrt_price,
            segment.liquidity,
            Rounding::Up,
        )?;
        if max_amount > U256::from(amount_left) {
            next_sqrt_price = get_next_sqrt_price_from_input(
                next_sqrt_price,
                segment.liquidity,
                amount_left,
                false,
            )?;
            amount_left = 0;
            break;
        }
        amount_left = amount_left.safe_sub(max_amount.as_u64())?;
        next_sqrt_price = segment.sqrt_price;
    }

    if amount_left > 0 {
        warn!(
            migration_quote_threshold,
            amount_left, "curve cannot absorb the migration quote threshold"
        );
        return err!(CurveError::InsufficientLiquidity);
    }
    Ok(next_sqrt_price)
}

/// Base tokens sold along the curve between the start price and `sqrt_migration_price`.
pub fn get_base_token_for_swap(
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    curve: &[CurveSegment],
) -> Result<u64> {
    let mut total_amount = U256::ZERO;
    for (i, segment) in curve.iter().enumerate() {
        let lower_sqrt_price = match i {
            0 => sqrt_start_price,
            _ => curve[i - 1].sqrt_price,
        };
        if segment.sqrt_price > sqrt_migration_price {
            let delta = get_delta_amount_base_unsigned_256(
                lower_sqrt_price,
                sqrt_migration_price,
                segment.liquidity,
                Rounding::Up,
            )?;
            total_amount = total_amount.safe_add(delta)?;
            break;
        }
        let delta = get_delta_amount_base_unsigned_256(
            lower_sqrt_price,
            segment.sqrt_price,
            segment.liquidity,
            Rounding::Up,
        )?;
        total_amount = total_amount.safe_add(delta)?;
    }
    to_u64(total_amount)
}

/// Swap supply padded by `SWAP_BUFFER_PERCENTAGE`, capped at everything the curve can sell.
pub fn get_swap_amount_with_buffer(
    swap_base_amount: u64,
    sqrt_start_price: u128,
    curve: &[CurveSegment],
) -> Result<u64> {
    let buffer = mul_div_u64(swap_base_amount, SWAP_BUFFER_PERCENTAGE, 100, Rounding::Down)?;
    let swap_amount_with_buffer = swap_base_amount.safe_add(buffer)?;
    let max_base_amount_on_curve =
        get_base_token_for_swap(sqrt_start_price, MAX_SQRT_PRICE, curve)?;
    Ok(swap_amount_with_buffer.min(max_base_amount_on_curve))
}

/// Breakdown of the base supply a curve needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurveSupply {
    pub sqrt_migration_price: u128,
    pub swap_base_amount: u64,
    pub swap_base_amount_with_buffer: u64,
    pub migration_base_amount: u64,
}

impl CurveSupply {
    pub fn compute(
        migration_quote_threshold: u64,
        sqrt_start_price: u128,
        curve: &[CurveSegment],
        migration_option: MigrationOption,
        migration_fee_percentage: u8,
    ) -> Result<Self> {
        let sqrt_migration_price =
            get_migration_threshold_price(migration_quote_threshold, sqrt_start_price, curve)?;
        let swap_base_amount =
            get_base_token_for_swap(sqrt_start_price, sqrt_migration_price, curve)?;
        let swap_base_amount_with_buffer =
            get_swap_amount_with_buffer(swap_base_amount, sqrt_start_price, curve)?;
        let migration_quote_amount = get_migration_quote_amount_from_migration_quote_threshold(
            migration_quote_threshold,
            migration_fee_percentage,
        )?;
        let migration_base_amount =
            get_migration_base_token(migration_quote_amount, sqrt_migration_price, migration_option)?;
        Ok(Self {
            sqrt_migration_price,
            swap_base_amount,
            swap_base_amount_with_buffer,
            migration_base_amount,
        })
    }
}

/// Minimum pre-migration supply: buffered swap amount, migration amount, vesting and leftover.
pub fn get_total_supply_from_curve(
    migration_quote_threshold: u64,
    sqrt_start_price: u128,
    curve: &[CurveSegment],
    locked_vesting: &LockedVestingParams,
    migration_option: MigrationOption,
    leftover: u64,
    migration_fee_percentage: u8,
) -> Result<u64> {
    let supply = CurveSupply::compute(
        migration_quote_threshold,
        sqrt_start_price,
        curve,
        migration_option,
        migration_fee_percentage,
    )?;
    supply
        .swap_base_amount_with_buffer
        .safe_add(supply.migration_base_amount)?
        .safe_add(locked_vesting.get_total_amount()?)?
        .safe_add(leftover)
}

/// Like [`get_total_supply_from_curve`] without the swap buffer; the least supply that can
/// survive migration.
pub fn get_total_token_supply(
    migration_quote_threshold: u64,
    sqrt_start_price: u128,
    curve: &[CurveSegment],
    locked_vesting: &LockedVestingParams,
    migration_option: MigrationOption,
    leftover: u64,
    migration_fee_percentage: u8,
) -> Result<u64> {
    let supply = CurveSupply::compute(
        migration_quote_threshold,
        sqrt_start_price,
        curve,
        migration_option,
        migration_fee_percentage,
    )?;
    supply
        .swap_base_amount
        .safe_add(supply.migration_base_amount)?
        .safe_add(locked_vesting.get_total_amount()?)?
        .safe_add(leftover)
}

/// Share of supply (in percent) left for migration when the curve runs from
/// `initial_market_cap` to `migration_market_cap`:
/// `sqrt(r) * (100 - vesting% - leftover%) / (1 + sqrt(r))` with `r = initial / migration`.
pub fn get_percentage_supply_on_migration(
    initial_market_cap: &BigDecimal,
    migration_market_cap: &BigDecimal,
    total_vesting_amount: u64,
    total_leftover: u64,
    total_token_supply: u64,
) -> Result<BigDecimal> {
    require!(
        !migration_market_cap.is_zero() && total_token_supply > 0,
        CurveError::DivisionByZero
    );
    let sqrt_ratio = decimal_sqrt(&(initial_market_cap / migration_market_cap))?;
    let total_supply = BigDecimal::from(total_token_supply);
    let hundred = BigDecimal::from(100u8);
    let vesting_percentage = BigDecimal::from(total_vesting_amount) * &hundred / &total_supply;
    let leftover_percentage = BigDecimal::from(total_leftover) * &hundred / &total_supply;
    let numerator = &sqrt_ratio * (hundred - vesting_percentage - leftover_percentage);
    Ok(numerator / (BigDecimal::one() + sqrt_ratio))
}

/// Quote value of the migrated supply, in UI units.
pub fn get_migration_quote_amount(
    migration_market_cap: &BigDecimal,
    percentage_supply_on_migration: &BigDecimal,
) -> BigDecimal {
    migration_market_cap * percentage_supply_on_migration / BigDecimal::from(100u8)
}

/// Appends the segment `[migration price, MAX_SQRT_PRICE]` holding whatever supply the
/// curve body leaves unaccounted for. A body that already needs more than the supply is
/// accepted only while the excess stays within `leftover`.
#[allow(clippy::too_many_arguments)]
pub fn append_tail_segment(
    curve: &mut Vec<CurveSegment>,
    total_supply: u64,
    migration_quote_threshold: u64,
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    locked_vesting: &LockedVestingParams,
    migration_option: MigrationOption,
    leftover: u64,
    migration_fee_percentage: u8,
) -> Result<()> {
    let total_dynamic_supply = get_total_supply_from_curve(
        migration_quote_threshold,
        sqrt_start_price,
        curve,
        locked_vesting,
        migration_option,
        leftover,
        migration_fee_percentage,
    )?;

    if total_dynamic_supply > total_supply {
        let overrun = total_dynamic_supply - total_supply;
        if overrun > leftover {
            warn!(total_supply, total_dynamic_supply, leftover, "curve needs more supply than available");
            return err!(CurveError::SupplyOverrun);
        }
        return Ok(());
    }

    let remaining_amount = total_supply - total_dynamic_supply;
    if curve.len() >= MAX_CURVE_POINT {
        debug!(remaining_amount, "curve is full, remainder stays unsold");
        return Ok(());
    }
    let tail_liquidity =
        get_initial_liquidity_from_delta_base(remaining_amount, MAX_SQRT_PRICE, sqrt_migration_price)?;
    if tail_liquidity > 0 {
        debug!(remaining_amount, tail_liquidity, "appending tail segment");
        curve.push(CurveSegment {
            sqrt_price: MAX_SQRT_PRICE,
            liquidity: tail_liquidity,
        });
    }
    Ok(())
}

/// A solved curve body together with the quote threshold it was solved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveBody {
    pub sqrt_start_price: u128,
    pub curve: Vec<CurveSegment>,
    pub migration_quote_threshold: u64,
}

/// Solves a curve body for `swap_target` and, while its replayed supply overruns
/// `total_supply` by more than `leftover`, solves again for a smaller target. The
/// accepted body then gets its tail segment from [`append_tail_segment`].
///
/// Rounding in the body (per segment ceilings, the swap buffer picking up whatever the
/// threshold walk leaves unsold) makes the replay land slightly above the target, so
/// each retry shrinks the target by the overrun, doubling the step every attempt.
/// `solve` returns `None` when a target has no valid body, which is passed through.
#[allow(clippy::too_many_arguments)]
pub fn fit_curve_to_supply<F>(
    mut solve: F,
    swap_target: u64,
    total_supply: u64,
    sqrt_migration_price: u128,
    locked_vesting: &LockedVestingParams,
    migration_option: MigrationOption,
    leftover: u64,
    migration_fee_percentage: u8,
) -> Result<Option<CurveBody>>
where
    F: FnMut(u64) -> Result<Option<CurveBody>>,
{
    let mut target = swap_target;
    for attempt in 0..MAX_SUPPLY_FIT_ATTEMPTS {
        let Some(mut body) = solve(target)? else {
            return Ok(None);
        };
        let required = get_total_supply_from_curve(
            body.migration_quote_threshold,
            body.sqrt_start_price,
            &body.curve,
            locked_vesting,
            migration_option,
            leftover,
            migration_fee_percentage,
        )?;
        let overrun = required.saturating_sub(total_supply);
        if overrun <= leftover {
            append_tail_segment(
                &mut body.curve,
                total_supply,
                body.migration_quote_threshold,
                body.sqrt_start_price,
                sqrt_migration_price,
                locked_vesting,
                migration_option,
                leftover,
                migration_fee_percentage,
            )?;
            return Ok(Some(body));
        }

        let step = (overrun - leftover).saturating_mul(1u64 << attempt);
        debug!(attempt, target, overrun, step, "shrinking curve body to fit the supply");
        target = target.saturating_sub(step);
        if target == 0 {
            break;
        }
    }

    warn!(
        total_supply,
        swap_target, leftover, "curve body cannot be fitted within the supply"
    );
    err!(CurveError::SupplyOverrun)
}
