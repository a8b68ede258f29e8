//! # bonding_curve_core::math::liquidity_math
//!
//! Token deltas and sqrt price transitions for a constant liquidity curve segment.
//!
//! A segment holds `L` (raw, `L * 2^64`) between two Q64.64 sqrt prices. Base token
//! deltas follow `L * (1/lower - 1/upper)` and quote token deltas follow
//! `L * (upper - lower) / 2^128`. Amounts owed to the pool round up, amounts paid
//! out round down.

use crate::error::CurveError;
use crate::math::core_arithmetic::{div_u256, mul_div_u256, to_u128, to_u64, Rounding};
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use ethnum::U256;

const Q128_SHIFT: u32 = 128;

/// Base token amount spanned by `liquidity` between two sqrt prices.
///
/// # Arguments
/// * `lower_sqrt_price` - Lower bound in Q64.64
/// * `upper_sqrt_price` - Upper bound in Q64.64
/// * `liquidity` - Raw segment liquidity
/// * `rounding` - Direction applied to the remainder
///
/// # Returns
/// * `Result<u64>` - The base amount, or `MathOverflow` when it exceeds `u64`
pub fn get_delta_amount_base_unsigned(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<u64> {
    let result = get_delta_amount_base_unsigned_256(
        lower_sqrt_price,
        upper_sqrt_price,
        liquidity,
        rounding,
    )?;
    to_u64(result)
}

/// Wide variant of [`get_delta_amount_base_unsigned`], used where whole segment
/// capacities are compared against trade amounts.
pub fn get_delta_amount_base_unsigned_256(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256> {
    require!(
        lower_sqrt_price <= upper_sqrt_price,
        CurveError::InvalidSqrtPrice
    );
    if lower_sqrt_price == upper_sqrt_price || liquidity == 0 {
        return Ok(U256::ZERO);
    }
    require!(lower_sqrt_price > 0, CurveError::DivisionByZero);

    // L * (upper - lower) / (lower * upper)
    let numerator = U256::from(upper_sqrt_price - lower_sqrt_price);
    let denominator = U256::from(lower_sqrt_price) * U256::from(upper_sqrt_price);
    mul_div_u256(U256::from(liquidity), numerator, denominator, rounding)
}

/// Quote token amount spanned by `liquidity` between two sqrt prices.
pub fn get_delta_amount_quote_unsigned(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<u64> {
    let result = get_delta_amount_quote_unsigned_256(
        lower_sqrt_price,
        upper_sqrt_price,
        liquidity,
        rounding,
    )?;
    to_u64(result)
}

pub fn get_delta_amount_quote_unsigned_256(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256> {
    require!(
        lower_sqrt_price <= upper_sqrt_price,
        CurveError::InvalidSqrtPrice
    );
    // fits: (2^128 - 1)^2 + 2^128 - 1 < 2^256
    let product = U256::from(liquidity) * U256::from(upper_sqrt_price - lower_sqrt_price);
    let result = match rounding {
        Rounding::Up => {
            let denominator = U256::ONE << Q128_SHIFT;
            (product + (denominator - U256::ONE)) >> Q128_SHIFT
        }
        Rounding::Down => product >> Q128_SHIFT,
    };
    Ok(result)
}

/// Sqrt price after `amount_in` enters a segment.
///
/// Selling base (`base_for_quote`) lowers the price, rounded up so the pool never
/// gives away more quote than the curve allows. Selling quote raises the price,
/// rounded down.
///
/// # Errors
/// * `InvalidState` when the current price or the liquidity is zero
pub fn get_next_sqrt_price_from_input(
    sqrt_price: u128,
    liquidity: u128,
    amount_in: u64,
    base_for_quote: bool,
) -> Result<u128> {
    require!(sqrt_price > 0 && liquidity > 0, CurveError::InvalidState);
    if base_for_quote {
        get_next_sqrt_price_from_base_amount_in_rounding_up(sqrt_price, liquidity, amount_in)
    } else {
        get_next_sqrt_price_from_quote_amount_in_rounding_down(sqrt_price, liquidity, amount_in)
    }
}

/// `L * P / (L + amount * P)` rounded up.
///
/// When the product no longer fits in 128 bits the equivalent `L / (L / P + amount)` is
/// used instead.
fn get_next_sqrt_price_from_base_amount_in_rounding_up(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    let product = U256::from(amount) * U256::from(sqrt_price);
    let denominator = U256::from(liquidity) + product;
    let u128_max = U256::from(u128::MAX);

    if product <= u128_max && denominator <= u128_max {
        let result = mul_div_u256(
            U256::from(liquidity),
            U256::from(sqrt_price),
            denominator,
            Rounding::Up,
        )?;
        to_u128(result)
    } else {
        let quotient = (liquidity / sqrt_price).safe_add(u128::from(amount))?;
        let result = div_u256(U256::from(liquidity), U256::from(quotient), Rounding::Up)?;
        to_u128(result)
    }
}

/// `P + (amount << 128) / L` rounded down.
fn get_next_sqrt_price_from_quote_amount_in_rounding_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> Result<u128> {
    let quotient = (U256::from(amount) << Q128_SHIFT) / U256::from(liquidity);
    to_u128(U256::from(sqrt_price).safe_add(quotient)?)
}

/// Sqrt price after `amount_out` leaves a segment.
///
/// Buying quote (`base_for_quote`) lowers the price, buying base raises it. Both round
/// against the trader.
///
/// # Errors
/// * `InvalidState` when the current price or the liquidity is zero
/// * `InsufficientLiquidity` when the segment cannot pay the requested amount
pub fn get_next_sqrt_price_from_output(
    sqrt_price: u128,
    liquidity: u128,
    amount_out: u64,
    base_for_quote: bool,
) -> Result<u128> {
    require!(sqrt_price > 0 && liquidity > 0, CurveError::InvalidState);
    if base_for_quote {
        get_next_sqrt_price_from_quote_amount_out_rounding_down(sqrt_price, liquidity, amount_out)
    } else {
        get_next_sqrt_price_from_base_amount_out_rounding_up(sqrt_price, liquidity, amount_out)
    }
}

/// `P - ceil((amount << 128) / L)`
fn get_next_sqrt_price_from_quote_amount_out_rounding_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> Result<u128> {
    let quotient = div_u256(
        U256::from(amount) << Q128_SHIFT,
        U256::from(liquidity),
        Rounding::Up,
    )?;
    require!(
        U256::from(sqrt_price) > quotient,
        CurveError::InsufficientLiquidity
    );
    to_u128(U256::from(sqrt_price) - quotient)
}

/// `L * P / (L - amount * P)` rounded up.
fn get_next_sqrt_price_from_base_amount_out_rounding_up(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    let product = U256::from(amount) * U256::from(sqrt_price);
    require!(
        U256::from(liquidity) > product,
        CurveError::InsufficientLiquidity
    );
    let denominator = U256::from(liquidity) - product;
    let result = mul_div_u256(
        U256::from(liquidity),
        U256::from(sqrt_price),
        denominator,
        Rounding::Up,
    )?;
    to_u128(result)
}
