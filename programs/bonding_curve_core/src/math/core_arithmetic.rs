//! # bonding_curve_core::math::core_arithmetic
//!
//! Integer arithmetic kernel shared by the curve, fee and swap code.
//!
//! ## Features
//! - `mul_div` family with an explicit [`Rounding`] direction, computed through 256-bit
//!   intermediates so `x * y` never overflows before the division.
//! - Q64.64 shifts (`mul_shr`, `shl_div`) used for sqrt price arithmetic.
//! - Binary exponentiation in Q64.64 or plain integer form, used by exponential fee decay.
//! - Newton integer square roots for `u128` and `U256`.
//!
//! ## Safety & Determinism
//! - Every fallible operation returns `CurveError` through anchor's `Result`; nothing panics on
//!   caller supplied values.

use crate::error::CurveError;
use crate::utils::constants::{MAX_ITERATIONS, ONE_Q64, RESOLUTION};
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use ethnum::U256;

const MAX_EXPONENT_BITS: u32 = 64;

/// Direction applied to the remainder of an integer division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum Rounding {
    Up,
    Down,
}

#[inline(always)]
pub fn to_u128(value: U256) -> Result<u128> {
    require!(value <= U256::from(u128::MAX), CurveError::MathOverflow);
    Ok(value.as_u128())
}

#[inline(always)]
pub fn to_u64(value: U256) -> Result<u64> {
    require!(value <= U256::from(u64::MAX), CurveError::MathOverflow);
    Ok(value.as_u64())
}

/// Divides a 256-bit numerator, rounding the quotient in the requested direction.
#[inline(always)]
pub fn div_u256(numerator: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    require!(denominator != U256::ZERO, CurveError::DivisionByZero);
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Up if numerator % denominator != U256::ZERO => quotient.safe_add(U256::ONE),
        _ => Ok(quotient),
    }
}

/// Computes `x * y / denominator` with the requested rounding.
///
/// A denominator of one skips the wide division and returns the checked product.
///
/// # Errors
/// * `DivisionByZero` when `denominator == 0`
/// * `MathOverflow` when the quotient does not fit in a `u128`
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    require!(denominator != 0, CurveError::DivisionByZero);
    if denominator == 1 {
        return x.safe_mul(y);
    }
    let product = U256::from(x) * U256::from(y);
    to_u128(div_u256(product, U256::from(denominator), rounding)?)
}

/// 256-bit variant of [`mul_div`]; the product itself is overflow checked.
pub fn mul_div_u256(x: U256, y: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    require!(denominator != U256::ZERO, CurveError::DivisionByZero);
    let product = x.safe_mul(y)?;
    div_u256(product, denominator, rounding)
}

#[inline(always)]
pub fn mul_div_u64(x: u64, y: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    let result = mul_div(x.into(), y.into(), denominator.into(), rounding)?;
    u64::try_from(result).map_err(|_| CurveError::MathOverflow.into())
}

/// `(x * y) >> offset`, rounding up when any shifted out bit is set.
pub fn mul_shr(x: u128, y: u128, offset: u32, rounding: Rounding) -> Result<u128> {
    let denominator = U256::ONE.safe_shl(offset)?;
    let product = U256::from(x) * U256::from(y);
    to_u128(div_u256(product, denominator, rounding)?)
}

/// `(x << offset) / y` with the requested rounding.
pub fn shl_div(x: u128, y: u128, offset: u32, rounding: Rounding) -> Result<u128> {
    require!(y != 0, CurveError::DivisionByZero);
    let numerator = U256::from(x).safe_shl(offset)?;
    to_u128(div_u256(numerator, U256::from(y), rounding)?)
}

/// Raises `base` to `exponent` by binary exponentiation.
///
/// With `scaled` set both `base` and the result are Q64.64 values and every intermediate
/// product is shifted back down by 64 bits (rounding down). Otherwise this is a plain
/// checked integer power.
///
/// # Errors
/// * `ExponentTooLarge` when the exponent is wider than 64 bits
/// * `MathOverflow` when an intermediate leaves the `u128` range
pub fn pow(base: u128, exponent: u128, scaled: bool) -> Result<u128> {
    require!(
        128 - exponent.leading_zeros() <= MAX_EXPONENT_BITS,
        CurveError::ExponentTooLarge
    );
    let one = if scaled { ONE_Q64 } else { 1 };
    if exponent == 0 {
        return Ok(one);
    }

    let mut result = U256::from(one);
    let mut squared = U256::from(base);
    let mut remaining = exponent;
    loop {
        if remaining & 1 == 1 {
            result = scaled_product(result, squared, scaled)?;
        }
        remaining >>= 1;
        if remaining == 0 {
            break;
        }
        squared = scaled_product(squared, squared, scaled)?;
    }
    to_u128(result)
}

#[inline(always)]
fn scaled_product(a: U256, b: U256, scaled: bool) -> Result<U256> {
    let product = a.safe_mul(b)?;
    let product = if scaled {
        product >> RESOLUTION
    } else {
        product
    };
    require!(product <= U256::from(u128::MAX), CurveError::MathOverflow);
    Ok(product)
}

/// Floor square root of a `u128` by Newton's method.
///
/// The initial guess `2^ceil(bits/2)` sits above the root, so the iteration decreases
/// monotonically and stops at the first non-decreasing step.
pub fn sqrt_u128(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let bits = 128 - value.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    for _ in 0..MAX_ITERATIONS {
        let y = (x + value / x) >> 1;
        if y >= x {
            break;
        }
        x = y;
    }
    x
}

/// Floor square root of a `U256`, same scheme as [`sqrt_u128`].
pub fn sqrt_u256(value: U256) -> U256 {
    if value < U256::from(2u8) {
        return value;
    }
    let bits = 256 - value.leading_zeros();
    let mut x = U256::ONE << bits.div_ceil(2);
    for _ in 0..MAX_ITERATIONS {
        let y = (x + value / x) >> 1u32;
        if y >= x {
            break;
        }
        x = y;
    }
    x
}
