//! Arbitrary precision helpers for the calibration engine.
//!
//! Calibration works on user facing decimal inputs (market caps, percentages, token
//! amounts with decimals) and only drops to integers once a sqrt price or liquidity has
//! been derived. Everything here is deterministic at [`DECIMAL_PRECISION`] significant digits.

use crate::error::CurveError;
use crate::utils::constants::MAX_ITERATIONS;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::str::FromStr;

pub const DECIMAL_PRECISION: u64 = 100;

/// Converts a user supplied float through its shortest round-trip representation, so
/// `0.1` becomes exactly `0.1` rather than its binary expansion.
pub fn decimal_from_f64(value: f64) -> Result<BigDecimal> {
    require!(value.is_finite(), CurveError::InvalidDecimalInput);
    BigDecimal::from_str(&format!("{value}")).map_err(|_| CurveError::InvalidDecimalInput.into())
}

#[inline]
pub fn decimal_from_u128(value: u128) -> BigDecimal {
    BigDecimal::from(BigInt::from(value))
}

/// `10^exponent` as an exact decimal.
#[inline]
pub fn pow10(exponent: u32) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -i64::from(exponent))
}

/// `2^64` as an exact decimal.
#[inline]
pub fn q64_decimal() -> BigDecimal {
    BigDecimal::from(BigInt::one() << 64u32)
}

pub fn decimal_sqrt(value: &BigDecimal) -> Result<BigDecimal> {
    require!(!value.is_negative(), CurveError::NegativeSqrtInput);
    if value.is_zero() {
        return Ok(BigDecimal::zero());
    }
    value.sqrt().ok_or(CurveError::NegativeSqrtInput.into())
}

/// `n`-th root by Newton iteration `x' = ((n - 1) x + v / x^(n - 1)) / n`.
///
/// Seeded from the `f64` root, refined until the step falls under the working precision
/// or the iteration cap is reached.
pub fn decimal_nth_root(value: &BigDecimal, n: u32) -> Result<BigDecimal> {
    require!(n > 0, CurveError::InvalidDecimalInput);
    require!(!value.is_negative(), CurveError::NegativeSqrtInput);
    if value.is_zero() || n == 1 {
        return Ok(value.clone());
    }
    if n == 2 {
        return decimal_sqrt(value);
    }

    let seed = value
        .to_f64()
        .map(|v| v.powf(1.0 / f64::from(n)))
        .filter(|v| v.is_finite() && *v > 0.0)
        .and_then(|v| decimal_from_f64(v).ok())
        .unwrap_or_else(BigDecimal::one);

    let n_decimal = BigDecimal::from(n);
    let n_minus_one = BigDecimal::from(n - 1);
    let tolerance = BigDecimal::new(BigInt::one(), (DECIMAL_PRECISION - 10) as i64);

    let mut x = seed;
    for _ in 0..MAX_ITERATIONS {
        let power = decimal_pow(&x, n - 1);
        if power.is_zero() {
            break;
        }
        let next = ((&n_minus_one * &x + value / &power) / &n_decimal).with_prec(DECIMAL_PRECISION);
        let step = (&next - &x).abs();
        x = next;
        if step <= &tolerance * &x {
            break;
        }
    }
    Ok(x)
}

/// Integer power by repeated squaring, rounded to the working precision after each step.
pub fn decimal_pow(base: &BigDecimal, exponent: u32) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut squared = base.clone();
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = (&result * &squared).with_prec(DECIMAL_PRECISION);
        }
        remaining >>= 1;
        if remaining > 0 {
            squared = (&squared * &squared).with_prec(DECIMAL_PRECISION);
        }
    }
    result
}

/// Truncates a non-negative decimal to an integer.
pub fn decimal_floor(value: &BigDecimal) -> Result<BigInt> {
    require!(!value.is_negative(), CurveError::InvalidDecimalInput);
    let (digits, scale) = value.with_scale(0).as_bigint_and_exponent();
    debug_assert_eq!(scale, 0);
    Ok(digits)
}

pub fn decimal_floor_to_u128(value: &BigDecimal) -> Result<u128> {
    decimal_floor(value)?
        .to_u128()
        .ok_or(CurveError::MathOverflow.into())
}

pub fn decimal_floor_to_u64(value: &BigDecimal) -> Result<u64> {
    decimal_floor(value)?
        .to_u64()
        .ok_or(CurveError::MathOverflow.into())
}

/// Converts a UI token amount into raw units, truncating below the smallest unit.
pub fn convert_to_lamports(amount: &BigDecimal, decimals: u8) -> Result<u64> {
    decimal_floor_to_u64(&(amount * pow10(decimals.into())))
}

/// Narrows an arbitrary precision integer to `u128`, rejecting negatives.
pub fn bigint_to_u128(value: &BigInt) -> Result<u128> {
    require!(value.sign() != Sign::Minus, CurveError::Underflow);
    value.to_u128().ok_or(CurveError::MathOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_curve_error;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn assert_close(actual: &BigDecimal, expected: &BigDecimal) {
        let diff = (actual - expected).abs();
        assert!(
            diff < dec("0.000000000000000000000001"),
            "{actual} is not close to {expected}"
        );
    }

    #[test]
    fn test_decimal_from_f64_uses_shortest_repr() {
        assert_eq!(decimal_from_f64(0.1).unwrap(), dec("0.1"));
        assert_eq!(
            decimal_from_f64(95.07640791476408).unwrap(),
            dec("95.07640791476408")
        );
        assert_curve_error(decimal_from_f64(f64::NAN), CurveError::InvalidDecimalInput);
        assert_curve_error(
            decimal_from_f64(f64::INFINITY),
            CurveError::InvalidDecimalInput,
        );
    }

    #[test]
    fn test_decimal_sqrt() {
        assert_eq!(decimal_sqrt(&BigDecimal::zero()).unwrap(), BigDecimal::zero());
        assert_close(&decimal_sqrt(&dec("16")).unwrap(), &dec("4"));
        assert_curve_error(decimal_sqrt(&dec("-1")), CurveError::NegativeSqrtInput);
    }

    #[test]
    fn test_decimal_nth_root() {
        assert_close(&decimal_nth_root(&dec("81"), 4).unwrap(), &dec("3"));
        assert_close(&decimal_nth_root(&dec("65536"), 16).unwrap(), &dec("2"));
        assert_close(&decimal_nth_root(&dec("0.001"), 3).unwrap(), &dec("0.1"));
        assert_curve_error(decimal_nth_root(&dec("-8"), 3), CurveError::NegativeSqrtInput);
    }

    #[test]
    fn test_decimal_pow_and_floor() {
        assert_eq!(decimal_pow(&dec("1.5"), 2), dec("2.25"));
        assert_eq!(decimal_pow(&dec("7"), 0), BigDecimal::one());
        assert_eq!(decimal_floor_to_u128(&dec("12.999")).unwrap(), 12);
        assert_eq!(decimal_floor_to_u64(&pow10(9)).unwrap(), 1_000_000_000);
        assert_curve_error(
            decimal_floor_to_u64(&dec("18446744073709551616")),
            CurveError::MathOverflow,
        );
        assert_curve_error(decimal_floor_to_u64(&dec("-1")), CurveError::InvalidDecimalInput);
    }

    #[test]
    fn test_convert_to_lamports() {
        assert_eq!(convert_to_lamports(&dec("1.5"), 9).unwrap(), 1_500_000_000);
        assert_eq!(convert_to_lamports(&dec("0.0000001"), 6).unwrap(), 0);
        assert_eq!(convert_to_lamports(&dec("1000000000"), 6).unwrap(), 1_000_000_000_000_000);
    }
}
