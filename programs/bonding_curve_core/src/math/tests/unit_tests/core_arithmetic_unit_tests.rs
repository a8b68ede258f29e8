#[cfg(test)]
mod tests {
    use crate::error::CurveError;
    use crate::math::core_arithmetic::*;
    use crate::test_utils::assert_curve_error;
    use crate::utils::constants::*;
    use ethnum::U256;

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(1000, 2000, 500, Rounding::Down).unwrap(), 4000);
        assert_eq!(mul_div(10, 10, 3, Rounding::Down).unwrap(), 33);
        assert_eq!(mul_div(10, 10, 3, Rounding::Up).unwrap(), 34);
        // exact quotients never round up
        assert_eq!(mul_div(10, 9, 3, Rounding::Up).unwrap(), 30);
        assert_eq!(mul_div(0, u128::MAX, 7, Rounding::Up).unwrap(), 0);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u128::MAX * u128::MAX overflows 128 bits before the division
        assert_eq!(
            mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down).unwrap(),
            u128::MAX
        );
        assert_eq!(
            mul_div(u128::MAX / 4, 2, u128::MAX / 2, Rounding::Down).unwrap(),
            0
        );
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_curve_error(mul_div(100, 200, 0, Rounding::Down), CurveError::DivisionByZero);
        assert_curve_error(mul_div(100, 200, 0, Rounding::Up), CurveError::DivisionByZero);
        assert_curve_error(
            mul_div_u256(U256::ONE, U256::ONE, U256::ZERO, Rounding::Up),
            CurveError::DivisionByZero,
        );
    }

    #[test]
    fn test_mul_div_unit_denominator_returns_product() {
        assert_eq!(mul_div(12, 13, 1, Rounding::Up).unwrap(), 156);
        assert_curve_error(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            CurveError::MathOverflow,
        );
    }

    #[test]
    fn test_mul_div_result_overflow() {
        assert_curve_error(
            mul_div(u128::MAX, u128::MAX, 2, Rounding::Down),
            CurveError::MathOverflow,
        );
        assert_curve_error(
            mul_div_u64(u64::MAX, 3, 2, Rounding::Down),
            CurveError::MathOverflow,
        );
    }

    #[test]
    fn test_mul_shr_and_shl_div() {
        assert_eq!(mul_shr(3 * ONE_Q64, 5, RESOLUTION, Rounding::Down).unwrap(), 15);
        assert_eq!(mul_shr(ONE_Q64 + 1, 1, RESOLUTION, Rounding::Up).unwrap(), 2);
        assert_eq!(mul_shr(ONE_Q64 + 1, 1, RESOLUTION, Rounding::Down).unwrap(), 1);
        assert_eq!(shl_div(1, 2, RESOLUTION, Rounding::Down).unwrap(), ONE_Q64 / 2);
        assert_curve_error(shl_div(1, 0, RESOLUTION, Rounding::Down), CurveError::DivisionByZero);
        assert_curve_error(
            shl_div(u128::MAX, 1, RESOLUTION, Rounding::Down),
            CurveError::MathOverflow,
        );
    }

    #[test]
    fn test_pow_scaled() {
        let half = ONE_Q64 / 2;
        assert_eq!(pow(half, 0, true).unwrap(), ONE_Q64);
        assert_eq!(pow(half, 1, true).unwrap(), half);
        assert_eq!(pow(half, 3, true).unwrap(), ONE_Q64 / 8);
        assert_eq!(pow(2 * ONE_Q64, 10, true).unwrap(), 1024 * ONE_Q64);
        assert_curve_error(pow(2 * ONE_Q64, 64, true), CurveError::MathOverflow);
    }

    #[test]
    fn test_pow_unscaled() {
        assert_eq!(pow(3, 4, false).unwrap(), 81);
        assert_eq!(pow(10, 0, false).unwrap(), 1);
        assert_eq!(pow(2, 127, false).unwrap(), 1u128 << 127);
        assert_curve_error(pow(2, 128, false), CurveError::MathOverflow);
    }

    #[test]
    fn test_pow_exponent_too_large() {
        assert_curve_error(pow(ONE_Q64, 1u128 << 64, true), CurveError::ExponentTooLarge);
        // 64 bit exponents are accepted; a base below one decays to zero
        assert_eq!(pow(ONE_Q64 / 2, u64::MAX as u128, true).unwrap(), 0);
        assert_eq!(pow(ONE_Q64, u64::MAX as u128, true).unwrap(), ONE_Q64);
    }

    #[test]
    fn test_sqrt_u128() {
        assert_eq!(sqrt_u128(0), 0);
        assert_eq!(sqrt_u128(1), 1);
        assert_eq!(sqrt_u128(3), 1);
        assert_eq!(sqrt_u128(4), 2);
        assert_eq!(sqrt_u128(99), 9);
        assert_eq!(sqrt_u128(1u128 << 64), 1u128 << 32);
        assert_eq!(sqrt_u128(u128::MAX), u64::MAX as u128);
    }

    #[test]
    fn test_sqrt_u256() {
        assert_eq!(sqrt_u256(U256::ZERO), U256::ZERO);
        assert_eq!(sqrt_u256(U256::from(17u8)), U256::from(4u8));
        assert_eq!(sqrt_u256(U256::ONE << 128u32), U256::ONE << 64u32);
        assert_eq!(sqrt_u256(U256::MAX), U256::from(u128::MAX));
    }

    #[test]
    fn test_to_narrow_conversions() {
        assert_eq!(to_u64(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert_curve_error(to_u64(U256::from(u64::MAX) + U256::ONE), CurveError::MathOverflow);
        assert_curve_error(to_u128(U256::MAX), CurveError::MathOverflow);
    }
}
