#[cfg(test)]
mod tests {
    use crate::math::core_arithmetic::*;
    use ethnum::U256;
    use proptest::prelude::*;

    fn non_zero_u128() -> impl Strategy<Value = u128> {
        1u128..=u128::MAX
    }

    proptest! {
        #[test]
        fn test_mul_div_round_up_is_floor_plus_remainder(
            x in any::<u64>(),
            y in any::<u64>(),
            denominator in non_zero_u128(),
        ) {
            let down = mul_div(x as u128, y as u128, denominator, Rounding::Down).unwrap();
            let up = mul_div(x as u128, y as u128, denominator, Rounding::Up).unwrap();
            let exact = (x as u128) * (y as u128) % denominator == 0;
            if exact || denominator == 1 {
                prop_assert_eq!(up, down);
            } else {
                prop_assert_eq!(up, down + 1);
            }
        }

        #[test]
        fn test_mul_div_matches_wide_reference(
            x in any::<u128>(),
            y in any::<u128>(),
            denominator in non_zero_u128(),
        ) {
            let reference = U256::from(x) * U256::from(y) / U256::from(denominator);
            match mul_div(x, y, denominator, Rounding::Down) {
                Ok(value) => prop_assert_eq!(U256::from(value), reference),
                Err(_) => prop_assert!(reference > U256::from(u128::MAX)),
            }
        }

        #[test]
        fn test_sqrt_u128_is_floor_root(value in any::<u128>()) {
            let root = sqrt_u128(value);
            prop_assert!(U256::from(root) * U256::from(root) <= U256::from(value));
            let next = U256::from(root) + U256::ONE;
            prop_assert!(next * next > U256::from(value));
        }

        #[test]
        fn test_sqrt_u256_is_floor_root(hi in any::<u128>(), lo in any::<u128>()) {
            let value = U256::from_words(hi >> 1, lo);
            let root = sqrt_u256(value);
            prop_assert!(root * root <= value);
            prop_assert!((root + U256::ONE) * (root + U256::ONE) > value);
        }

        #[test]
        fn test_scaled_pow_below_one_stays_below_base(
            base in 1u128..(1u128 << 64),
            exponent in 1u128..512,
        ) {
            let result = pow(base, exponent, true).unwrap();
            prop_assert!(result <= base);
        }
    }
}
