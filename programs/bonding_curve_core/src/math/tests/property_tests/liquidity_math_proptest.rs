#[cfg(test)]
mod tests {
    use crate::math::core_arithmetic::Rounding;
    use crate::math::liquidity_math::*;
    use crate::utils::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, ONE_Q64};
    use proptest::prelude::*;

    fn sqrt_price() -> impl Strategy<Value = u128> {
        (ONE_Q64 >> 8)..(ONE_Q64 << 8)
    }

    fn liquidity() -> impl Strategy<Value = u128> {
        (1u128 << 70)..(1u128 << 110)
    }

    proptest! {
        #[test]
        fn test_delta_rounding_gap_is_at_most_one(
            a in MIN_SQRT_PRICE..MAX_SQRT_PRICE,
            b in MIN_SQRT_PRICE..MAX_SQRT_PRICE,
            liquidity in liquidity(),
        ) {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            let base_up = get_delta_amount_base_unsigned_256(lower, upper, liquidity, Rounding::Up).unwrap();
            let base_down = get_delta_amount_base_unsigned_256(lower, upper, liquidity, Rounding::Down).unwrap();
            prop_assert!(base_up >= base_down);
            prop_assert!(base_up - base_down <= ethnum::U256::ONE);

            let quote_up = get_delta_amount_quote_unsigned_256(lower, upper, liquidity, Rounding::Up).unwrap();
            let quote_down = get_delta_amount_quote_unsigned_256(lower, upper, liquidity, Rounding::Down).unwrap();
            prop_assert!(quote_up >= quote_down);
            prop_assert!(quote_up - quote_down <= ethnum::U256::ONE);
        }

        #[test]
        fn test_quote_in_round_trip(
            price in sqrt_price(),
            liquidity in liquidity(),
            amount_in in 1u64..1_000_000_000_000,
        ) {
            let next = get_next_sqrt_price_from_input(price, liquidity, amount_in, false).unwrap();
            prop_assert!(next >= price);
            // the pool never charges less than it received
            let owed = get_delta_amount_quote_unsigned(price, next, liquidity, Rounding::Up).unwrap();
            prop_assert!(owed <= amount_in);
            let paid = get_delta_amount_quote_unsigned(price, next, liquidity, Rounding::Down).unwrap();
            prop_assert!(amount_in - paid <= 2);
        }

        #[test]
        fn test_base_in_never_overpays(
            price in sqrt_price(),
            liquidity in liquidity(),
            amount_in in 1u64..1_000_000_000_000,
        ) {
            let next = get_next_sqrt_price_from_input(price, liquidity, amount_in, true).unwrap();
            prop_assert!(next <= price);
            let owed = get_delta_amount_base_unsigned(next, price, liquidity, Rounding::Up).unwrap();
            prop_assert!(owed <= amount_in);
        }

        #[test]
        fn test_output_price_covers_requested_amount(
            price in sqrt_price(),
            liquidity in liquidity(),
            amount_out in 1u64..1_000_000,
        ) {
            if let Ok(next) = get_next_sqrt_price_from_output(price, liquidity, amount_out, false) {
                prop_assert!(next >= price);
                let available = get_delta_amount_base_unsigned_256(price, next, liquidity, Rounding::Down).unwrap();
                prop_assert!(available >= ethnum::U256::from(amount_out));
            }
            if let Ok(next) = get_next_sqrt_price_from_output(price, liquidity, amount_out, true) {
                prop_assert!(next <= price);
                let available = get_delta_amount_quote_unsigned_256(next, price, liquidity, Rounding::Down).unwrap();
                prop_assert!(available >= ethnum::U256::from(amount_out));
            }
        }
    }
}
