#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bonding_curve_core::fees::{BaseFeeHandler, FeeRateLimiter};
use bonding_curve_core::state::{ActivationType, CollectFeeMode};
use bonding_curve_core::utils::constants::{MAX_FEE_NUMERATOR, MIN_FEE_NUMERATOR};
use honggfuzz::fuzz;

#[derive(Debug, Clone)]
struct LimiterInput {
    limiter: FeeRateLimiter,
    excluded_fee_amount: u64,
}

impl<'a> Arbitrary<'a> for LimiterInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let limiter = FeeRateLimiter {
            cliff_fee_numerator: u.int_in_range(MIN_FEE_NUMERATOR..=MAX_FEE_NUMERATOR)?,
            fee_increment_bps: u.int_in_range(1..=1_000)?,
            max_limiter_duration: u.int_in_range(1..=43_200)?,
            reference_amount: u.int_in_range(1..=1_000_000_000_000)?,
        };
        Ok(LimiterInput {
            limiter,
            excluded_fee_amount: u.int_in_range(0..=u64::MAX >> 8)?,
        })
    }
}

fn fuzz_inverse(input: LimiterInput) {
    let LimiterInput {
        limiter,
        excluded_fee_amount,
    } = input;
    if limiter
        .validate(CollectFeeMode::QuoteToken, ActivationType::Timestamp)
        .is_err()
    {
        return;
    }

    let Ok(included) = limiter.get_included_fee_amount(excluded_fee_amount) else {
        return;
    };
    let net = limiter.get_excluded_fee_amount(included).unwrap();
    assert!(net >= excluded_fee_amount);
    assert!(included >= excluded_fee_amount);

    let numerator = limiter.get_fee_numerator_from_included_fee_amount(included).unwrap();
    assert!(numerator >= limiter.cliff_fee_numerator);
}

fn main() {
    loop {
        fuzz!(|data: LimiterInput| {
            fuzz_inverse(data);
        });
    }
}
