//! Base fee strategies.
//!
//! A pool charges either a time based [`FeeScheduler`] or a volume based
//! [`FeeRateLimiter`]. Both answer the same questions through [`BaseFeeHandler`], and
//! [`BaseFeeParams`] dispatches to the configured one.

use crate::fees::fee_scheduler::FeeScheduler;
use crate::fees::rate_limiter::FeeRateLimiter;
use crate::math::core_arithmetic::{mul_div_u64, Rounding};
use crate::state::{ActivationType, CollectFeeMode, TradeDirection};
use crate::utils::constants::BASIS_POINT_MAX;
use anchor_lang::prelude::*;

pub trait BaseFeeHandler {
    fn validate(
        &self,
        collect_fee_mode: CollectFeeMode,
        activation_type: ActivationType,
    ) -> Result<()>;

    /// Fee numerator for a trade whose input already contains the fee.
    fn get_base_fee_numerator_from_included_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        included_fee_amount: u64,
    ) -> Result<u64>;

    /// Fee numerator for a trade quoted net of fees (exact out, partial fills).
    fn get_base_fee_numerator_from_excluded_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        excluded_fee_amount: u64,
    ) -> Result<u64>;

    fn get_min_base_fee_numerator(&self) -> Result<u64>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum BaseFeeParams {
    FeeScheduler(FeeScheduler),
    RateLimiter(FeeRateLimiter),
}

impl Default for BaseFeeParams {
    fn default() -> Self {
        BaseFeeParams::FeeScheduler(FeeScheduler::default())
    }
}

impl BaseFeeHandler for BaseFeeParams {
    fn validate(
        &self,
        collect_fee_mode: CollectFeeMode,
        activation_type: ActivationType,
    ) -> Result<()> {
        match self {
            BaseFeeParams::FeeScheduler(scheduler) => {
                scheduler.validate(collect_fee_mode, activation_type)
            }
            BaseFeeParams::RateLimiter(limiter) => {
                limiter.validate(collect_fee_mode, activation_type)
            }
        }
    }

    fn get_base_fee_numerator_from_included_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        included_fee_amount: u64,
    ) -> Result<u64> {
        match self {
            BaseFeeParams::FeeScheduler(scheduler) => scheduler
                .get_base_fee_numerator_from_included_fee_amount(
                    current_point,
                    activation_point,
                    trade_direction,
                    included_fee_amount,
                ),
            BaseFeeParams::RateLimiter(limiter) => limiter
                .get_base_fee_numerator_from_included_fee_amount(
                    current_point,
                    activation_point,
                    trade_direction,
                    included_fee_amount,
                ),
        }
    }

    fn get_base_fee_numerator_from_excluded_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        excluded_fee_amount: u64,
    ) -> Result<u64> {
        match self {
            BaseFeeParams::FeeScheduler(scheduler) => scheduler
                .get_base_fee_numerator_from_excluded_fee_amount(
                    current_point,
                    activation_point,
                    trade_direction,
                    excluded_fee_amount,
                ),
            BaseFeeParams::RateLimiter(limiter) => limiter
                .get_base_fee_numerator_from_excluded_fee_amount(
                    current_point,
                    activation_point,
                    trade_direction,
                    excluded_fee_amount,
                ),
        }
    }

    fn get_min_base_fee_numerator(&self) -> Result<u64> {
        match self {
            BaseFeeParams::FeeScheduler(scheduler) => scheduler.get_min_base_fee_numerator(),
            BaseFeeParams::RateLimiter(limiter) => limiter.get_min_base_fee_numerator(),
        }
    }
}

/// Converts basis points into a numerator over `denominator`.
#[inline]
pub fn to_numerator(bps: u64, denominator: u64) -> Result<u64> {
    mul_div_u64(bps, denominator, BASIS_POINT_MAX, Rounding::Down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::{get_fee_scheduler_params, get_rate_limiter_params, FeeSchedulerMode};
    use crate::utils::constants::{MAX_FEE_NUMERATOR, MIN_FEE_NUMERATOR};
    use proptest::prelude::*;

    fn assert_min_fee_in_bounds(base_fee: BaseFeeParams, activation_type: ActivationType) {
        if base_fee
            .validate(CollectFeeMode::QuoteToken, activation_type)
            .is_err()
        {
            return;
        }
        let min_fee = base_fee.get_min_base_fee_numerator().unwrap();
        assert!((MIN_FEE_NUMERATOR..=MAX_FEE_NUMERATOR).contains(&min_fee));
    }

    proptest! {
        #[test]
        fn test_scheduler_min_fee_in_bounds(
            ending_fee_bps in 25u64..5_000,
            spread_bps in 1u64..4_900,
            number_of_period in 1u16..500,
            period_frequency in 1u64..1_000,
            exponential in any::<bool>(),
        ) {
            let mode = if exponential {
                FeeSchedulerMode::Exponential
            } else {
                FeeSchedulerMode::Linear
            };
            let scheduler = get_fee_scheduler_params(
                ending_fee_bps + spread_bps,
                ending_fee_bps,
                mode,
                number_of_period,
                u64::from(number_of_period) * period_frequency,
            );
            if let Ok(scheduler) = scheduler {
                assert_min_fee_in_bounds(BaseFeeParams::FeeScheduler(scheduler), ActivationType::Slot);
            }
        }

        #[test]
        fn test_rate_limiter_min_fee_in_bounds(
            base_fee_bps in 25u64..9_900,
            fee_increment_bps in 1u16..2_000,
            reference_amount in 1u32..1_000_000,
            max_limiter_duration in 1u32..43_200,
        ) {
            let limiter = get_rate_limiter_params(
                base_fee_bps,
                fee_increment_bps,
                f64::from(reference_amount),
                max_limiter_duration,
                9,
                ActivationType::Timestamp,
            );
            if let Ok(limiter) = limiter {
                assert_min_fee_in_bounds(BaseFeeParams::RateLimiter(limiter), ActivationType::Timestamp);
            }
        }
    }

    #[test]
    fn test_to_numerator() {
        assert_eq!(to_numerator(100, 1_000_000_000).unwrap(), 10_000_000);
        assert_eq!(to_numerator(1, 10_000).unwrap(), 1);
    }
}
