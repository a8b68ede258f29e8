//! Volume based base fee.
//!
//! For quote to base trades shortly after activation the fee rate grows with trade size:
//! the first `reference_amount` of input pays the cliff rate, every further
//! `reference_amount` band pays `fee_increment_bps` more, until the rate reaches
//! `MAX_FEE_NUMERATOR`. Fees are always charged on the fee-included input.

use crate::error::CurveError;
use crate::fees::base_fee::{to_numerator, BaseFeeHandler};
use crate::fees::pool_fees::{get_excluded_fee_amount, get_included_fee_amount};
use crate::math::core_arithmetic::{mul_div, mul_div_u64, Rounding};
use crate::math::decimal_math::{convert_to_lamports, decimal_from_f64};
use crate::state::{ActivationType, CollectFeeMode, TradeDirection};
use crate::utils::constants::*;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use ethnum::U256;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct FeeRateLimiter {
    pub cliff_fee_numerator: u64,
    pub fee_increment_bps: u16,
    pub max_limiter_duration: u32,
    pub reference_amount: u64,
}

impl FeeRateLimiter {
    /// A limiter with no bands behaves like a flat cliff fee.
    pub fn is_zero_rate_limiter(&self) -> bool {
        self.reference_amount == 0 && self.max_limiter_duration == 0 && self.fee_increment_bps == 0
    }

    pub fn is_non_zero_rate_limiter(&self) -> bool {
        self.reference_amount != 0 && self.max_limiter_duration != 0 && self.fee_increment_bps != 0
    }

    /// Only quote to base trades inside `[activation, activation + max_limiter_duration]`
    /// are rate limited.
    pub fn is_rate_limiter_applied(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
    ) -> Result<bool> {
        if self.is_zero_rate_limiter()
            || trade_direction == TradeDirection::BaseToQuote
            || current_point < activation_point
        {
            return Ok(false);
        }
        let last_effective_point =
            activation_point.safe_add(self.max_limiter_duration.into())?;
        Ok(current_point <= last_effective_point)
    }

    fn get_fee_increment_numerator(&self) -> Result<u64> {
        to_numerator(self.fee_increment_bps.into(), FEE_DENOMINATOR)
    }

    /// Number of whole bands past the reference amount before the rate hits the cap.
    pub fn get_max_index(&self) -> Result<u64> {
        let delta_numerator = MAX_FEE_NUMERATOR.safe_sub(self.cliff_fee_numerator)?;
        delta_numerator.safe_div(self.get_fee_increment_numerator()?)
    }

    /// Effective fee numerator for a fee-included input amount.
    ///
    /// With `x0 = reference_amount`, `c = cliff`, `i = increment`, an input
    /// `X = x0 + a * x0 + b` pays `x0 * (c + c*a + i*a*(a+1)/2) + b * (c + i*(a+1))`
    /// while `a` is below the max index, and the capped rate on everything past it.
    pub fn get_fee_numerator_from_included_fee_amount(&self, input_amount: u64) -> Result<u64> {
        if input_amount <= self.reference_amount {
            return Ok(self.cliff_fee_numerator);
        }

        let x0 = u128::from(self.reference_amount);
        let c = u128::from(self.cliff_fee_numerator);
        let i = u128::from(self.get_fee_increment_numerator()?);
        let max_index = u128::from(self.get_max_index()?);
        let diff = u128::from(input_amount).safe_sub(x0)?;
        let a = diff.safe_div(x0)?;
        let b = diff % x0;

        let total_fee_numerator = if a < max_index {
            let series = i.safe_mul(a)?.safe_mul(a.safe_add(1)?)? / 2;
            let numerator_1 = c.safe_add(c.safe_mul(a)?)?.safe_add(series)?;
            let numerator_2 = c.safe_add(i.safe_mul(a.safe_add(1)?)?)?;
            x0.safe_mul(numerator_1)?
                .safe_add(b.safe_mul(numerator_2)?)?
        } else {
            let series = i.safe_mul(max_index)?.safe_mul(max_index.safe_add(1)?)? / 2;
            let numerator_1 = c.safe_add(c.safe_mul(max_index)?)?.safe_add(series)?;
            let first_fee = x0.safe_mul(numerator_1)?;
            let capped_amount = a
                .safe_sub(max_index)?
                .safe_mul(x0)?
                .safe_add(b)?;
            let second_fee = capped_amount.safe_mul(MAX_FEE_NUMERATOR.into())?;
            first_fee.safe_add(second_fee)?
        };

        let denominator = u128::from(FEE_DENOMINATOR);
        let trading_fee = total_fee_numerator
            .safe_add(denominator - 1)?
            .safe_div(denominator)?;
        let fee_numerator = mul_div(
            trading_fee,
            denominator,
            input_amount.into(),
            Rounding::Up,
        )?;
        u64::try_from(fee_numerator).map_err(|_| CurveError::MathOverflow.into())
    }

    /// Net amount left after the limiter fee is taken from `included_fee_amount`.
    pub fn get_excluded_fee_amount(&self, included_fee_amount: u64) -> Result<u64> {
        let fee_numerator = self.get_fee_numerator_from_included_fee_amount(included_fee_amount)?;
        let (excluded_fee_amount, _) = get_excluded_fee_amount(fee_numerator, included_fee_amount)?;
        Ok(excluded_fee_amount)
    }

    /// Smallest fee-included input whose net amount covers `excluded_fee_amount`.
    ///
    /// The closed form picks the region first: inside the reference band the cliff
    /// rate inverts directly, inside the banded region the band index comes from the
    /// quadratic in [`Self::solve_banded_included_amount`], past the cap the rate is
    /// constant. Integer rounding of the reported numerator is then settled exactly.
    pub fn get_included_fee_amount(&self, excluded_fee_amount: u64) -> Result<u64> {
        if excluded_fee_amount == 0 {
            return Ok(0);
        }
        let excluded_at_reference = self.get_excluded_fee_amount(self.reference_amount)?;
        let estimate = if excluded_fee_amount <= excluded_at_reference {
            let (included, _) =
                get_included_fee_amount(self.cliff_fee_numerator, excluded_fee_amount)?;
            included
        } else {
            let max_index = self.get_max_index()?;
            let capped_start = U256::from(max_index.safe_add(1)?) * U256::from(self.reference_amount);
            if capped_start > U256::from(u64::MAX) {
                self.solve_banded_included_amount(excluded_fee_amount, max_index)?
            } else {
                let capped_start = capped_start.as_u64();
                if excluded_fee_amount <= self.get_excluded_fee_amount(capped_start)? {
                    self.solve_banded_included_amount(excluded_fee_amount, max_index)?
                } else {
                    self.solve_capped_included_amount(excluded_fee_amount, capped_start)?
                }
            }
        };
        self.settle_included_fee_amount(estimate, excluded_fee_amount)
    }

    /// Solves `A*a^2 + B*a + C = 0` for the band index `a` whose boundary
    /// `x0 * (a + 1)` nets `excluded_fee_amount`, where
    /// `A = x0*i`, `B = x0*i - 2*x0*(D - c)`, `C = 2*(Y*D - x0*(D - c))`.
    /// The smaller root is the first crossing; the partial band is then filled at that
    /// band's rate.
    fn solve_banded_included_amount(&self, excluded_fee_amount: u64, max_index: u64) -> Result<u64> {
        let x0 = BigInt::from(self.reference_amount);
        let c = BigInt::from(self.cliff_fee_numerator);
        let i = BigInt::from(self.get_fee_increment_numerator()?);
        let d = BigInt::from(FEE_DENOMINATOR);
        let y = BigInt::from(excluded_fee_amount);

        let net_rate = &d - &c;
        let a_coef = &x0 * &i;
        let b_coef = &a_coef - BigInt::from(2u8) * &x0 * &net_rate;
        let c_coef = BigInt::from(2u8) * (&y * &d - &x0 * &net_rate);
        let discriminant = &b_coef * &b_coef - BigInt::from(4u8) * &a_coef * &c_coef;

        let last_band = max_index.saturating_sub(1);
        let band = if a_coef.is_zero() || discriminant.is_negative() {
            last_band
        } else {
            let root = (-&b_coef - discriminant.sqrt()) / (BigInt::from(2u8) * &a_coef);
            if root.is_negative() {
                0
            } else {
                root.to_u64().unwrap_or(u64::MAX).min(last_band)
            }
        };
        trace!(excluded_fee_amount, band, "rate limiter band");

        let boundary = U256::from(band.safe_add(1)?) * U256::from(self.reference_amount);
        require!(boundary <= U256::from(u64::MAX), CurveError::MathOverflow);
        let boundary = boundary.as_u64();

        let excluded_at_boundary = self.get_excluded_fee_amount(boundary)?;
        let remaining = excluded_fee_amount.saturating_sub(excluded_at_boundary);
        let band_rate = self
            .cliff_fee_numerator
            .safe_add(self.get_fee_increment_numerator()?.safe_mul(band.safe_add(1)?)?)?
            .min(MAX_FEE_NUMERATOR);
        let partial = mul_div_u64(
            remaining,
            FEE_DENOMINATOR,
            FEE_DENOMINATOR.safe_sub(band_rate)?,
            Rounding::Up,
        )?;
        boundary.safe_add(partial)
    }

    /// Past the cap every additional unit pays `MAX_FEE_NUMERATOR`.
    fn solve_capped_included_amount(&self, excluded_fee_amount: u64, capped_start: u64) -> Result<u64> {
        let excluded_at_cap = self.get_excluded_fee_amount(capped_start)?;
        let remaining = excluded_fee_amount.safe_sub(excluded_at_cap)?;
        let extra = mul_div_u64(
            remaining,
            FEE_DENOMINATOR,
            FEE_DENOMINATOR.safe_sub(MAX_FEE_NUMERATOR)?,
            Rounding::Up,
        )?;
        capped_start.safe_add(extra)
    }

    /// The reported numerator is itself rounded, so the net amount of the estimate can
    /// miss the target by a few units either way. Accepts the estimate when it is the
    /// first covering amount, otherwise searches `[target, upper]` for it.
    fn settle_included_fee_amount(&self, estimate: u64, excluded_fee_amount: u64) -> Result<u64> {
        let covers = |amount: u64| -> Result<bool> {
            Ok(self.get_excluded_fee_amount(amount)? >= excluded_fee_amount)
        };

        if covers(estimate)? && (estimate == 0 || !covers(estimate - 1)?) {
            return Ok(estimate);
        }

        // no amount below the target can net the target
        let mut low = excluded_fee_amount.saturating_sub(1);
        let mut high = estimate.max(excluded_fee_amount);
        let mut step = 1u64;
        let mut iterations = 0;
        while !covers(high)? {
            require!(
                high < u64::MAX && iterations < MAX_ITERATIONS,
                CurveError::MathOverflow
            );
            low = high;
            high = high.saturating_add(step);
            step = step.saturating_mul(2);
            iterations += 1;
        }

        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if covers(mid)? {
                high = mid;
            } else {
                low = mid;
            }
        }
        Ok(high)
    }

    pub fn get_fee_numerator_from_excluded_fee_amount(&self, excluded_fee_amount: u64) -> Result<u64> {
        let included_fee_amount = self.get_included_fee_amount(excluded_fee_amount)?;
        self.get_fee_numerator_from_included_fee_amount(included_fee_amount)
    }
}

impl BaseFeeHandler for FeeRateLimiter {
    fn validate(
        &self,
        collect_fee_mode: CollectFeeMode,
        activation_type: ActivationType,
    ) -> Result<()> {
        require!(
            collect_fee_mode == CollectFeeMode::QuoteToken,
            CurveError::InvalidFeeRateLimiter
        );
        require!(
            self.cliff_fee_numerator >= MIN_FEE_NUMERATOR
                && self.cliff_fee_numerator <= MAX_FEE_NUMERATOR,
            CurveError::ExceedMaxFeeBps
        );
        if self.is_zero_rate_limiter() {
            return Ok(());
        }
        require!(
            self.is_non_zero_rate_limiter(),
            CurveError::InvalidFeeRateLimiter
        );

        let max_limiter_duration = match activation_type {
            ActivationType::Slot => MAX_RATE_LIMITER_DURATION_IN_SLOTS,
            ActivationType::Timestamp => MAX_RATE_LIMITER_DURATION_IN_SECONDS,
        };
        require!(
            self.max_limiter_duration <= max_limiter_duration,
            CurveError::InvalidFeeRateLimiter
        );
        require!(
            self.get_fee_increment_numerator()? < FEE_DENOMINATOR,
            CurveError::InvalidFeeRateLimiter
        );

        let min_fee_numerator = self.get_fee_numerator_from_included_fee_amount(0)?;
        let max_fee_numerator = self.get_fee_numerator_from_included_fee_amount(u64::MAX)?;
        require!(
            min_fee_numerator >= MIN_FEE_NUMERATOR && max_fee_numerator <= MAX_FEE_NUMERATOR,
            CurveError::ExceedMaxFeeBps
        );
        Ok(())
    }

    fn get_base_fee_numerator_from_included_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        included_fee_amount: u64,
    ) -> Result<u64> {
        if self.is_rate_limiter_applied(current_point, activation_point, trade_direction)? {
            self.get_fee_numerator_from_included_fee_amount(included_fee_amount)
        } else {
            Ok(self.cliff_fee_numerator)
        }
    }

    fn get_base_fee_numerator_from_excluded_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        trade_direction: TradeDirection,
        excluded_fee_amount: u64,
    ) -> Result<u64> {
        if self.is_rate_limiter_applied(current_point, activation_point, trade_direction)? {
            self.get_fee_numerator_from_excluded_fee_amount(excluded_fee_amount)
        } else {
            Ok(self.cliff_fee_numerator)
        }
    }

    fn get_min_base_fee_numerator(&self) -> Result<u64> {
        Ok(self.cliff_fee_numerator)
    }
}

/// Builds a limiter from UI inputs; `reference_amount` is in whole quote tokens.
pub fn get_rate_limiter_params(
    base_fee_bps: u64,
    fee_increment_bps: u16,
    reference_amount: f64,
    max_limiter_duration: u32,
    token_quote_decimal: u8,
    activation_type: ActivationType,
) -> Result<FeeRateLimiter> {
    let reference_amount = convert_to_lamports(&decimal_from_f64(reference_amount)?, token_quote_decimal)?;
    let limiter = FeeRateLimiter {
        cliff_fee_numerator: to_numerator(base_fee_bps, FEE_DENOMINATOR)?,
        fee_increment_bps,
        max_limiter_duration,
        reference_amount,
    };
    require!(
        limiter.is_non_zero_rate_limiter(),
        CurveError::InvalidFeeRateLimiter
    );
    limiter.validate(CollectFeeMode::QuoteToken, activation_type)?;
    Ok(limiter)
}
