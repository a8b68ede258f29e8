use crate::error::CurveError;
use crate::fees::base_fee::{to_numerator, BaseFeeHandler};
use crate::math::core_arithmetic::{mul_shr, pow, Rounding};
use crate::math::decimal_math::{decimal_floor_to_u64, decimal_nth_root};
use crate::state::{ActivationType, CollectFeeMode, TradeDirection};
use crate::utils::constants::*;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_traits::One;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum FeeSchedulerMode {
    /// `cliff - period * reduction_factor`
    #[default]
    Linear,
    /// `cliff * (1 - reduction_factor / 10_000)^period`
    Exponential,
}

/// Fee that starts at a cliff and decays every `period_frequency` points after activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct FeeScheduler {
    pub cliff_fee_numerator: u64,
    pub number_of_period: u16,
    pub period_frequency: u64,
    pub reduction_factor: u64,
    pub mode: FeeSchedulerMode,
}

impl FeeScheduler {
    /// Elapsed periods since activation, clamped to `number_of_period`.
    pub fn get_current_period(&self, current_point: u64, activation_point: u64) -> Result<u64> {
        if self.period_frequency == 0 || current_point < activation_point {
            return Ok(0);
        }
        let period = current_point
            .safe_sub(activation_point)?
            .safe_div(self.period_frequency)?;
        Ok(period.min(self.number_of_period.into()))
    }

    pub fn get_base_fee_numerator_by_period(&self, period: u64) -> Result<u64> {
        let period = period.min(self.number_of_period.into());
        match self.mode {
            FeeSchedulerMode::Linear => {
                let reduction = period.safe_mul(self.reduction_factor)?;
                self.cliff_fee_numerator.safe_sub(reduction)
            }
            FeeSchedulerMode::Exponential => {
                get_fee_in_period(self.cliff_fee_numerator, self.reduction_factor, period)
            }
        }
    }

    pub fn get_base_fee_numerator(&self, current_point: u64, activation_point: u64) -> Result<u64> {
        let period = self.get_current_period(current_point, activation_point)?;
        self.get_base_fee_numerator_by_period(period)
    }

    #[inline]
    fn is_zero_schedule(&self) -> bool {
        self.period_frequency == 0 && self.number_of_period == 0 && self.reduction_factor == 0
    }

    #[inline]
    fn is_non_zero_schedule(&self) -> bool {
        self.period_frequency != 0 && self.number_of_period != 0 && self.reduction_factor != 0
    }
}

/// `cliff * (1 - reduction_factor / 10_000)^period` evaluated with a Q64.64 base.
fn get_fee_in_period(cliff_fee_numerator: u64, reduction_factor: u64, period: u64) -> Result<u64> {
    if period == 0 {
        return Ok(cliff_fee_numerator);
    }
    let reduction = (u128::from(reduction_factor) << RESOLUTION).safe_div(BASIS_POINT_MAX.into())?;
    let base = ONE_Q64.safe_sub(reduction)?;
    let decay = pow(base, period.into(), true)?;
    let fee = mul_shr(decay, cliff_fee_numerator.into(), RESOLUTION, Rounding::Down)?;
    u64::try_from(fee).map_err(|_| CurveError::MathOverflow.into())
}

impl BaseFeeHandler for FeeScheduler {
    fn validate(
        &self,
        _collect_fee_mode: CollectFeeMode,
        _activation_type: ActivationType,
    ) -> Result<()> {
        require!(
            self.is_zero_schedule() || self.is_non_zero_schedule(),
            CurveError::InvalidFeeScheduler
        );
        if self.mode == FeeSchedulerMode::Exponential {
            require!(
                self.reduction_factor < BASIS_POINT_MAX,
                CurveError::InvalidFeeScheduler
            );
        }
        let min_fee_numerator = self.get_min_base_fee_numerator()?;
        require!(
            min_fee_numerator >= MIN_FEE_NUMERATOR
                && self.cliff_fee_numerator <= MAX_FEE_NUMERATOR,
            CurveError::ExceedMaxFeeBps
        );
        Ok(())
    }

    fn get_base_fee_numerator_from_included_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        _trade_direction: TradeDirection,
        _included_fee_amount: u64,
    ) -> Result<u64> {
        self.get_base_fee_numerator(current_point, activation_point)
    }

    fn get_base_fee_numerator_from_excluded_fee_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        _trade_direction: TradeDirection,
        _excluded_fee_amount: u64,
    ) -> Result<u64> {
        self.get_base_fee_numerator(current_point, activation_point)
    }

    fn get_min_base_fee_numerator(&self) -> Result<u64> {
        self.get_base_fee_numerator_by_period(self.number_of_period.into())
    }
}

/// Builds a scheduler that decays from `starting_fee_bps` to `ending_fee_bps` over
/// `number_of_period` equal periods spanning `total_duration` points.
///
/// Equal start and end fees produce a flat fee with every schedule field zeroed.
pub fn get_fee_scheduler_params(
    starting_fee_bps: u64,
    ending_fee_bps: u64,
    mode: FeeSchedulerMode,
    number_of_period: u16,
    total_duration: u64,
) -> Result<FeeScheduler> {
    if starting_fee_bps == ending_fee_bps {
        require!(
            number_of_period == 0 && total_duration == 0,
            CurveError::InvalidFeeScheduler
        );
        return Ok(FeeScheduler {
            cliff_fee_numerator: to_numerator(starting_fee_bps, FEE_DENOMINATOR)?,
            mode,
            ..Default::default()
        });
    }

    require!(
        starting_fee_bps <= MAX_FEE_BPS && ending_fee_bps >= MIN_FEE_BPS,
        CurveError::ExceedMaxFeeBps
    );
    require!(
        ending_fee_bps < starting_fee_bps,
        CurveError::InvalidFeeScheduler
    );
    require!(
        number_of_period > 0 && total_duration > 0,
        CurveError::InvalidFeeScheduler
    );

    let max_fee_numerator = to_numerator(starting_fee_bps, FEE_DENOMINATOR)?;
    let min_fee_numerator = to_numerator(ending_fee_bps, FEE_DENOMINATOR)?;
    let period_frequency = total_duration.safe_div(number_of_period.into())?;
    require!(period_frequency > 0, CurveError::InvalidFeeScheduler);

    let reduction_factor = match mode {
        FeeSchedulerMode::Linear => max_fee_numerator
            .safe_sub(min_fee_numerator)?
            .safe_div(number_of_period.into())?,
        FeeSchedulerMode::Exponential => {
            let ratio =
                BigDecimal::from(min_fee_numerator) / BigDecimal::from(max_fee_numerator);
            let decay_base = decimal_nth_root(&ratio, number_of_period.into())?;
            let reduction = (BigDecimal::one() - decay_base) * BigDecimal::from(BASIS_POINT_MAX);
            decimal_floor_to_u64(&reduction)?
        }
    };
    require!(reduction_factor > 0, CurveError::InvalidFeeScheduler);

    Ok(FeeScheduler {
        cliff_fee_numerator: max_fee_numerator,
        number_of_period,
        period_frequency,
        reduction_factor,
        mode,
    })
}
