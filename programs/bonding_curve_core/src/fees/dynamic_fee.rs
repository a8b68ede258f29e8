//! Volatility based surcharge on top of the base fee.
//!
//! Price moves are measured in bins of `bin_step` basis points from a reference sqrt
//! price. The accumulated bin distance, squared and scaled by `variable_fee_control`,
//! becomes the variable fee numerator.

use crate::error::CurveError;
use crate::math::core_arithmetic::{shl_div, sqrt_u256, to_u128, Rounding};
use crate::utils::constants::*;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use ethnum::U256;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct DynamicFeeParams {
    pub bin_step: u16,
    pub bin_step_u128: u128,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub max_volatility_accumulator: u32,
    pub variable_fee_control: u32,
}

impl DynamicFeeParams {
    pub fn validate(&self) -> Result<()> {
        let valid = self.bin_step == BIN_STEP_BPS_DEFAULT
            && self.bin_step_u128 == BIN_STEP_BPS_U128_DEFAULT
            && self.filter_period < self.decay_period
            && u64::from(self.reduction_factor) <= BASIS_POINT_MAX
            && self.variable_fee_control <= U24_MAX
            && self.max_volatility_accumulator <= U24_MAX;
        if !valid {
            warn!(
                bin_step = self.bin_step,
                filter_period = self.filter_period,
                decay_period = self.decay_period,
                reduction_factor = self.reduction_factor,
                "rejected dynamic fee parameters"
            );
            return err!(CurveError::InvalidDynamicFeeParameters);
        }
        Ok(())
    }

    /// `ceil((volatility_accumulator * bin_step)^2 * variable_fee_control / 1e11)`
    pub fn get_variable_fee(&self, volatility_accumulator: u128) -> Result<u128> {
        let vfa_bin = volatility_accumulator.safe_mul(self.bin_step.into())?;
        let square_vfa_bin = vfa_bin.safe_mul(vfa_bin)?;
        let v_fee = square_vfa_bin.safe_mul(self.variable_fee_control.into())?;
        v_fee
            .safe_add(DYNAMIC_FEE_ROUNDING_OFFSET)?
            .safe_div(DYNAMIC_FEE_SCALING_FACTOR)
    }
}

/// Per pool volatility state, advanced swap by swap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct VolatilityTracker {
    pub last_update_timestamp: u64,
    pub sqrt_price_reference: u128,
    pub volatility_accumulator: u128,
    pub volatility_reference: u128,
}

impl VolatilityTracker {
    /// Moves the reference point once `filter_period` has passed since the last swap.
    /// Volatility decays by `reduction_factor` inside the decay window and resets after it.
    /// A timestamp older than the last update counts as no time passed.
    pub fn update_references(
        &mut self,
        params: &DynamicFeeParams,
        sqrt_price_current: u128,
        current_timestamp: u64,
    ) -> Result<()> {
        let elapsed = current_timestamp.saturating_sub(self.last_update_timestamp);
        if elapsed >= u64::from(params.filter_period) {
            self.sqrt_price_reference = sqrt_price_current;
            if elapsed < u64::from(params.decay_period) {
                self.volatility_reference = self
                    .volatility_accumulator
                    .safe_mul(params.reduction_factor.into())?
                    .safe_div(BASIS_POINT_MAX.into())?;
            } else {
                self.volatility_reference = 0;
            }
        }
        Ok(())
    }

    pub fn update_volatility_accumulator(
        &mut self,
        params: &DynamicFeeParams,
        sqrt_price: u128,
    ) -> Result<()> {
        let delta_bin_id =
            get_delta_bin_id(params.bin_step_u128, self.sqrt_price_reference, sqrt_price)?;
        let volatility_accumulator = self
            .volatility_reference
            .safe_add(delta_bin_id.safe_mul(BASIS_POINT_MAX.into())?)?;
        self.volatility_accumulator =
            volatility_accumulator.min(params.max_volatility_accumulator.into());
        Ok(())
    }

    /// Projects the tracker across one swap that moved the price from
    /// `sqrt_price_before` to `sqrt_price_after` at `current_timestamp`.
    pub fn record_swap(
        &mut self,
        params: &DynamicFeeParams,
        sqrt_price_before: u128,
        sqrt_price_after: u128,
        current_timestamp: u64,
    ) -> Result<()> {
        self.update_references(params, sqrt_price_before, current_timestamp)?;
        self.update_volatility_accumulator(params, sqrt_price_after)?;
        self.last_update_timestamp = self.last_update_timestamp.max(current_timestamp);
        Ok(())
    }
}

/// Distance between two sqrt prices in bins. Sqrt prices move half as fast as prices,
/// hence the doubling.
fn get_delta_bin_id(bin_step_u128: u128, sqrt_price_a: u128, sqrt_price_b: u128) -> Result<u128> {
    let (upper, lower) = if sqrt_price_a > sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    };
    let price_ratio = shl_div(upper, lower, RESOLUTION, Rounding::Down)?;
    let delta_bin_id = price_ratio.safe_sub(ONE_Q64)?.safe_div(bin_step_u128)?;
    delta_bin_id.safe_mul(2)
}

/// Dynamic fee parameters whose variable fee at `max_price_change_bps` of price movement
/// reaches `MAX_DYNAMIC_FEE_PERCENT` of `base_fee_numerator`.
pub fn get_dynamic_fee_params(
    base_fee_numerator: u64,
    max_price_change_bps: u16,
) -> Result<DynamicFeeParams> {
    require!(
        max_price_change_bps > 0 && max_price_change_bps <= MAX_PRICE_CHANGE_BPS_DEFAULT,
        CurveError::InvalidDynamicFeeParameters
    );

    let price_ratio = (U256::from(BASIS_POINT_MAX + u64::from(max_price_change_bps)) << 128)
        / U256::from(BASIS_POINT_MAX);
    let sqrt_price_ratio = to_u128(sqrt_u256(price_ratio))?;
    let delta_bin_id = sqrt_price_ratio
        .safe_sub(ONE_Q64)?
        .safe_div(BIN_STEP_BPS_U128_DEFAULT)?
        .safe_mul(2)?;
    let max_volatility_accumulator = delta_bin_id.safe_mul(BASIS_POINT_MAX.into())?;

    let vfa_bin = max_volatility_accumulator.safe_mul(BIN_STEP_BPS_DEFAULT.into())?;
    let squared_vfa_bin = vfa_bin.safe_mul(vfa_bin)?;
    let max_dynamic_fee_numerator = u128::from(base_fee_numerator)
        .safe_mul(MAX_DYNAMIC_FEE_PERCENT.into())?
        .safe_div(100)?;
    let v_fee = max_dynamic_fee_numerator
        .safe_mul(DYNAMIC_FEE_SCALING_FACTOR)?
        .saturating_sub(DYNAMIC_FEE_ROUNDING_OFFSET);
    let variable_fee_control = v_fee.safe_div(squared_vfa_bin)?;

    let params = DynamicFeeParams {
        bin_step: BIN_STEP_BPS_DEFAULT,
        bin_step_u128: BIN_STEP_BPS_U128_DEFAULT,
        filter_period: DYNAMIC_FEE_FILTER_PERIOD_DEFAULT,
        decay_period: DYNAMIC_FEE_DECAY_PERIOD_DEFAULT,
        reduction_factor: DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT,
        max_volatility_accumulator: u32::try_from(max_volatility_accumulator)
            .map_err(|_| CurveError::MathOverflow)?,
        variable_fee_control: u32::try_from(variable_fee_control)
            .map_err(|_| CurveError::MathOverflow)?,
    };
    params.validate()?;
    Ok(params)
}
