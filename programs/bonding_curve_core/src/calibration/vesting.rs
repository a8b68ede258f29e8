use crate::calibration::params::LockedVestingBuildParams;
use crate::error::CurveError;
use crate::math::decimal_math::convert_to_lamports;
use crate::state::LockedVestingParams;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;

fn to_lamports(amount: u64, decimals: u8) -> Result<u64> {
    convert_to_lamports(&BigDecimal::from(amount), decimals)
}

/// Turns whole-token vesting inputs into on-chain vesting parameters.
///
/// The periodic amount is floored to whole tokens and the rounding remainder is
/// released with the cliff, so the total always matches
/// `total_locked_vesting_amount`. A vesting that is entirely cliff still needs one
/// period, which takes a single token from the cliff.
pub fn get_locked_vesting_params(
    params: &LockedVestingBuildParams,
    token_base_decimal: u8,
) -> Result<LockedVestingParams> {
    let total = params.total_locked_vesting_amount;
    if total == 0 {
        return Ok(LockedVestingParams::default());
    }
    require!(
        params.cliff_unlock_amount <= total,
        CurveError::InvalidVestingParameters
    );

    if total == params.cliff_unlock_amount {
        return Ok(LockedVestingParams {
            amount_per_period: to_lamports(1, token_base_decimal)?,
            cliff_duration_from_migration_time: params.cliff_duration_from_migration_time,
            frequency: 1,
            number_of_period: 1,
            cliff_unlock_amount: to_lamports(total - 1, token_base_decimal)?,
        });
    }

    require!(
        params.number_of_vesting_period > 0 && params.total_vesting_duration > 0,
        CurveError::InvalidVestingParameters
    );

    let frequency = params.total_vesting_duration / params.number_of_vesting_period;
    let amount_per_period =
        (total - params.cliff_unlock_amount) / params.number_of_vesting_period;
    let total_periodic_amount = amount_per_period.safe_mul(params.number_of_vesting_period)?;
    let remainder = total
        .safe_sub(params.cliff_unlock_amount)?
        .safe_sub(total_periodic_amount)?;
    let cliff_unlock_amount = params.cliff_unlock_amount.safe_add(remainder)?;

    Ok(LockedVestingParams {
        amount_per_period: to_lamports(amount_per_period, token_base_decimal)?,
        cliff_duration_from_migration_time: params.cliff_duration_from_migration_time,
        frequency,
        number_of_period: params.number_of_vesting_period,
        cliff_unlock_amount: to_lamports(cliff_unlock_amount, token_base_decimal)?,
    })
}
