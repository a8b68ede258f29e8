//! Config validation.
//!
//! Each check is a standalone predicate so callers can re-run a single invariant;
//! [`validate_config_parameters`] runs them all and stops at the first failure.

use crate::calibration::supply::{get_total_supply_from_curve, get_total_token_supply};
use crate::error::CurveError;
use crate::fees::{BaseFeeHandler, PoolFeesConfig};
use crate::state::{
    ActivationType, CollectFeeMode, ConfigParameters, CurveSegment, LockedVestingParams,
    MigratedPoolFee, MigrationFee, MigrationFeeOption, MigrationOption, TokenType,
};
use crate::utils::constants::*;
use anchor_lang::prelude::*;
use tracing::warn;

pub fn validate_config_parameters(params: &ConfigParameters) -> Result<()> {
    validate_pool_fees(
        &params.pool_fees,
        params.collect_fee_mode,
        params.activation_type,
    )?;
    validate_migration_target(
        params.migration_option,
        params.migration_fee_option,
        params.token_type,
    )?;
    validate_token_decimals(params.token_decimal)?;
    validate_lp_percentages(
        params.partner_lp_percentage,
        params.partner_locked_lp_percentage,
        params.creator_lp_percentage,
        params.creator_locked_lp_percentage,
    )?;
    validate_min_locked_liquidity(
        params.partner_locked_lp_percentage,
        params.creator_locked_lp_percentage,
    )?;
    validate_creator_trading_fee_percentage(params.creator_trading_fee_percentage)?;
    validate_migration_fee(&params.migration_fee)?;
    validate_migrated_pool_fee(
        &params.migrated_pool_fee,
        params.migration_fee_option,
        params.migration_option,
    )?;
    validate_locked_vesting(&params.locked_vesting)?;
    validate_migration_quote_threshold(params.migration_quote_threshold)?;
    validate_curve(params.sqrt_start_price, &params.curve)?;
    validate_token_supply(params)
}

pub fn validate_pool_fees(
    pool_fees: &PoolFeesConfig,
    collect_fee_mode: CollectFeeMode,
    activation_type: ActivationType,
) -> Result<()> {
    pool_fees
        .base_fee
        .validate(collect_fee_mode, activation_type)
        .inspect_err(|_| warn!(base_fee = ?pool_fees.base_fee, "base fee rejected"))?;
    if let Some(dynamic_fee) = &pool_fees.dynamic_fee {
        dynamic_fee
            .validate()
            .inspect_err(|_| warn!(?dynamic_fee, "dynamic fee rejected"))?;
    }
    Ok(())
}

/// Customizable migrated pool fees and Token-2022 mints need a concentrated pool.
pub fn validate_migration_target(
    migration_option: MigrationOption,
    migration_fee_option: MigrationFeeOption,
    token_type: TokenType,
) -> Result<()> {
    if migration_option == MigrationOption::DammV1
        && (migration_fee_option == MigrationFeeOption::Customizable
            || token_type == TokenType::Token2022)
    {
        warn!(
            ?migration_fee_option,
            ?token_type,
            "constant product migration does not support this setup"
        );
        return err!(CurveError::InvalidConfiguration);
    }
    Ok(())
}

pub fn validate_token_decimals(token_decimal: u8) -> Result<()> {
    if !(MIN_TOKEN_DECIMALS..=MAX_TOKEN_DECIMALS).contains(&token_decimal) {
        warn!(token_decimal, "token decimals out of range");
        return err!(CurveError::InvalidTokenDecimals);
    }
    Ok(())
}

pub fn validate_lp_percentages(
    partner_lp_percentage: u8,
    partner_locked_lp_percentage: u8,
    creator_lp_percentage: u8,
    creator_locked_lp_percentage: u8,
) -> Result<()> {
    let total = u16::from(partner_lp_percentage)
        + u16::from(partner_locked_lp_percentage)
        + u16::from(creator_lp_percentage)
        + u16::from(creator_locked_lp_percentage);
    if total != 100 {
        warn!(total, "LP percentages must add up to 100");
        return err!(CurveError::InvalidLpPercentage);
    }
    Ok(())
}

/// Locked LP available on the first day after migration, in basis points of the pool.
pub fn validate_min_locked_liquidity(
    partner_locked_lp_percentage: u8,
    creator_locked_lp_percentage: u8,
) -> Result<()> {
    let locked_bps =
        (u16::from(partner_locked_lp_percentage) + u16::from(creator_locked_lp_percentage)) * 100;
    if locked_bps < MIN_LOCKED_LIQUIDITY_BPS {
        warn!(
            locked_bps,
            min_locked_bps = MIN_LOCKED_LIQUIDITY_BPS,
            "not enough LP locked at migration"
        );
        return err!(CurveError::InsufficientLockedLiquidity);
    }
    Ok(())
}

pub fn validate_creator_trading_fee_percentage(percentage: u8) -> Result<()> {
    if percentage > 100 {
        warn!(percentage, "creator trading fee share above 100%");
        return err!(CurveError::InvalidCreatorTradingFeePercentage);
    }
    Ok(())
}

pub fn validate_migration_fee(migration_fee: &MigrationFee) -> Result<()> {
    if migration_fee.fee_percentage > MAX_MIGRATION_FEE_PERCENTAGE
        || migration_fee.creator_fee_percentage > MAX_CREATOR_MIGRATION_FEE_PERCENTAGE
    {
        warn!(
            fee_percentage = migration_fee.fee_percentage,
            creator_fee_percentage = migration_fee.creator_fee_percentage,
            "migration fee out of range"
        );
        return err!(CurveError::InvalidMigrationFee);
    }
    Ok(())
}

/// A fixed fee option leaves the migrated pool fee unset; the customizable option
/// requires a concentrated pool and a fee within bounds.
pub fn validate_migrated_pool_fee(
    migrated_pool_fee: &MigratedPoolFee,
    migration_fee_option: MigrationFeeOption,
    migration_option: MigrationOption,
) -> Result<()> {
    let valid = match migration_fee_option {
        MigrationFeeOption::Customizable => {
            migration_option == MigrationOption::DammV2
                && (MIN_MIGRATED_POOL_FEE_BPS..=MAX_MIGRATED_POOL_FEE_BPS)
                    .contains(&migrated_pool_fee.pool_fee_bps)
        }
        _ => migrated_pool_fee.is_none(),
    };
    if !valid {
        warn!(
            ?migrated_pool_fee,
            ?migration_fee_option,
            ?migration_option,
            "migrated pool fee rejected"
        );
        return err!(CurveError::InvalidMigratedPoolFee);
    }
    Ok(())
}

pub fn validate_locked_vesting(locked_vesting: &LockedVestingParams) -> Result<()> {
    if locked_vesting.is_none() {
        return Ok(());
    }
    let total = locked_vesting.get_total_amount()?;
    if locked_vesting.frequency == 0 || locked_vesting.number_of_period == 0 || total == 0 {
        warn!(?locked_vesting, "locked vesting rejected");
        return err!(CurveError::InvalidVestingParameters);
    }
    Ok(())
}

pub fn validate_migration_quote_threshold(migration_quote_threshold: u64) -> Result<()> {
    if migration_quote_threshold == 0 {
        warn!("migration quote threshold is zero");
        return err!(CurveError::InvalidQuoteThreshold);
    }
    Ok(())
}

/// Start price within bounds, at most `MAX_CURVE_POINT` segments with strictly
/// increasing upper bounds above the start price, and no empty segment.
pub fn validate_curve(sqrt_start_price: u128, curve: &[CurveSegment]) -> Result<()> {
    if !(MIN_SQRT_PRICE..MAX_SQRT_PRICE).contains(&sqrt_start_price) {
        warn!(sqrt_start_price, "start sqrt price out of range");
        return err!(CurveError::InvalidSqrtPrice);
    }
    if curve.is_empty() || curve.len() > MAX_CURVE_POINT {
        warn!(segments = curve.len(), "curve segment count out of range");
        return err!(CurveError::InvalidCurve);
    }

    let mut lower_sqrt_price = sqrt_start_price;
    for (index, segment) in curve.iter().enumerate() {
        if segment.sqrt_price <= lower_sqrt_price
            || segment.sqrt_price > MAX_SQRT_PRICE
            || segment.liquidity == 0
        {
            warn!(
                index,
                sqrt_price = segment.sqrt_price,
                lower_sqrt_price,
                liquidity = segment.liquidity,
                "curve segment rejected"
            );
            return err!(CurveError::InvalidCurve);
        }
        lower_sqrt_price = segment.sqrt_price;
    }
    Ok(())
}

/// Replays the supply accounting of config creation. The curve builders always declare
/// a fixed supply; without one this only checks that the curve can absorb the
/// migration threshold. With one, the pre migration supply must cover the buffered
/// curve and the post migration supply the unbuffered one.
pub fn validate_token_supply(params: &ConfigParameters) -> Result<()> {
    let minimum_supply_with_buffer = get_total_supply_from_curve(
        params.migration_quote_threshold,
        params.sqrt_start_price,
        &params.curve,
        &params.locked_vesting,
        params.migration_option,
        0,
        params.migration_fee.fee_percentage,
    )?;
    let Some(token_supply) = params.token_supply else {
        return Ok(());
    };
    let minimum_supply_without_buffer = get_total_token_supply(
        params.migration_quote_threshold,
        params.sqrt_start_price,
        &params.curve,
        &params.locked_vesting,
        params.migration_option,
        0,
        params.migration_fee.fee_percentage,
    )?;

    if token_supply.pre_migration_token_supply < minimum_supply_with_buffer
        || token_supply.post_migration_token_supply < minimum_supply_without_buffer
        || token_supply.post_migration_token_supply > token_supply.pre_migration_token_supply
    {
        warn!(
            pre_migration_token_supply = token_supply.pre_migration_token_supply,
            post_migration_token_supply = token_supply.post_migration_token_supply,
            minimum_supply_with_buffer,
            minimum_supply_without_buffer,
            "token supply cannot cover the curve"
        );
        return err!(CurveError::InvalidTokenSupply);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{build_curve, BuildCurveParams};
    use crate::fees::{BaseFeeParams, FeeRateLimiter};
    use crate::state::TokenSupplyParams;
    use crate::test_utils::{assert_curve_error, sample_common_params};

    fn valid_config() -> ConfigParameters {
        build_curve(&BuildCurveParams {
            common: sample_common_params(),
            percentage_supply_on_migration: 2.983257229832572,
            migration_quote_threshold: 95.07640791476408,
        })
        .unwrap()
    }

    #[test]
    fn test_built_config_passes() {
        validate_config_parameters(&valid_config()).unwrap();
    }

    #[test]
    fn test_rate_limiter_without_reference_amount() {
        let mut config = valid_config();
        config.pool_fees.base_fee = BaseFeeParams::RateLimiter(FeeRateLimiter {
            cliff_fee_numerator: 10_000_000,
            fee_increment_bps: 10,
            max_limiter_duration: 10,
            reference_amount: 0,
        });
        assert_curve_error(
            validate_config_parameters(&config),
            CurveError::InvalidFeeRateLimiter,
        );
    }

    #[test]
    fn test_lp_percentages_must_sum_to_hundred() {
        assert_curve_error(
            validate_lp_percentages(50, 40, 0, 0),
            CurveError::InvalidLpPercentage,
        );
        validate_lp_percentages(25, 25, 25, 25).unwrap();
    }

    #[test]
    fn test_locked_liquidity_floor() {
        assert_curve_error(
            validate_min_locked_liquidity(5, 4),
            CurveError::InsufficientLockedLiquidity,
        );
        validate_min_locked_liquidity(5, 5).unwrap();
    }

    #[test]
    fn test_token_decimals_bounds() {
        assert_curve_error(validate_token_decimals(5), CurveError::InvalidTokenDecimals);
        assert_curve_error(validate_token_decimals(10), CurveError::InvalidTokenDecimals);
        validate_token_decimals(6).unwrap();
        validate_token_decimals(9).unwrap();
    }

    #[test]
    fn test_migration_fee_bounds() {
        assert_curve_error(
            validate_migration_fee(&MigrationFee {
                fee_percentage: 51,
                creator_fee_percentage: 0,
            }),
            CurveError::InvalidMigrationFee,
        );
        validate_migration_fee(&MigrationFee {
            fee_percentage: 50,
            creator_fee_percentage: 100,
        })
        .unwrap();
    }

    #[test]
    fn test_customizable_migrated_pool_fee() {
        let fee = MigratedPoolFee {
            collect_fee_mode: CollectFeeMode::QuoteToken,
            dynamic_fee: false,
            pool_fee_bps: 100,
        };
        validate_migrated_pool_fee(&fee, MigrationFeeOption::Customizable, MigrationOption::DammV2)
            .unwrap();
        assert_curve_error(
            validate_migrated_pool_fee(&fee, MigrationFeeOption::Customizable, MigrationOption::DammV1),
            CurveError::InvalidMigratedPoolFee,
        );
        assert_curve_error(
            validate_migrated_pool_fee(&fee, MigrationFeeOption::FixedBps25, MigrationOption::DammV2),
            CurveError::InvalidMigratedPoolFee,
        );
        let too_low = MigratedPoolFee {
            pool_fee_bps: 5,
            ..fee
        };
        assert_curve_error(
            validate_migrated_pool_fee(&too_low, MigrationFeeOption::Customizable, MigrationOption::DammV2),
            CurveError::InvalidMigratedPoolFee,
        );
    }

    #[test]
    fn test_token2022_requires_concentrated_migration() {
        assert_curve_error(
            validate_migration_target(
                MigrationOption::DammV1,
                MigrationFeeOption::FixedBps25,
                TokenType::Token2022,
            ),
            CurveError::InvalidConfiguration,
        );
        validate_migration_target(
            MigrationOption::DammV2,
            MigrationFeeOption::Customizable,
            TokenType::Token2022,
        )
        .unwrap();
    }

    #[test]
    fn test_curve_must_increase() {
        let start = 1u128 << 64;
        let segment = |sqrt_price: u128, liquidity: u128| CurveSegment {
            sqrt_price,
            liquidity,
        };
        validate_curve(start, &[segment(2 << 64, 1), segment(3 << 64, 1)]).unwrap();
        assert_curve_error(
            validate_curve(start, &[segment(2 << 64, 1), segment(2 << 64, 1)]),
            CurveError::InvalidCurve,
        );
        assert_curve_error(
            validate_curve(start, &[segment(start, 1)]),
            CurveError::InvalidCurve,
        );
        assert_curve_error(
            validate_curve(start, &[segment(2 << 64, 0)]),
            CurveError::InvalidCurve,
        );
        assert_curve_error(validate_curve(start, &[]), CurveError::InvalidCurve);
        assert_curve_error(
            validate_curve(start, &vec![segment(2 << 64, 1); MAX_CURVE_POINT + 1]),
            CurveError::InvalidCurve,
        );
        assert_curve_error(
            validate_curve(MIN_SQRT_PRICE - 1, &[segment(2 << 64, 1)]),
            CurveError::InvalidSqrtPrice,
        );
    }

    #[test]
    fn test_locked_vesting_needs_periods() {
        validate_locked_vesting(&LockedVestingParams::default()).unwrap();
        assert_curve_error(
            validate_locked_vesting(&LockedVestingParams {
                amount_per_period: 10,
                number_of_period: 5,
                frequency: 0,
                ..Default::default()
            }),
            CurveError::InvalidVestingParameters,
        );
    }

    #[test]
    fn test_built_config_declares_its_supply() {
        let config = valid_config();
        assert_eq!(
            config.token_supply,
            Some(TokenSupplyParams {
                pre_migration_token_supply: 1_000_000_000_000_000,
                post_migration_token_supply: 1_000_000_000_000_000,
            })
        );
    }

    #[test]
    fn test_inflated_curve_exceeds_declared_supply() {
        let mut config = valid_config();
        config.curve[0].liquidity *= 100;
        assert_curve_error(
            validate_config_parameters(&config),
            CurveError::InvalidTokenSupply,
        );
    }

    #[test]
    fn test_fixed_token_supply_replay() {
        let mut config = valid_config();
        let required = get_total_supply_from_curve(
            config.migration_quote_threshold,
            config.sqrt_start_price,
            &config.curve,
            &config.locked_vesting,
            config.migration_option,
            0,
            0,
        )
        .unwrap();
        config.token_supply = Some(TokenSupplyParams {
            pre_migration_token_supply: required,
            post_migration_token_supply: required,
        });
        validate_token_supply(&config).unwrap();

        config.token_supply = Some(TokenSupplyParams {
            pre_migration_token_supply: required - 1,
            post_migration_token_supply: required - 1,
        });
        assert_curve_error(validate_token_supply(&config), CurveError::InvalidTokenSupply);
    }
}
