use crate::error::CurveError;
use anchor_lang::prelude::*;

/// Asserts that `result` failed with exactly `expected`.
pub(crate) fn assert_curve_error<T: std::fmt::Debug>(result: Result<T>, expected: CurveError) {
    match result {
        Ok(value) => panic!("Expected {expected:?} but got Ok({value:?})"),
        Err(err) => assert_eq!(err, Error::from(expected)),
    }
}

/// Launch with 1e9 tokens (6 decimals) against a 9 decimal quote, 1% flat fee and
/// every LP token locked with the partner.
pub(crate) fn sample_common_params() -> crate::calibration::CommonCurveParams {
    use crate::calibration::{BaseFeeBuildParams, CommonCurveParams, LockedVestingBuildParams};
    use crate::fees::FeeSchedulerMode;
    use crate::state::*;

    CommonCurveParams {
        total_token_supply: 1_000_000_000,
        migration_option: MigrationOption::DammV1,
        token_base_decimal: 6,
        token_quote_decimal: 9,
        locked_vesting: LockedVestingBuildParams::default(),
        base_fee: BaseFeeBuildParams::FeeScheduler {
            starting_fee_bps: 100,
            ending_fee_bps: 100,
            number_of_period: 0,
            total_duration: 0,
            mode: FeeSchedulerMode::Linear,
        },
        dynamic_fee_enabled: false,
        activation_type: ActivationType::Slot,
        collect_fee_mode: CollectFeeMode::QuoteToken,
        migration_fee_option: MigrationFeeOption::FixedBps25,
        token_type: TokenType::SplToken,
        partner_lp_percentage: 0,
        creator_lp_percentage: 0,
        partner_locked_lp_percentage: 100,
        creator_locked_lp_percentage: 0,
        creator_trading_fee_percentage: 0,
        leftover: 0,
        token_update_authority: 0,
        migration_fee: MigrationFee::default(),
        migrated_pool_fee: MigratedPoolFee::default(),
        enable_first_swap_with_min_fee: false,
    }
}
