//! Business level inputs of the curve builders.
//!
//! Token amounts are whole tokens and prices, market caps and thresholds are UI
//! values in quote tokens, as a launchpad operator would enter them.

use crate::calibration::vesting::get_locked_vesting_params;
use crate::fees::{
    get_dynamic_fee_params, get_fee_scheduler_params, get_rate_limiter_params, BaseFeeHandler,
    BaseFeeParams, FeeSchedulerMode, PoolFeesConfig,
};
use crate::math::decimal_math::convert_to_lamports;
use crate::state::{
    ActivationType, CollectFeeMode, ConfigParameters, CurveSegment, LockedVestingParams,
    MigratedPoolFee, MigrationFee, MigrationFeeOption, MigrationOption, TokenSupplyParams,
    TokenType,
};
use crate::utils::constants::MAX_PRICE_CHANGE_BPS_DEFAULT;
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaseFeeBuildParams {
    FeeScheduler {
        starting_fee_bps: u64,
        ending_fee_bps: u64,
        number_of_period: u16,
        total_duration: u64,
        mode: FeeSchedulerMode,
    },
    RateLimiter {
        base_fee_bps: u64,
        fee_increment_bps: u16,
        /// Whole quote tokens per band.
        reference_amount: f64,
        max_limiter_duration: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockedVestingBuildParams {
    pub total_locked_vesting_amount: u64,
    pub number_of_vesting_period: u64,
    pub cliff_unlock_amount: u64,
    pub total_vesting_duration: u64,
    pub cliff_duration_from_migration_time: u64,
}

/// Settings every builder shares.
#[derive(Clone, Debug, PartialEq)]
pub struct CommonCurveParams {
    pub total_token_supply: u64,
    pub migration_option: MigrationOption,
    pub token_base_decimal: u8,
    pub token_quote_decimal: u8,
    pub locked_vesting: LockedVestingBuildParams,
    pub base_fee: BaseFeeBuildParams,
    pub dynamic_fee_enabled: bool,
    pub activation_type: ActivationType,
    pub collect_fee_mode: CollectFeeMode,
    pub migration_fee_option: MigrationFeeOption,
    pub token_type: TokenType,
    pub partner_lp_percentage: u8,
    pub creator_lp_percentage: u8,
    pub partner_locked_lp_percentage: u8,
    pub creator_locked_lp_percentage: u8,
    pub creator_trading_fee_percentage: u8,
    /// Whole base tokens kept out of the curve and the migration.
    pub leftover: u64,
    pub token_update_authority: u8,
    pub migration_fee: MigrationFee,
    pub migrated_pool_fee: MigratedPoolFee,
    pub enable_first_swap_with_min_fee: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveParams {
    pub common: CommonCurveParams,
    pub percentage_supply_on_migration: f64,
    pub migration_quote_threshold: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveWithMarketCapParams {
    pub common: CommonCurveParams,
    pub initial_market_cap: f64,
    pub migration_market_cap: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveWithTwoSegmentsParams {
    pub common: CommonCurveParams,
    pub initial_market_cap: f64,
    pub migration_market_cap: f64,
    pub percentage_supply_on_migration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveWithMidPriceParams {
    pub common: CommonCurveParams,
    pub initial_market_cap: f64,
    pub migration_market_cap: f64,
    /// UI price (quote per base token) at the segment boundary.
    pub mid_price: f64,
    pub percentage_supply_on_migration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveWithLiquidityWeightsParams {
    pub common: CommonCurveParams,
    pub initial_market_cap: f64,
    pub migration_market_cap: f64,
    pub liquidity_weights: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCurveWithCustomSqrtPricesParams {
    pub common: CommonCurveParams,
    /// Segment boundaries, first one is the start price.
    pub sqrt_prices: Vec<u128>,
    /// One weight per segment; equal weights when absent.
    pub liquidity_weights: Option<Vec<f64>>,
}

/// Raw unit amounts derived once from [`CommonCurveParams`].
pub(crate) struct SupplyInputs {
    pub total_supply: u64,
    pub total_leftover: u64,
    pub locked_vesting: LockedVestingParams,
    pub total_vesting_amount: u64,
}

impl CommonCurveParams {
    pub(crate) fn supply_inputs(&self) -> Result<SupplyInputs> {
        let locked_vesting = get_locked_vesting_params(&self.locked_vesting, self.token_base_decimal)?;
        Ok(SupplyInputs {
            total_supply: self.to_base_lamports(self.total_token_supply)?,
            total_leftover: self.to_base_lamports(self.leftover)?,
            total_vesting_amount: locked_vesting.get_total_amount()?,
            locked_vesting,
        })
    }

    pub(crate) fn to_base_lamports(&self, amount: u64) -> Result<u64> {
        convert_to_lamports(&BigDecimal::from(amount), self.token_base_decimal)
    }

    /// Base fee from the build inputs plus, when enabled, a dynamic fee sized off the
    /// minimum base fee.
    pub fn build_pool_fees(&self) -> Result<PoolFeesConfig> {
        let base_fee = match self.base_fee {
            BaseFeeBuildParams::FeeScheduler {
                starting_fee_bps,
                ending_fee_bps,
                number_of_period,
                total_duration,
                mode,
            } => BaseFeeParams::FeeScheduler(get_fee_scheduler_params(
                starting_fee_bps,
                ending_fee_bps,
                mode,
                number_of_period,
                total_duration,
            )?),
            BaseFeeBuildParams::RateLimiter {
                base_fee_bps,
                fee_increment_bps,
                reference_amount,
                max_limiter_duration,
            } => BaseFeeParams::RateLimiter(get_rate_limiter_params(
                base_fee_bps,
                fee_increment_bps,
                reference_amount,
                max_limiter_duration,
                self.token_quote_decimal,
                self.activation_type,
            )?),
        };
        let dynamic_fee = if self.dynamic_fee_enabled {
            Some(get_dynamic_fee_params(
                base_fee.get_min_base_fee_numerator()?,
                MAX_PRICE_CHANGE_BPS_DEFAULT,
            )?)
        } else {
            None
        };
        Ok(PoolFeesConfig {
            base_fee,
            dynamic_fee,
        })
    }

    pub(crate) fn to_config_parameters(
        &self,
        locked_vesting: LockedVestingParams,
        migration_quote_threshold: u64,
        sqrt_start_price: u128,
        curve: Vec<CurveSegment>,
    ) -> Result<ConfigParameters> {
        let total_supply = self.to_base_lamports(self.total_token_supply)?;
        Ok(ConfigParameters {
            pool_fees: self.build_pool_fees()?,
            collect_fee_mode: self.collect_fee_mode,
            migration_option: self.migration_option,
            activation_type: self.activation_type,
            token_type: self.token_type,
            token_decimal: self.token_base_decimal,
            partner_lp_percentage: self.partner_lp_percentage,
            partner_locked_lp_percentage: self.partner_locked_lp_percentage,
            creator_lp_percentage: self.creator_lp_percentage,
            creator_locked_lp_percentage: self.creator_locked_lp_percentage,
            migration_quote_threshold,
            sqrt_start_price,
            locked_vesting,
            migration_fee_option: self.migration_fee_option,
            token_supply: Some(TokenSupplyParams {
                pre_migration_token_supply: total_supply,
                post_migration_token_supply: total_supply,
            }),
            creator_trading_fee_percentage: self.creator_trading_fee_percentage,
            token_update_authority: self.token_update_authority,
            migration_fee: self.migration_fee,
            migrated_pool_fee: self.migrated_pool_fee,
            enable_first_swap_with_min_fee: self.enable_first_swap_with_min_fee,
            curve,
        })
    }
}
