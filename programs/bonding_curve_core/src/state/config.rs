use crate::calibration::supply::{
    get_migration_base_token, get_migration_quote_amount_from_migration_quote_threshold,
    get_migration_threshold_price,
};
use crate::fees::PoolFeesConfig;
use crate::state::config_parameters::ConfigParameters;
use anchor_lang::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum TradeDirection {
    #[default]
    BaseToQuote,
    QuoteToBase,
}

/// Which leg of a trade pays the trading fee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum CollectFeeMode {
    /// Fees are always taken in the quote token.
    #[default]
    QuoteToken,
    /// Fees are taken from whatever token leaves the pool.
    OutputToken,
}

/// Unit in which activation points and fee periods are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum ActivationType {
    #[default]
    Slot,
    Timestamp,
}

/// Pool type liquidity moves into once the curve completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum MigrationOption {
    /// Constant product pool, base amount derived from `quote / price`.
    #[default]
    DammV1,
    /// Concentrated pool spanning `[price, MAX_SQRT_PRICE]`.
    DammV2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum TokenType {
    #[default]
    SplToken,
    Token2022,
}

/// Trading fee of the pool created at migration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum MigrationFeeOption {
    #[default]
    FixedBps25,
    FixedBps30,
    FixedBps100,
    FixedBps200,
    FixedBps400,
    FixedBps600,
    /// Fee set through `MigratedPoolFee`; only available for `DammV2`.
    Customizable,
}

impl MigrationFeeOption {
    pub fn fee_bps(&self) -> Option<u16> {
        match self {
            MigrationFeeOption::FixedBps25 => Some(25),
            MigrationFeeOption::FixedBps30 => Some(30),
            MigrationFeeOption::FixedBps100 => Some(100),
            MigrationFeeOption::FixedBps200 => Some(200),
            MigrationFeeOption::FixedBps400 => Some(400),
            MigrationFeeOption::FixedBps600 => Some(600),
            MigrationFeeOption::Customizable => None,
        }
    }
}

/// One constant liquidity band of the bonding curve, bounded above by `sqrt_price`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct CurveSegment {
    pub sqrt_price: u128,
    pub liquidity: u128,
}

/// Read-only view of a pool config the swap engine prices against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub pool_fees: PoolFeesConfig,
    pub collect_fee_mode: CollectFeeMode,
    pub activation_type: ActivationType,
    pub migration_option: MigrationOption,
    pub migration_fee_percentage: u8,
    pub migration_quote_threshold: u64,
    pub migration_base_threshold: u64,
    pub migration_sqrt_price: u128,
    pub sqrt_start_price: u128,
    pub enable_first_swap_with_min_fee: bool,
    pub curve: Vec<CurveSegment>,
}

impl PoolConfig {
    /// Derives the runtime config the same way config creation does: the migration sqrt
    /// price is where the curve has absorbed `migration_quote_threshold`.
    pub fn from_parameters(params: &ConfigParameters) -> Result<Self> {
        let migration_sqrt_price = get_migration_threshold_price(
            params.migration_quote_threshold,
            params.sqrt_start_price,
            &params.curve,
        )?;
        let migration_quote_amount = get_migration_quote_amount_from_migration_quote_threshold(
            params.migration_quote_threshold,
            params.migration_fee.fee_percentage,
        )?;
        let migration_base_threshold = get_migration_base_token(
            migration_quote_amount,
            migration_sqrt_price,
            params.migration_option,
        )?;

        Ok(Self {
            pool_fees: params.pool_fees.clone(),
            collect_fee_mode: params.collect_fee_mode,
            activation_type: params.activation_type,
            migration_option: params.migration_option,
            migration_fee_percentage: params.migration_fee.fee_percentage,
            migration_quote_threshold: params.migration_quote_threshold,
            migration_base_threshold,
            migration_sqrt_price,
            sqrt_start_price: params.sqrt_start_price,
            enable_first_swap_with_min_fee: params.enable_first_swap_with_min_fee,
            curve: params.curve.clone(),
        })
    }

    /// Lower bound of segment `index`.
    #[inline]
    pub fn segment_lower_sqrt_price(&self, index: usize) -> u128 {
        match index {
            0 => self.sqrt_start_price,
            _ => self.curve[index - 1].sqrt_price,
        }
    }
}
