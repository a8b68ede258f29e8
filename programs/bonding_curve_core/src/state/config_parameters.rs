use crate::error::CurveError;
use crate::fees::PoolFeesConfig;
use crate::state::config::{
    ActivationType, CollectFeeMode, CurveSegment, MigrationFeeOption, MigrationOption, TokenType,
};
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;

/// Creator tokens released after migration: a cliff unlock followed by
/// `number_of_period` equal releases every `frequency` points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct LockedVestingParams {
    pub amount_per_period: u64,
    pub cliff_duration_from_migration_time: u64,
    pub frequency: u64,
    pub number_of_period: u64,
    pub cliff_unlock_amount: u64,
}

impl LockedVestingParams {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }

    pub fn get_total_amount(&self) -> Result<u64> {
        self.amount_per_period
            .safe_mul(self.number_of_period)?
            .safe_add(self.cliff_unlock_amount)
    }
}

/// Fixed token supply; the difference between the two amounts is burnt at migration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct TokenSupplyParams {
    pub pre_migration_token_supply: u64,
    pub post_migration_token_supply: u64,
}

/// Share of the migration quote amount withheld as a fee, and the creator's cut of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct MigrationFee {
    pub fee_percentage: u8,
    pub creator_fee_percentage: u8,
}

/// Fee settings of the pool created at migration, used with
/// `MigrationFeeOption::Customizable`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct MigratedPoolFee {
    pub collect_fee_mode: CollectFeeMode,
    pub dynamic_fee: bool,
    pub pool_fee_bps: u16,
}

impl MigratedPoolFee {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

/// Complete pool configuration as submitted at config creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct ConfigParameters {
    pub pool_fees: PoolFeesConfig,
    pub collect_fee_mode: CollectFeeMode,
    pub migration_option: MigrationOption,
    pub activation_type: ActivationType,
    pub token_type: TokenType,
    pub token_decimal: u8,
    pub partner_lp_percentage: u8,
    pub partner_locked_lp_percentage: u8,
    pub creator_lp_percentage: u8,
    pub creator_locked_lp_percentage: u8,
    pub migration_quote_threshold: u64,
    pub sqrt_start_price: u128,
    pub locked_vesting: LockedVestingParams,
    pub migration_fee_option: MigrationFeeOption,
    pub token_supply: Option<TokenSupplyParams>,
    pub creator_trading_fee_percentage: u8,
    pub token_update_authority: u8,
    pub migration_fee: MigrationFee,
    pub migrated_pool_fee: MigratedPoolFee,
    pub enable_first_swap_with_min_fee: bool,
    pub curve: Vec<CurveSegment>,
}

impl ConfigParameters {
    /// Borsh encoding handed to the instruction builder.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.serialize(&mut data)
            .map_err(|_| error!(CurveError::InvalidConfiguration))?;
        Ok(data)
    }

    pub fn from_bytes(mut data: &[u8]) -> Result<Self> {
        Self::deserialize(&mut data).map_err(|_| error!(CurveError::InvalidConfiguration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vesting_total() {
        let vesting = LockedVestingParams {
            amount_per_period: 10,
            cliff_duration_from_migration_time: 0,
            frequency: 1,
            number_of_period: 5,
            cliff_unlock_amount: 7,
        };
        assert_eq!(vesting.get_total_amount().unwrap(), 57);
        assert!(!vesting.is_none());
        assert!(LockedVestingParams::default().is_none());
    }

    #[test]
    fn test_borsh_encoding_is_stable() {
        let params = ConfigParameters {
            token_decimal: 6,
            partner_lp_percentage: 100,
            migration_quote_threshold: 85_000_000_000,
            sqrt_start_price: 1 << 64,
            curve: vec![CurveSegment {
                sqrt_price: 2 << 64,
                liquidity: 1 << 70,
            }],
            ..Default::default()
        };
        let bytes = params.to_bytes().unwrap();
        assert_eq!(ConfigParameters::from_bytes(&bytes).unwrap(), params);
    }
}
