use crate::fees::VolatilityTracker;
use crate::state::config::PoolConfig;
use anchor_lang::prelude::*;

/// Snapshot of a bonding curve pool the swap engine prices against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct VirtualPool {
    pub sqrt_price: u128,
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub activation_point: u64,
    pub volatility_tracker: VolatilityTracker,
}

impl VirtualPool {
    /// Fresh pool sitting at the config's start price.
    pub fn new(config: &PoolConfig, base_reserve: u64, activation_point: u64) -> Self {
        Self {
            sqrt_price: config.sqrt_start_price,
            base_reserve,
            quote_reserve: 0,
            activation_point,
            volatility_tracker: VolatilityTracker {
                last_update_timestamp: 0,
                sqrt_price_reference: config.sqrt_start_price,
                volatility_accumulator: 0,
                volatility_reference: 0,
            },
        }
    }

    /// The curve is complete once it has absorbed the migration quote threshold.
    pub fn is_curve_complete(&self, migration_quote_threshold: u64) -> bool {
        self.quote_reserve >= migration_quote_threshold
    }
}
