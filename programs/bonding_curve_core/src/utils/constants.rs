pub const RESOLUTION: u32 = 64; // Q64.64
pub const ONE_Q64: u128 = 1u128 << RESOLUTION;
pub const MIN_SQRT_PRICE: u128 = 4_295_048_016;
pub const MAX_SQRT_PRICE: u128 = 79_226_673_521_066_979_257_578_248_091;

pub const MAX_CURVE_POINT: usize = 16;
pub const MAX_ITERATIONS: usize = 200;

/// Fee numerators are expressed over this denominator
pub const FEE_DENOMINATOR: u64 = 1_000_000_000;
pub const MIN_FEE_NUMERATOR: u64 = 2_500_000; // 0.25%
pub const MAX_FEE_NUMERATOR: u64 = 990_000_000; // 99%
pub const MIN_FEE_BPS: u64 = 25;
pub const MAX_FEE_BPS: u64 = 9_900;
pub const BASIS_POINT_MAX: u64 = 10_000;

pub const PROTOCOL_FEE_PERCENT: u8 = 20;
pub const HOST_FEE_PERCENT: u8 = 20;

/// Dynamic fee defaults
pub const BIN_STEP_BPS_DEFAULT: u16 = 1;
pub const BIN_STEP_BPS_U128_DEFAULT: u128 = 1_844_674_407_370_955; // 1 bps in Q64.64
pub const DYNAMIC_FEE_FILTER_PERIOD_DEFAULT: u16 = 10;
pub const DYNAMIC_FEE_DECAY_PERIOD_DEFAULT: u16 = 120;
pub const DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT: u16 = 5_000;
pub const MAX_PRICE_CHANGE_BPS_DEFAULT: u16 = 1_500;
pub const MAX_DYNAMIC_FEE_PERCENT: u64 = 20;
pub const DYNAMIC_FEE_SCALING_FACTOR: u128 = 100_000_000_000;
pub const DYNAMIC_FEE_ROUNDING_OFFSET: u128 = 99_999_999_999;
pub const U24_MAX: u32 = 0xFF_FFFF;

pub const MAX_RATE_LIMITER_DURATION_IN_SECONDS: u32 = 43_200; // 12 hours
pub const MAX_RATE_LIMITER_DURATION_IN_SLOTS: u32 = 108_000;

/// Extra base token reserved on top of the swap amount
pub const SWAP_BUFFER_PERCENTAGE: u64 = 25;
/// Times a curve body is re-solved with a smaller sale target before giving up
pub const MAX_SUPPLY_FIT_ATTEMPTS: u32 = 8;

pub const MAX_MIGRATION_FEE_PERCENTAGE: u8 = 50;
pub const MAX_CREATOR_MIGRATION_FEE_PERCENTAGE: u8 = 100;
pub const MIN_LOCKED_LIQUIDITY_BPS: u16 = 1_000;
pub const MIN_MIGRATED_POOL_FEE_BPS: u16 = 10;
pub const MAX_MIGRATED_POOL_FEE_BPS: u16 = 1_000;

pub const MIN_TOKEN_DECIMALS: u8 = 6;
pub const MAX_TOKEN_DECIMALS: u8 = 9;
