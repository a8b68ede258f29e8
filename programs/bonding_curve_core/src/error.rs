use anchor_lang::prelude::*;

#[error_code]
pub enum CurveError {
    #[msg("Arithmetic overflow detected")]
    MathOverflow = 9000,

    #[msg("Arithmetic underflow detected")]
    Underflow = 9001,

    #[msg("Division by zero attempted")]
    DivisionByZero = 9002,

    #[msg("Exponent is wider than 64 bits")]
    ExponentTooLarge = 9003,

    #[msg("Square root of a negative value")]
    NegativeSqrtInput = 9004,

    #[msg("Sqrt price or liquidity is zero")]
    InvalidState = 9005,

    #[msg("Not enough liquidity on the curve to fill the trade")]
    InsufficientLiquidity = 9006,

    #[msg("Curve segments are not strictly increasing or carry zero liquidity")]
    InvalidCurve = 9007,

    #[msg("No candidate midpoint produced a valid two segment curve")]
    NoValidCurve = 9008,

    #[msg("Curve requires more base token than the declared supply")]
    SupplyOverrun = 9009,

    #[msg("Invalid configuration parameters")]
    InvalidConfiguration = 9010,

    #[msg("Invalid fee scheduler parameters")]
    InvalidFeeScheduler = 9011,

    #[msg("Invalid fee rate limiter parameters")]
    InvalidFeeRateLimiter = 9012,

    #[msg("Fee numerator outside the allowed range")]
    ExceedMaxFeeBps = 9013,

    #[msg("Invalid dynamic fee parameters")]
    InvalidDynamicFeeParameters = 9014,

    #[msg("Invalid locked vesting parameters")]
    InvalidVestingParameters = 9015,

    #[msg("LP percentages must sum to 100")]
    InvalidLpPercentage = 9016,

    #[msg("Locked liquidity at day one is below the minimum")]
    InsufficientLockedLiquidity = 9017,

    #[msg("Invalid migration fee")]
    InvalidMigrationFee = 9018,

    #[msg("Invalid migrated pool fee")]
    InvalidMigratedPoolFee = 9019,

    #[msg("Token decimals must be between 6 and 9")]
    InvalidTokenDecimals = 9020,

    #[msg("Creator trading fee percentage exceeds 100")]
    InvalidCreatorTradingFeePercentage = 9021,

    #[msg("Token supply cannot cover the curve")]
    InvalidTokenSupply = 9022,

    #[msg("Sqrt price outside valid bounds")]
    InvalidSqrtPrice = 9023,

    #[msg("Migration quote threshold must be positive")]
    InvalidQuoteThreshold = 9024,

    #[msg("Pool has reached the migration threshold")]
    PoolCompleted = 9025,

    #[msg("Amount must be greater than zero")]
    AmountIsZero = 9026,

    #[msg("Slippage tolerance exceeds 10000 bps")]
    InvalidSlippage = 9027,

    #[msg("Decimal input must be finite and non-negative")]
    InvalidDecimalInput = 9028,
}
