pub mod core_arithmetic;
pub mod decimal_math;
pub mod liquidity_math;
pub mod price_math;

mod tests;
