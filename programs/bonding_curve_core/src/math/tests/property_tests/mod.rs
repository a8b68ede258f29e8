mod core_arithmetic_proptest;
mod liquidity_math_proptest;
