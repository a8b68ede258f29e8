pub mod constants;
pub mod safe_math;
