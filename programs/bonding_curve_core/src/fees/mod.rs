pub mod base_fee;
pub mod dynamic_fee;
pub mod fee_scheduler;
pub mod pool_fees;
pub mod rate_limiter;

pub use base_fee::*;
pub use dynamic_fee::*;
pub use fee_scheduler::*;
pub use pool_fees::*;
pub use rate_limiter::*;
