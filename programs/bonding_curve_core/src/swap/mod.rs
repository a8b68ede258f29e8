//! Swap simulation over a segmented bonding curve.
//!
//! [`engine`] walks the curve for exact-in, exact-out and partial-fill trades;
//! [`quote`] wraps it with pool state checks and slippage bounds.

pub mod engine;
pub mod quote;

pub use engine::*;
pub use quote::*;
