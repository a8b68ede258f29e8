//! Off-chain pricing engine for bonding curve token launches.
//!
//! A pool sells base tokens along a piecewise constant-liquidity curve of Q64.64 sqrt
//! prices until it has collected its migration quote threshold, then migrates to an
//! AMM. This crate reproduces the program's arithmetic to the unit:
//!
//! * [`math`] holds the fixed point kernel and the curve delta primitives.
//! * [`fees`] implements the fee scheduler, the rate limiter and the dynamic fee.
//! * [`swap`] quotes exact-in, partial-fill and exact-out swaps.
//! * [`calibration`] derives curves from market caps, supply shares or price grids.
//! * [`validation`] re-checks a config before it is submitted.
//!
//! Nothing here performs I/O; failures are [`error::CurveError`] values.

pub mod calibration;
pub mod error;
pub mod fees;
pub mod math;
pub mod state;
pub mod swap;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use error::CurveError;
pub use state::{ConfigParameters, CurveSegment, PoolConfig, VirtualPool};
pub use validation::validate_config_parameters;
