//! Curve calibration: derives a curve and start price from launch targets.

pub mod params;
pub mod single_segment;
pub mod supply;
pub mod two_segment;
pub mod vesting;
pub mod weighted;

pub use params::*;
pub use single_segment::*;
pub use supply::*;
pub use two_segment::*;
pub use vesting::*;
pub use weighted::*;
