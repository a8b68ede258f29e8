pub mod config;
pub mod config_parameters;
pub mod virtual_pool;

pub use config::*;
pub use config_parameters::*;
pub use virtual_pool::*;
