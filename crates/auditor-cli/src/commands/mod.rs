//! Command implementations.

pub mod analyze;
pub mod check_config;

pub use self::analyze::execute_analyze;
pub use self::check_config::execute_check_config;
