//! # Shared
//! The shared components between the backup service and the backup trigger.
//!

#![warn(missing_docs)]

pub mod env;
mod fatal;
mod logger;

pub use env::{ConfigError, Lookup, ProcessEnvironment};
pub use fatal::{Fatal, STARTUP_FAILURE_EXIT_CODE, log_and_exit};
pub use logger::{LoggerError, init_logger};
