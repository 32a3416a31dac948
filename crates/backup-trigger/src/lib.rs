//! # backup-trigger
//! Relays scheduled backup triggers to the backup service and normalises the outcome.
//!

mod config;
pub mod relay;
mod result;
pub mod server;

pub use config::RelayConfig;
pub use relay::{BackupApiStatus, Relay, RelayError};
pub use result::RelayResult;
