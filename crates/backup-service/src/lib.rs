//! # backup-service
//! Snapshots Qdrant collections, relocates the snapshots to object storage and serves the
//! backups over HTTP.
//!

mod config;
mod context;
pub mod destination;
mod result;
pub mod server;
mod service;
pub mod source;

pub use config::{Config, DestinationConfig, QdrantConfig, Timeouts};
pub use context::Context;
pub use result::{BatchBackupResult, CollectionBackupResult};
pub use service::{
    BackupError, BackupService, CleanupWarning, EnumerationError, PipelineSettings,
    destination_key, staging_file_name,
};
