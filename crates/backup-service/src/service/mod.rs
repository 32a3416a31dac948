use core::time::Duration;
use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    Config,
    destination::Destination,
    source::{SnapshotSource, SourceError},
};

mod backup_all;
mod backup_collection;
mod cleanup;

pub use backup_all::EnumerationError;
pub use backup_collection::{BackupError, destination_key, staging_file_name};
pub use cleanup::CleanupWarning;

/// Settings for running the backup pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory snapshots are downloaded into.
    pub staging_directory: PathBuf,

    /// Prefix for destination keys.
    pub folder_prefix: String,

    /// How long an upload may take.
    pub upload_timeout: Duration,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            staging_directory: config.staging_directory.clone(),
            folder_prefix: config.destination.folder_prefix.clone(),
            upload_timeout: config.timeouts.upload(),
        }
    }
}

/// Backs up collections from a source to a destination.
///
/// The source and destination are shared by every request and are never written to after
/// creation.
pub struct BackupService {
    /// The snapshot source.
    pub source: Arc<dyn SnapshotSource>,

    /// Where the snapshots are relocated to.
    pub destination: Arc<dyn Destination>,

    /// The pipeline settings.
    pub settings: PipelineSettings,

    clock: fn() -> DateTime<Utc>,
}

impl BackupService {
    /// Create a new backup service.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        destination: Arc<dyn Destination>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            destination,
            settings,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for timestamps, staging file names and destination keys.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Check the source is reachable.
    pub async fn check_source(&self) -> Result<(), SourceError> {
        self.source.check_connection().await
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
