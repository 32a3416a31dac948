use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    CollectionBackupResult, Context,
    destination::StoreError,
    source::SourceError,
};

use super::BackupService;

/// The name of the staging file for a snapshot.
pub fn staging_file_name(collection: &str, snapshot: &str, at: DateTime<Utc>) -> String {
    format!("{collection}_{}_{snapshot}", at.format("%Y%m%d_%H%M%S"))
}

/// The destination key for a staging file, `prefix/YYYY/MM/DD/file_name`.
pub fn destination_key(prefix: &str, file_name: &str, at: DateTime<Utc>) -> String {
    let date = at.format("%Y/%m/%d");

    match prefix.trim_matches('/') {
        "" => format!("{date}/{file_name}"),
        prefix => format!("{prefix}/{date}/{file_name}"),
    }
}

/// Resources created by a pipeline run that cleanup must remove.
#[derive(Default)]
struct Created {
    snapshot: Option<String>,
    staging_file: Option<PathBuf>,
}

impl BackupService {
    /// Back up one collection: create a snapshot, download it, upload it, then clean up.
    ///
    /// Cleanup runs for whatever was created, even if a step failed.
    pub async fn backup_collection(&self, collection: &str) -> CollectionBackupResult {
        let mut context = Context::new(collection);
        let mut result = CollectionBackupResult::new(collection);
        let mut created = Created::default();

        info!("{context}Starting backup");
        let outcome = self.run_steps(&mut context, &mut created, self.now()).await;
        result.snapshot_name.clone_from(&created.snapshot);

        let warnings = self
            .cleanup(
                &mut context,
                created.staging_file.as_deref(),
                created.snapshot.as_deref(),
            )
            .await;
        result.cleanup_warnings = warnings.iter().map(ToString::to_string).collect();

        match outcome {
            Ok(key) => {
                context.current_context = "Complete";
                info!("{context}Backed up to {}", self.destination.describe(&key));
                result.success = true;
                result.destination_path = Some(key);
            }
            Err(error) => {
                error!("{context}Backup failed: {error}");
                result.error = Some(error.to_string());
            }
        }

        result
    }

    async fn run_steps(
        &self,
        context: &mut Context,
        created: &mut Created,
        at: DateTime<Utc>,
    ) -> Result<String, BackupError> {
        let collection = context.collection.clone();

        // Create snapshot
        let snapshot = {
            context.current_context = "Create Snapshot";

            let snapshot = self
                .source
                .create_snapshot(&collection)
                .await
                .map_err(BackupError::SnapshotCreation)?;

            created.snapshot = Some(snapshot.clone());
            context.snapshot = Some(snapshot.clone());
            info!("{context}Created snapshot");

            snapshot
        };

        // Download snapshot
        let file_name = {
            context.current_context = "Download Snapshot";

            let file_name = staging_file_name(&collection, &snapshot, at);
            let staging_file = self.settings.staging_directory.join(&file_name);
            created.staging_file = Some(staging_file.clone());

            let bytes = self
                .source
                .download_snapshot(&collection, &snapshot, &staging_file)
                .await
                .map_err(BackupError::SnapshotTransfer)?;
            info!("{context}Downloaded {bytes} bytes to {staging_file:?}");

            file_name
        };

        // Upload snapshot
        {
            context.current_context = "Upload Snapshot";

            let key = destination_key(&self.settings.folder_prefix, &file_name, at);
            let staging_file = self.settings.staging_directory.join(&file_name);
            let timeout = self.settings.upload_timeout;

            tokio::time::timeout(timeout, self.destination.upload(&staging_file, &key))
                .await
                .map_err(|_| StoreError::TimedOut(timeout.as_secs()))
                .and_then(|uploaded| uploaded)
                .map_err(BackupError::Relocation)?;

            Ok(key)
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to create snapshot: {0}")]
    SnapshotCreation(#[source] SourceError),

    #[error("Failed to download snapshot: {0}")]
    SnapshotTransfer(#[source] SourceError),

    #[error("Failed to upload snapshot: {0}")]
    Relocation(#[source] StoreError),
}
