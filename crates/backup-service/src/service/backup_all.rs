use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{BatchBackupResult, source::SourceError};

use super::BackupService;

impl BackupService {
    /// List the collections at the source.
    pub async fn list_collections(&self) -> Result<Vec<String>, EnumerationError> {
        let collections = self.source.list_collections().await?;
        info!("Found {} collections: {collections:?}", collections.len());
        Ok(collections)
    }

    /// Back up every collection, one at a time in the order they were listed.
    pub async fn backup_all(&self) -> BatchBackupResult {
        let start_time = self.now();
        let start = Instant::now();

        let collections = match self.list_collections().await {
            Ok(collections) => collections,
            Err(error) => {
                error!("Could not list collections: {error}");
                return BatchBackupResult::failed(
                    error.to_string(),
                    start_time,
                    self.now(),
                    start.elapsed(),
                );
            }
        };

        if collections.is_empty() {
            warn!("No collections to back up");
            return BatchBackupResult::empty(start_time, self.now(), start.elapsed());
        }

        let mut results = Vec::with_capacity(collections.len());
        for collection in &collections {
            results.push(self.backup_collection(collection).await);
        }

        let result =
            BatchBackupResult::from_results(results, start_time, self.now(), start.elapsed());
        info!("{} in {:.2}s", result.message, result.duration_seconds);

        result
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
#[error("Failed to list collections: {0}")]
pub struct EnumerationError(#[from] pub SourceError);
