//! Outcomes of backups, returned as the HTTP response bodies.
//!

use core::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of backing up one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionBackupResult {
    /// The collection.
    pub collection: String,

    /// If every step completed.
    pub success: bool,

    /// The snapshot name, if one was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,

    /// The object key at the destination, only set on success.
    #[serde(rename = "gcs_path", default, skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<String>,

    /// Why the backup failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Cleanup steps that failed, these do not affect `success`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup_warnings: Vec<String>,
}

impl CollectionBackupResult {
    /// A result that has not completed any steps.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            success: false,
            snapshot_name: None,
            destination_path: None,
            error: None,
            cleanup_warnings: Vec::new(),
        }
    }
}

/// The outcome of backing up every collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchBackupResult {
    /// If at least one collection was backed up.
    pub success: bool,

    /// Summary of the batch.
    pub message: String,

    /// Why the batch could not run, only set when the collections could not be listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Number of collections found.
    pub total_collections: usize,

    /// Number of collections backed up.
    pub success_count: usize,

    /// Number of collections that failed.
    pub failed_count: usize,

    /// Per collection results in the order the collections were listed.
    pub collections: Vec<CollectionBackupResult>,

    /// When the batch started.
    pub start_time: DateTime<Utc>,

    /// When the batch finished.
    pub end_time: DateTime<Utc>,

    /// How long the batch took.
    pub duration_seconds: f64,
}

impl BatchBackupResult {
    /// Summarise the results of a batch.
    pub fn from_results(
        results: Vec<CollectionBackupResult>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let total_collections = results.len();
        let success_count = results.iter().filter(|result| result.success).count();

        Self {
            success: success_count > 0,
            message: format!("Backup finished: {success_count}/{total_collections} succeeded"),
            error: None,
            total_collections,
            success_count,
            failed_count: total_collections - success_count,
            collections: results,
            start_time,
            end_time,
            duration_seconds: duration.as_secs_f64(),
        }
    }

    /// A batch where no collections were found.
    pub fn empty(start_time: DateTime<Utc>, end_time: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            message: "No collections found".to_string(),
            ..Self::without_results(start_time, end_time, duration)
        }
    }

    /// A batch that could not list the collections.
    pub fn failed(
        error: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            message: format!("Backup failed: {error}"),
            error: Some(error),
            ..Self::without_results(start_time, end_time, duration)
        }
    }

    fn without_results(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            success: false,
            message: String::new(),
            error: None,
            total_collections: 0,
            success_count: 0,
            failed_count: 0,
            collections: Vec::new(),
            start_time,
            end_time,
            duration_seconds: duration.as_secs_f64(),
        }
    }
}
