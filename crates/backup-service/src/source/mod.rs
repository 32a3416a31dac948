//! Sources that snapshots are taken from.
//!

use std::{io, path::Path};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

mod qdrant;

pub use qdrant::Qdrant;

/// A vector database that can snapshot its collections.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// The base URL of the source, for reporting.
    fn url(&self) -> &str;

    /// Check the source is reachable and answering.
    async fn check_connection(&self) -> Result<(), SourceError>;

    /// List the names of every collection.
    async fn list_collections(&self) -> Result<Vec<String>, SourceError>;

    /// Create a snapshot of a collection, returning the snapshot's name.
    async fn create_snapshot(&self, collection: &str) -> Result<String, SourceError>;

    /// Stream a snapshot into a new file at `destination`, returning the bytes written.
    async fn download_snapshot(
        &self,
        collection: &str,
        snapshot: &str,
        destination: &Path,
    ) -> Result<u64, SourceError>;

    /// Delete a snapshot from the source.
    async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<(), SourceError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request timed out after {0}s")]
    TimedOut(u64),

    #[error("Received status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response did not contain a snapshot name: {0}")]
    MissingSnapshotName(String),

    #[error("Failed to {1}: {0}")]
    Io(#[source] io::Error, &'static str),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}
