//! Durable destinations that staged snapshots are relocated to.
//!

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use google_cloud_storage::http::Error as GcsError;
use thiserror::Error;

mod gcs;
mod local_directory;

pub use gcs::GcsBucket;
pub use local_directory::LocalDirectory;

/// An object store that snapshots are uploaded to.
#[async_trait]
pub trait Destination: Send + Sync {
    /// The bucket name, for reporting.
    fn bucket(&self) -> &str;

    /// A human readable location of `key`, for logs.
    fn describe(&self, key: &str) -> String;

    /// Upload the file at `source` to `key`.
    async fn upload(&self, source: &Path, key: &str) -> Result<(), StoreError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Google Cloud Storage request failed: {0}")]
    Gcs(#[from] GcsError),

    #[error("Failed to {1}: {0}")]
    Io(#[source] io::Error, &'static str),

    #[error("{0:?} is not a directory")]
    NotDirectory(PathBuf),

    #[error("Upload timed out after {0}s")]
    TimedOut(u64),
}
