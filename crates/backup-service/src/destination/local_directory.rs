use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use super::{Destination, StoreError};

/// A directory on the local filesystem standing in for a bucket.
///
/// Objects are written to `{root}/{bucket}/{key}`.
pub struct LocalDirectory {
    root: PathBuf,
    bucket: String,
}

impl LocalDirectory {
    /// Create a destination rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.to_string(),
        }
    }

    /// The path an object key is written to.
    pub fn object_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .fold(self.root.join(&self.bucket), |path, segment| {
                path.join(segment)
            })
    }
}

#[async_trait]
impl Destination for LocalDirectory {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn describe(&self, key: &str) -> String {
        self.object_path(key).display().to_string()
    }

    async fn upload(&self, source: &Path, key: &str) -> Result<(), StoreError> {
        let object_path = self.object_path(key);

        if let Some(directory) = object_path.parent() {
            // Check if the directory exists
            let directory_metadata = match fs::metadata(directory).await {
                Ok(metadata) => Some(metadata),
                Err(error) if error.kind() == ErrorKind::NotFound => None,
                Err(error) => return Err(StoreError::Io(error, "check object directory")),
            };

            match directory_metadata {
                // If the directory exists, ensure it is a directory
                Some(metadata) => {
                    if !metadata.is_dir() {
                        return Err(StoreError::NotDirectory(directory.to_path_buf()));
                    }
                }

                // If it does not exist, create it.
                None => fs::create_dir_all(directory)
                    .await
                    .map_err(|e| StoreError::Io(e, "create object directory"))?,
            }
        }

        fs::copy(source, &object_path)
            .await
            .map_err(|e| StoreError::Io(e, "copy staging file"))?;

        Ok(())
    }
}
