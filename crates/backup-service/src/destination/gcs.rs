use std::path::Path;

use async_trait::async_trait;
use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::{
        Error as GcsError,
        objects::upload::{Media, UploadObjectRequest, UploadType},
    },
};
use reqwest::Body;
use tokio::fs::File;

use super::{Destination, StoreError};

/// A Google Cloud Storage bucket.
pub struct GcsBucket {
    client: Client,
    bucket: String,
}

impl GcsBucket {
    /// Creates a client for `bucket` using the ambient Google credentials.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if no credentials could be found.
    pub async fn new(bucket: &str) -> Result<Self, StoreError> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| GcsError::TokenSource(Box::new(e)))?;

        Ok(Self::with_client(Client::new(config), bucket))
    }

    /// Use an existing client for `bucket`.
    pub fn with_client(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl Destination for GcsBucket {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn describe(&self, key: &str) -> String {
        format!("gs://{}/{key}", self.bucket)
    }

    async fn upload(&self, source: &Path, key: &str) -> Result<(), StoreError> {
        let file = File::open(source)
            .await
            .map_err(|e| StoreError::Io(e, "open staging file"))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| StoreError::Io(e, "read staging file metadata"))?
            .len();

        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };
        let mut media = Media::new(key.to_string());
        media.content_length = Some(length);

        // The file is streamed as the request body.
        self.client
            .upload_object(&request, Body::from(file), &UploadType::Simple(media))
            .await?;

        Ok(())
    }
}
