use core::time::Duration;
use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use crate::{QdrantConfig, Timeouts};

use super::{SnapshotSource, SourceError};

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Qdrant's REST API.
pub struct Qdrant {
    client: Client,
    base_url: Url,
    url: String,
    api_key: Option<String>,
    timeouts: Timeouts,
}

#[derive(Deserialize)]
struct QdrantResponse<T> {
    result: Option<T>,
}

#[derive(Deserialize)]
struct CollectionsResult {
    #[serde(default)]
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Deserialize)]
struct SnapshotDescription {
    name: Option<String>,
}

impl Qdrant {
    /// Create a client for the configured Qdrant instance.
    pub fn new(config: &QdrantConfig, timeouts: Timeouts) -> Result<Self, SourceError> {
        let url = config.url();
        let base_url = Url::parse(&url).map_err(|_| SourceError::InvalidUrl(url.clone()))?;
        let client = Client::builder().build().map_err(SourceError::Request)?;

        Ok(Self {
            client,
            base_url,
            url,
            api_key: config.api_key.clone(),
            timeouts,
        })
    }

    /// Build the URL for a path below the base URL, percent encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidUrl(self.url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn request(&self, method: Method, url: Url, timeout: Duration) -> RequestBuilder {
        let builder = self.client.request(method, url).timeout(timeout);

        match &self.api_key {
            Some(api_key) => builder.header("api-key", api_key),
            None => builder,
        }
    }

    /// Send a request, turning transport failures and non-success statuses into errors.
    async fn send(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, SourceError> {
        let response = builder
            .send()
            .await
            .map_err(|error| request_error(error, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status,
                body: truncate(body),
            });
        }

        Ok(response)
    }

    async fn get_collections(&self, timeout: Duration) -> Result<Vec<String>, SourceError> {
        let url = self.endpoint(&["collections"])?;
        let response = self
            .send(self.request(Method::GET, url, timeout), timeout)
            .await?;

        let body = response
            .bytes()
            .await
            .map_err(|error| request_error(error, timeout))?;
        let response: QdrantResponse<CollectionsResult> = serde_json::from_slice(&body)?;

        Ok(response
            .result
            .map(|result| result.collections)
            .unwrap_or_default()
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }
}

#[async_trait]
impl SnapshotSource for Qdrant {
    fn url(&self) -> &str {
        &self.url
    }

    async fn check_connection(&self) -> Result<(), SourceError> {
        self.get_collections(self.timeouts.status()).await?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, SourceError> {
        let collections = self.get_collections(self.timeouts.request()).await?;
        debug!("Found {} collections: {collections:?}", collections.len());
        Ok(collections)
    }

    async fn create_snapshot(&self, collection: &str) -> Result<String, SourceError> {
        let timeout = self.timeouts.create_snapshot();
        let url = self.endpoint(&["collections", collection, "snapshots"])?;
        let response = self
            .send(self.request(Method::POST, url, timeout), timeout)
            .await?;

        let body = response
            .text()
            .await
            .map_err(|error| request_error(error, timeout))?;

        serde_json::from_str::<QdrantResponse<SnapshotDescription>>(&body)
            .ok()
            .and_then(|response| response.result)
            .and_then(|snapshot| snapshot.name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SourceError::MissingSnapshotName(truncate(body)))
    }

    async fn download_snapshot(
        &self,
        collection: &str,
        snapshot: &str,
        destination: &Path,
    ) -> Result<u64, SourceError> {
        let timeout = self.timeouts.download_snapshot();
        let url = self.endpoint(&["collections", collection, "snapshots", snapshot])?;
        let mut response = self
            .send(self.request(Method::GET, url, timeout), timeout)
            .await?;

        let mut file = File::create(destination)
            .await
            .map_err(|error| SourceError::Io(error, "create staging file"))?;

        // Stream the body in chunks and append the chunks to the staging file.
        let mut total_bytes: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|error| request_error(error, timeout))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|error| SourceError::Io(error, "write staging file"))?;

            total_bytes = total_bytes.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
        }

        file.flush()
            .await
            .map_err(|error| SourceError::Io(error, "flush staging file"))?;

        Ok(total_bytes)
    }

    async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<(), SourceError> {
        let timeout = self.timeouts.request();
        let url = self.endpoint(&["collections", collection, "snapshots", snapshot])?;
        self.send(self.request(Method::DELETE, url, timeout), timeout)
            .await?;

        Ok(())
    }
}

fn request_error(error: reqwest::Error, timeout: Duration) -> SourceError {
    if error.is_timeout() {
        SourceError::TimedOut(timeout.as_secs())
    } else {
        SourceError::Request(error)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }

    body
}
