//! # common
//!

#![allow(dead_code)]

use core::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use backup_service::{
    BackupService, PipelineSettings,
    destination::{Destination, LocalDirectory, StoreError},
    source::{SnapshotSource, SourceError},
};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use tempfile::TempDir;

/// A call made to the mock source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Download(String, String),
    Delete(String, String),
}

/// A snapshot source that records calls and fails on request.
#[derive(Default)]
pub struct MockSource {
    pub collections: Vec<String>,
    pub fail_list: bool,
    pub fail_create: Vec<String>,
    pub fail_download: Vec<String>,
    pub refuse_download: Vec<String>,
    pub fail_delete: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl MockSource {
    pub fn with_collections(collections: &[&str]) -> Self {
        Self {
            collections: collections.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Delete(..)))
            .collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls
            .iter()
            .filter(|call| matches!(call, Call::Create(_)))
            .count()
    }
}

fn source_error(body: &str) -> SourceError {
    SourceError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: body.to_string(),
    }
}

#[async_trait]
impl SnapshotSource for MockSource {
    fn url(&self) -> &str {
        "http://mock:6333"
    }

    async fn check_connection(&self) -> Result<(), SourceError> {
        if self.fail_list {
            return Err(source_error("unavailable"));
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, SourceError> {
        if self.fail_list {
            return Err(source_error("unavailable"));
        }
        Ok(self.collections.clone())
    }

    async fn create_snapshot(&self, collection: &str) -> Result<String, SourceError> {
        let created = self.record(Call::Create(collection.to_string()));
        if self.fail_create.iter().any(|name| name == collection) {
            return Err(source_error("create failed"));
        }
        Ok(format!("snap{created}"))
    }

    async fn download_snapshot(
        &self,
        collection: &str,
        snapshot: &str,
        destination: &Path,
    ) -> Result<u64, SourceError> {
        self.record(Call::Download(
            collection.to_string(),
            snapshot.to_string(),
        ));

        if self.refuse_download.iter().any(|name| name == collection) {
            // Fail before the staging file is created.
            return Err(source_error("download refused"));
        }

        if self.fail_download.iter().any(|name| name == collection) {
            // Leave a partial file behind like an interrupted transfer would.
            fs::write(destination, b"partial").unwrap();
            return Err(source_error("download failed"));
        }

        fs::write(destination, format!("{collection}/{snapshot}")).unwrap();
        Ok(u64::try_from(collection.len() + snapshot.len() + 1).unwrap())
    }

    async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<(), SourceError> {
        self.record(Call::Delete(collection.to_string(), snapshot.to_string()));
        if self.fail_delete {
            return Err(source_error("delete failed"));
        }
        Ok(())
    }
}

/// A local directory destination that can fail, stall or pin the staging file.
pub struct TestDestination {
    pub inner: LocalDirectory,
    /// Uploads of keys containing any of these fail.
    pub fail_keys: Vec<String>,
    /// How long each upload stalls before writing.
    pub delay: Option<Duration>,
    /// Replace the staging file with a non-empty directory after uploading, so it cannot be
    /// removed as a file.
    pub pin_staging: bool,
}

#[async_trait]
impl Destination for TestDestination {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn describe(&self, key: &str) -> String {
        self.inner.describe(key)
    }

    async fn upload(&self, source: &Path, key: &str) -> Result<(), StoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_keys.iter().any(|fail| key.contains(fail.as_str())) {
            return Err(StoreError::NotDirectory(PathBuf::from(key)));
        }
        self.inner.upload(source, key).await?;

        if self.pin_staging {
            fs::remove_file(source).unwrap();
            fs::create_dir(source).unwrap();
            fs::write(source.join("pinned"), b"pinned").unwrap();
        }

        Ok(())
    }
}

pub const BUCKET: &str = "backups-bucket";

pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub struct Harness {
    pub service: BackupService,
    pub source: Arc<MockSource>,
    pub staging: TempDir,
    pub destination: TempDir,
}

/// How the harness destination and pipeline behave.
pub struct Options {
    pub fail_keys: Vec<String>,
    pub upload_delay: Option<Duration>,
    pub upload_timeout: Duration,
    pub pin_staging: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fail_keys: Vec::new(),
            upload_delay: None,
            upload_timeout: Duration::from_secs(5),
            pin_staging: false,
        }
    }
}

impl Harness {
    pub fn new(source: MockSource, fail_keys: &[&str]) -> Self {
        Self::with_options(
            source,
            Options {
                fail_keys: fail_keys.iter().map(ToString::to_string).collect(),
                ..Options::default()
            },
        )
    }

    pub fn with_options(source: MockSource, options: Options) -> Self {
        let staging = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        let source = Arc::new(source);

        let service = BackupService::new(
            Arc::clone(&source) as Arc<dyn SnapshotSource>,
            Arc::new(TestDestination {
                inner: LocalDirectory::new(destination.path(), BUCKET),
                fail_keys: options.fail_keys,
                delay: options.upload_delay,
                pin_staging: options.pin_staging,
            }),
            PipelineSettings {
                staging_directory: staging.path().to_path_buf(),
                folder_prefix: "qdrant".to_string(),
                upload_timeout: options.upload_timeout,
            },
        )
        .with_clock(fixed_clock);

        Self {
            service,
            source,
            staging,
            destination,
        }
    }

    /// Files left in the staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.staging.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// Where the local destination wrote `key`.
    pub fn object_path(&self, key: &str) -> PathBuf {
        LocalDirectory::new(self.destination.path(), BUCKET).object_path(key)
    }
}
