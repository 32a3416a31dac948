//! Backup service config
//!

use core::{net::SocketAddr, time::Duration};
use std::path::PathBuf;

use shared::{
    ConfigError, Lookup, ProcessEnvironment,
    env::{optional, parse_or, required, string_or},
};

/// How long each call may take, in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Creating a snapshot, large collections can take minutes.
    pub create_snapshot_seconds: u64,

    /// Downloading a snapshot into the staging directory.
    pub download_snapshot_seconds: u64,

    /// Uploading a staged snapshot to the destination.
    pub upload_seconds: u64,

    /// Listing collections and deleting snapshots.
    pub request_seconds: u64,

    /// Probing Qdrant for the status endpoint.
    pub status_seconds: u64,
}

impl Timeouts {
    /// Timeout for creating a snapshot.
    pub fn create_snapshot(&self) -> Duration {
        Duration::from_secs(self.create_snapshot_seconds)
    }

    /// Timeout for downloading a snapshot.
    pub fn download_snapshot(&self) -> Duration {
        Duration::from_secs(self.download_snapshot_seconds)
    }

    /// Timeout for uploading a snapshot.
    pub fn upload(&self) -> Duration {
        Duration::from_secs(self.upload_seconds)
    }

    /// Timeout for short requests.
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_seconds)
    }

    /// Timeout for the status probe.
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_seconds)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create_snapshot_seconds: 60 * 5,
            download_snapshot_seconds: 60 * 10,
            upload_seconds: 60 * 10,
            request_seconds: 30,
            status_seconds: 10,
        }
    }
}

/// Connection details for the Qdrant instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QdrantConfig {
    /// Host name or address.
    pub host: String,

    /// HTTP port.
    pub port: u16,

    /// Sent as the `api-key` header when present.
    pub api_key: Option<String>,
}

impl QdrantConfig {
    /// The base URL of the Qdrant REST API.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6333,
            api_key: None,
        }
    }
}

/// Where snapshots are relocated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    /// The bucket name.
    pub bucket_name: String,

    /// Prefix for every object key.
    pub folder_prefix: String,

    /// When set, snapshots are written under this directory instead of Google Cloud Storage.
    pub local_directory: Option<PathBuf>,
}

/// The backup service's config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The address to serve the HTTP API on.
    pub listen_address: SocketAddr,

    /// Directory snapshots are downloaded into before upload.
    pub staging_directory: PathBuf,

    /// The Qdrant instance to back up.
    pub qdrant: QdrantConfig,

    /// The backup destination.
    pub destination: DestinationConfig,

    /// Per call timeouts.
    pub timeouts: Timeouts,
}

impl Config {
    /// Tries to load the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&ProcessEnvironment)
    }

    /// Tries to load the config from a lookup.
    ///
    /// `GCS_BUCKET_NAME` is required, everything else has a default.
    pub fn load(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        let defaults = Timeouts::default();
        let timeouts = Timeouts {
            create_snapshot_seconds: parse_or(
                lookup,
                "SNAPSHOT_CREATE_TIMEOUT",
                defaults.create_snapshot_seconds,
            )?,
            download_snapshot_seconds: parse_or(
                lookup,
                "SNAPSHOT_DOWNLOAD_TIMEOUT",
                defaults.download_snapshot_seconds,
            )?,
            upload_seconds: parse_or(lookup, "SNAPSHOT_UPLOAD_TIMEOUT", defaults.upload_seconds)?,
            request_seconds: parse_or(lookup, "QDRANT_REQUEST_TIMEOUT", defaults.request_seconds)?,
            status_seconds: defaults.status_seconds,
        };

        let qdrant_defaults = QdrantConfig::default();
        let qdrant = QdrantConfig {
            host: string_or(lookup, "QDRANT_HOST", &qdrant_defaults.host),
            port: parse_or(lookup, "QDRANT_PORT", qdrant_defaults.port)?,
            api_key: optional(lookup, "QDRANT_API_KEY"),
        };

        let destination = DestinationConfig {
            bucket_name: required(lookup, "GCS_BUCKET_NAME")?,
            folder_prefix: string_or(lookup, "GCS_FOLDER_PREFIX", "qdrant"),
            local_directory: optional(lookup, "BACKUP_DESTINATION_DIRECTORY").map(PathBuf::from),
        };

        Ok(Self {
            listen_address: parse_or(
                lookup,
                "LISTEN_ADDRESS",
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
            staging_directory: PathBuf::from(string_or(
                lookup,
                "BACKUP_LOCAL_PATH",
                "/tmp/qdrant_snapshots",
            )),
            qdrant,
            destination,
            timeouts,
        })
    }
}
