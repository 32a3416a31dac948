//! Forwards triggers to the backup service.
//!

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::RelayConfig;

mod health;
mod trigger;

pub use health::BackupApiStatus;

/// The user agent sent with every request to the backup service.
pub const USER_AGENT: &str = concat!("qdrant-backup-trigger/", env!("CARGO_PKG_VERSION"));

/// Relays triggers to the backup service.
pub struct Relay {
    client: Client,

    /// The relay's config.
    pub config: RelayConfig,
}

impl Relay {
    /// Create a relay with its own HTTP client.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, config })
    }

    fn transport_error(&self, error: reqwest::Error, api_url: &str) -> RelayError {
        if error.is_timeout() {
            RelayError::Timeout(self.config.timeout_seconds)
        } else if error.is_builder() {
            RelayError::Configuration(format!("Invalid VM_BACKUP_API_URL '{api_url}': {error}"))
        } else {
            RelayError::Connectivity {
                api_url: api_url.to_string(),
                source: error,
            }
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Configuration(String),

    #[error("Could not connect to the backup API: {source}")]
    Connectivity {
        api_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backup API call timed out after {0}s")]
    Timeout(u64),

    #[error("Backup API call failed with status {status}")]
    Upstream { status: StatusCode, response: Value },

    #[error("Backup API returned a response that is not JSON: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl RelayError {
    /// The status the relay responds with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Upstream { .. } | Self::InvalidResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Connectivity { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}
