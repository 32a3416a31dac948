use core::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tracing::warn;

use super::Relay;

/// How long the health probe waits for the backup service.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The backup service's health as seen from the relay.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupApiStatus {
    /// No backup service is configured.
    Unknown,
    Healthy,
    Unhealthy,
    Unreachable,
}

impl Relay {
    /// Probe the backup service's health endpoint.
    pub async fn probe(&self) -> BackupApiStatus {
        let Some(url) = self.config.endpoint("health") else {
            return BackupApiStatus::Unknown;
        };

        match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) if response.status() == StatusCode::OK => BackupApiStatus::Healthy,
            Ok(response) => {
                warn!("Backup API health check returned {}", response.status());
                BackupApiStatus::Unhealthy
            }
            Err(error) => {
                warn!("Backup API is unreachable: {error}");
                BackupApiStatus::Unreachable
            }
        }
    }
}
