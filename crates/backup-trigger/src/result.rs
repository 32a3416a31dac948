//! The relay's response body.
//!

use core::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RelayError;

/// The outcome of relaying a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResult {
    /// If the backup service answered with 200.
    pub success: bool,

    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The backup service's response body, unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_result: Option<Value>,

    /// The configured backup service URL, set when it could not be reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// The configured timeout, set when it elapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// The backup service's status, set when it was not 200.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// The backup service's error body, or `{"raw_response": ...}` when it was not JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_response: Option<Value>,

    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_duration_seconds: Option<f64>,

    /// When the relay started.
    pub timestamp: DateTime<Utc>,
}

impl RelayResult {
    /// A trigger the backup service accepted.
    pub fn triggered(backup_result: Value, duration: Duration, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: Some("Backup triggered".to_string()),
            backup_result: Some(backup_result),
            relay_duration_seconds: Some(duration.as_secs_f64()),
            ..Self::empty(timestamp)
        }
    }

    /// A trigger that failed, carrying the diagnostics for the failure.
    pub fn failed(error: &RelayError, timestamp: DateTime<Utc>) -> Self {
        let mut result = Self {
            error: Some(error.to_string()),
            ..Self::empty(timestamp)
        };

        match error {
            RelayError::Configuration(_) | RelayError::InvalidResponse(_) => {}
            RelayError::Connectivity { api_url, .. } => result.api_url = Some(api_url.clone()),
            RelayError::Timeout(seconds) => result.timeout_seconds = Some(*seconds),
            RelayError::Upstream { status, response } => {
                result.status_code = Some(status.as_u16());
                result.api_response = Some(response.clone());
            }
        }

        result
    }

    fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message: None,
            error: None,
            backup_result: None,
            api_url: None,
            timeout_seconds: None,
            status_code: None,
            api_response: None,
            relay_duration_seconds: None,
            timestamp,
        }
    }
}
