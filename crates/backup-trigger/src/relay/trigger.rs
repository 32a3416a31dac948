use std::time::Instant;

use chrono::Utc;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::RelayResult;

use super::{Relay, RelayError};

#[derive(Serialize)]
struct BackupRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<&'a str>,
}

impl Relay {
    /// Trigger a backup of `collection`, or of every collection, and wait for the outcome.
    pub async fn relay(&self, collection: Option<&str>) -> (StatusCode, RelayResult) {
        let timestamp = Utc::now();
        let start = Instant::now();

        match collection {
            Some(collection) => info!("Triggering backup of collection '{collection}'"),
            None => info!("Triggering backup of all collections"),
        }

        match self.trigger(collection).await {
            Ok(backup_result) => {
                let duration = start.elapsed();
                info!(
                    "Backup triggered in {:.2}s: {}/{} succeeded",
                    duration.as_secs_f64(),
                    count(&backup_result, "success_count"),
                    count(&backup_result, "total_collections"),
                );

                (
                    StatusCode::OK,
                    RelayResult::triggered(backup_result, duration, timestamp),
                )
            }

            Err(relay_error) => {
                error!("{relay_error}");
                (
                    relay_error.status_code(),
                    RelayResult::failed(&relay_error, timestamp),
                )
            }
        }
    }

    async fn trigger(&self, collection: Option<&str>) -> Result<Value, RelayError> {
        let (Some(api_url), Some(url)) = (
            self.config.backup_api_url.as_deref(),
            self.config.endpoint("backup"),
        ) else {
            return Err(RelayError::Configuration(
                "Missing required environment variable VM_BACKUP_API_URL".to_string(),
            ));
        };
        info!("Calling backup API: {url}");

        let mut request = self
            .client
            .post(&url)
            .json(&BackupRequest { collection })
            .timeout(self.config.timeout());
        if let Some(token) = &self.config.authorization_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| self.transport_error(error, api_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| self.transport_error(error, api_url))?;

        if status != StatusCode::OK {
            error!("Backup API responded with {status}: {body}");
            let response: Value = match serde_json::from_str(&body) {
                Ok(response) => response,
                Err(_) => json!({ "raw_response": body }),
            };

            return Err(RelayError::Upstream { status, response });
        }

        serde_json::from_str(&body).map_err(RelayError::InvalidResponse)
    }
}

/// A count from a batch result, zero for single collection results.
fn count(backup_result: &Value, key: &str) -> u64 {
    backup_result.get(key).and_then(Value::as_u64).unwrap_or(0)
}
