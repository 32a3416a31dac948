//! The relay's HTTP API.
//!

use std::{io, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{Level, error, info};

use crate::{BackupApiStatus, Relay};

/// The service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "qdrant-backup-trigger";

/// Body of a trigger request.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerRequest {
    /// The single collection to back up.
    #[serde(default)]
    pub collection: Option<String>,
}

impl TriggerRequest {
    /// Parse a request body, anything that is not a JSON object targets every collection.
    pub fn lenient(body: &[u8]) -> Self {
        serde_json::from_slice::<Option<Self>>(body)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// The targeted collection, if any.
    pub fn target(&self) -> Option<&str> {
        self.collection
            .as_deref()
            .filter(|collection| !collection.trim().is_empty())
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    config: ConfigStatus,
    backup_api_status: BackupApiStatus,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ConfigStatus {
    vm_backup_api_url: bool,
    authorization_configured: bool,
    timeout_seconds: u64,
}

/// Build the router for the relay.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/trigger-backup", post(trigger_backup))
        .route("/health", get(health))
        .with_state(relay)
}

/// Serve the API until the process receives Ctrl-C.
pub async fn serve(listener: TcpListener, relay: Arc<Relay>) -> io::Result<()> {
    axum::serve(listener, router(relay))
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                error!("Could not listen for shutdown signal: {error}");
            }
            info!("Shutting down");
        })
        .await
}

#[tracing::instrument(level = Level::ERROR, skip_all)]
async fn trigger_backup(State(relay): State<Arc<Relay>>, body: Bytes) -> Response {
    let request = TriggerRequest::lenient(&body);
    let (status, result) = relay.relay(request.target()).await;

    (status, Json(result)).into_response()
}

async fn health(State(relay): State<Arc<Relay>>) -> impl IntoResponse {
    let backup_api_status = relay.probe().await;

    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        config: ConfigStatus {
            vm_backup_api_url: relay.config.backup_api_url.is_some(),
            authorization_configured: relay.config.authorization_token.is_some(),
            timeout_seconds: relay.config.timeout_seconds,
        },
        backup_api_status,
        timestamp: Utc::now(),
    })
}
