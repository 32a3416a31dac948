//! The backup service's HTTP API.
//!

use std::{io, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{Instrument, Level, error, info, warn};

use crate::{BackupService, BatchBackupResult, CollectionBackupResult};

/// The service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "qdrant-backup-api";

/// Body of a backup request, an absent or empty collection backs up everything.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackupRequest {
    /// The single collection to back up.
    #[serde(default)]
    pub collection: Option<String>,
}

impl BackupRequest {
    /// Parse a request body, an empty body is an empty request.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let request: Option<Self> = serde_json::from_slice(body)?;
        Ok(request.unwrap_or_default())
    }

    /// The targeted collection, if any. Blank names target every collection.
    pub fn target(&self) -> Option<&str> {
        self.collection
            .as_deref()
            .filter(|collection| !collection.trim().is_empty())
    }
}

/// Response of a backup request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BackupResponse {
    /// A single collection was backed up.
    Collection(CollectionBackupResult),
    /// Every collection was backed up.
    Batch(BatchBackupResult),
}

impl BackupResponse {
    /// If the backup is reported as a success.
    pub fn success(&self) -> bool {
        match self {
            Self::Collection(result) => result.success,
            Self::Batch(result) => result.success,
        }
    }
}

impl IntoResponse for BackupResponse {
    fn into_response(self) -> Response {
        let status = if self.success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(tag = "qdrant_status", rename_all = "snake_case")]
enum StatusResponse {
    Connected {
        qdrant_url: String,
        gcs_bucket: String,
        timestamp: DateTime<Utc>,
    },
    Disconnected {
        error: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
enum CollectionsResponse {
    Listed {
        success: bool,
        collections: Vec<String>,
        count: usize,
    },
    Failed {
        success: bool,
        error: String,
    },
}

#[derive(Serialize)]
struct RequestErrorResponse {
    success: bool,
    error: String,
    timestamp: DateTime<Utc>,
}

impl RequestErrorResponse {
    fn new(error: String) -> Self {
        Self {
            success: false,
            error,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for RequestErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Build the router for the backup service.
pub fn router(service: Arc<BackupService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/collections", get(collections))
        .route("/backup", post(backup))
        .with_state(service)
}

/// Serve the API until the process receives Ctrl-C.
pub async fn serve(listener: TcpListener, service: Arc<BackupService>) -> io::Result<()> {
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                error!("Could not listen for shutdown signal: {error}");
            }
            info!("Shutting down");
        })
        .await
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: Utc::now(),
    })
}

async fn status(State(service): State<Arc<BackupService>>) -> Response {
    match service.check_source().await {
        Ok(()) => Json(StatusResponse::Connected {
            qdrant_url: service.source.url().to_string(),
            gcs_bucket: service.destination.bucket().to_string(),
            timestamp: Utc::now(),
        })
        .into_response(),

        Err(error) => {
            warn!("Qdrant is unreachable: {error}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse::Disconnected {
                    error: error.to_string(),
                    timestamp: Utc::now(),
                }),
            )
                .into_response()
        }
    }
}

async fn collections(State(service): State<Arc<BackupService>>) -> Response {
    match service.list_collections().await {
        Ok(collections) => Json(CollectionsResponse::Listed {
            success: true,
            count: collections.len(),
            collections,
        })
        .into_response(),

        Err(error) => {
            error!("{error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CollectionsResponse::Failed {
                    success: false,
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(level = Level::ERROR, skip_all)]
async fn backup(State(service): State<Arc<BackupService>>, body: Bytes) -> Response {
    let request = match BackupRequest::from_body(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!("Invalid backup request: {error}");
            return RequestErrorResponse::new(format!("Invalid request body: {error}"))
                .into_response();
        }
    };

    let target = request.target().map(ToString::to_string);

    // Detached from the connection, a client disconnecting must not stop a backup before cleanup.
    let backup = tokio::spawn(
        async move {
            match target {
                Some(collection) => {
                    info!("Backing up collection '{collection}'");
                    BackupResponse::Collection(service.backup_collection(&collection).await)
                }
                None => {
                    info!("Backing up all collections");
                    BackupResponse::Batch(service.backup_all().await)
                }
            }
        }
        .in_current_span(),
    );

    match backup.await {
        Ok(response) => response.into_response(),
        Err(error) => {
            error!("Backup task failed: {error}");
            RequestErrorResponse::new(format!("Backup task failed: {error}")).into_response()
        }
    }
}
