//! # common
//!

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    routing::post,
};
use backup_trigger::{Relay, RelayConfig};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Serve `app` on a loopback port, returning its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    format!("http://{address}")
}

/// A URL nothing is listening on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{address}")
}

pub fn relay(backup_api_url: Option<String>, timeout_seconds: u64, token: Option<&str>) -> Relay {
    Relay::new(RelayConfig {
        backup_api_url,
        timeout_seconds,
        authorization_token: token.map(ToString::to_string),
        listen_address: ([127, 0, 0, 1], 0).into(),
    })
    .unwrap()
}

/// A request received by a fake backup service.
#[derive(Debug, Clone)]
pub struct Received {
    pub body: Value,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

/// A fake backup service that records requests and answers `/backup` with `status` and `body`.
pub fn backup_service(
    status: StatusCode,
    body: impl Into<String>,
) -> (Router, Arc<Mutex<Vec<Received>>>) {
    let body: String = body.into();
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&received);

    let app = Router::new().route(
        "/backup",
        post(move |headers: HeaderMap, request: Bytes| {
            let recorder = Arc::clone(&recorder);
            let body = body.clone();
            async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .map(|value| value.to_str().unwrap().to_string())
                };

                recorder.lock().unwrap().push(Received {
                    body: serde_json::from_slice(&request).unwrap(),
                    authorization: header("authorization"),
                    user_agent: header("user-agent"),
                });

                (status, body)
            }
        }),
    );

    (app, received)
}

/// A batch result as the backup service returns it.
pub fn batch_body() -> Value {
    json!({
        "success": true,
        "message": "Backup finished: 1/2 succeeded",
        "total_collections": 2,
        "success_count": 1,
        "failed_count": 1,
        "collections": [
            { "collection": "docs", "success": true, "snapshot_name": "snap1" },
            { "collection": "images", "success": false, "error": "Failed to upload snapshot" }
        ],
        "start_time": "2024-01-01T00:00:00Z",
        "end_time": "2024-01-01T00:00:05Z",
        "duration_seconds": 5.0
    })
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&body).unwrap())
}
