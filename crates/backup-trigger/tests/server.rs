//! Tests for the relay's HTTP API
//!

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get,
};
use backup_trigger::server::{TriggerRequest, router};
use common::{backup_service, refused_url, relay, send, spawn};
use serde_json::json;
use shared::test::init_test_logger;

mod common;

fn trigger(body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/trigger-backup")
        .body(Body::from(body))
        .unwrap()
}

fn health() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[test]
fn trigger_body_is_lenient() {
    assert_eq!(TriggerRequest::lenient(b"").target(), None);
    assert_eq!(TriggerRequest::lenient(b"not json").target(), None);
    assert_eq!(TriggerRequest::lenient(b"null").target(), None);
    assert_eq!(TriggerRequest::lenient(b"[1, 2]").target(), None);
    assert_eq!(TriggerRequest::lenient(br#"{"collection":""}"#).target(), None);
    assert_eq!(
        TriggerRequest::lenient(br#"{"collection":"docs","extra":1}"#).target(),
        Some("docs")
    );
}

#[tokio::test]
async fn trigger_with_invalid_body_backs_up_everything() {
    let _logger = init_test_logger();
    let (app, received) = backup_service(StatusCode::OK, r#"{"success":true}"#);
    let url = spawn(app).await;
    let app = router(Arc::new(relay(Some(url), 30, None)));

    let (status, body) = send(app, trigger("{oops")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Backup triggered");
    assert_eq!(body["backup_result"], json!({ "success": true }));
    assert!(body["timestamp"].is_string());
    assert_eq!(received.lock().unwrap()[0].body, json!({}));
}

#[tokio::test]
async fn trigger_one_collection() {
    let _logger = init_test_logger();
    let (app, received) = backup_service(StatusCode::OK, r#"{"success":true}"#);
    let url = spawn(app).await;
    let app = router(Arc::new(relay(Some(url), 30, None)));

    let (status, _) = send(app, trigger(r#"{"collection":"images"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        received.lock().unwrap()[0].body,
        json!({ "collection": "images" })
    );
}

#[tokio::test]
async fn trigger_failure_shape() {
    let _logger = init_test_logger();
    let url = refused_url().await;
    let app = router(Arc::new(relay(Some(url.clone()), 30, None)));

    let (status, body) = send(app, trigger("")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["api_url"], url);
    assert!(body["error"].is_string());
    assert!(body.get("backup_result").is_none());
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn health_without_url() {
    let app = router(Arc::new(relay(None, 900, Some("token"))));

    let (status, body) = send(app, health()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "qdrant-backup-trigger");
    assert_eq!(
        body["config"],
        json!({
            "vm_backup_api_url": false,
            "authorization_configured": true,
            "timeout_seconds": 900
        })
    );
    assert_eq!(body["backup_api_status"], "unknown");
}

#[tokio::test]
async fn health_of_backup_service() {
    let healthy = spawn(Router::new().route("/health", get(|| async { "ok" }))).await;
    let unhealthy = spawn(Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    ))
    .await;
    let unreachable = refused_url().await;

    for (url, expected) in [
        (healthy, "healthy"),
        (unhealthy, "unhealthy"),
        (unreachable, "unreachable"),
    ] {
        let app = router(Arc::new(relay(Some(url), 900, None)));
        let (status, body) = send(app, health()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["config"]["vm_backup_api_url"], true);
        assert_eq!(body["config"]["authorization_configured"], false);
        assert_eq!(body["backup_api_status"], expected);
    }
}
