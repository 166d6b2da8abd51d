//! Status API tests, driven through the router without a socket.

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use codex_link::admin::{setup_admin_router, AppState};
use codex_link::backend::BackendClient;
use codex_link::config::AdminConfig;
use codex_link::connectivity::{
    ConnectivityModeController, ControllerRegistry, HttpHealthProbe, ManualClock, ModePolicy,
};
use codex_link::feed::{LearningFeed, MockDataset, ProposalFeed, LEARNING_DOMAIN, PROPOSALS_DOMAIN};

mod common;

const KEY: &str = "test-key";

async fn build_app(debug_hooks: bool) -> Router {
    let addr = common::unused_addr().await;
    let base = format!("http://{}", addr);
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let clock = Arc::new(ManualClock::at(10, 0));

    let registry = ControllerRegistry::new();
    for domain in [PROPOSALS_DOMAIN, LEARNING_DOMAIN] {
        let probe = HttpHealthProbe::with_client(
            http.clone(),
            &base,
            "/health",
            Duration::from_millis(500),
        )
        .unwrap();
        registry.insert(Arc::new(
            ConnectivityModeController::new(domain, Arc::new(probe), ModePolicy::default())
                .with_clock(clock.clone()),
        ));
    }

    let client = BackendClient::with_client(http, &base, Duration::from_millis(500)).unwrap();
    let mock = Arc::new(MockDataset::generate());
    let state = AppState {
        proposals: registry
            .get(PROPOSALS_DOMAIN)
            .map(|c| ProposalFeed::new(c, client.clone(), mock.clone())),
        learning: registry
            .get(LEARNING_DOMAIN)
            .map(|c| LearningFeed::new(c, client.clone(), mock.clone())),
        registry,
        api_key: Arc::from(KEY),
    };

    let config = AdminConfig {
        api_key: KEY.into(),
        debug_hooks,
        ..AdminConfig::default()
    };
    setup_admin_router(state, &config)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", KEY));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_requires_api_key() {
    let app = build_app(false).await;

    let missing = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let (status, _) = send(&app, missing).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/status")
        .header(AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_lists_domains_with_banner() {
    let app = build_app(false).await;
    let (status, body) = send(&app, request(Method::GET, "/status", None)).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["domain"], "ai_learning");
    assert_eq!(entries[1]["domain"], "proposals");
    for entry in entries {
        assert_eq!(entry["mode"], "real");
        assert_eq!(entry["consecutive_failures"], 0);
        assert_eq!(entry["within_operational_hours"], true);
        assert_eq!(entry["banner"]["icon"], "cloud_done");
    }
}

#[tokio::test]
async fn test_unknown_domain_is_404() {
    let app = build_app(false).await;
    let (status, body) = send(&app, request(Method::GET, "/status/weather", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("weather"));
}

#[tokio::test]
async fn test_retry_against_unreachable_backend() {
    let app = build_app(false).await;
    let (status, body) = send(&app, request(Method::POST, "/retry/proposals", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["healthy"], false);
    assert_eq!(body["outcome"]["trigger"], "manual");
    assert_eq!(body["status"]["consecutive_failures"], 1);
    assert_eq!(body["status"]["mode"], "real");

    let (_, other) = send(&app, request(Method::GET, "/status/ai_learning", None)).await;
    assert_eq!(other["consecutive_failures"], 0);
}

#[tokio::test]
async fn test_debug_route_hidden_without_hooks() {
    let app = build_app(false).await;
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/debug/mode/proposals",
            Some(serde_json::json!({"mode": "mock"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forced_mock_mode_reviews_mock_proposals() {
    let app = build_app(true).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/debug/mode/proposals",
            Some(serde_json::json!({"mode": "mock"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "mock");
    assert_eq!(body["banner"]["icon"], "cloud_off");

    let (status, body) = send(&app, request(Method::GET, "/feeds/proposals", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "mock");
    assert_eq!(body["data"].as_array().unwrap().len(), 12);

    let (status, body) = send(
        &app,
        request(Method::POST, "/feeds/proposals/mock-imperium-1/approve", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, _) = send(
        &app,
        request(Method::POST, "/feeds/proposals/mock-imperium-1/reject", None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        request(Method::POST, "/feeds/proposals/missing/approve", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_learning_feed_falls_back_when_backend_down() {
    let app = build_app(false).await;
    let (status, body) = send(&app, request(Method::GET, "/feeds/learning", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "real");
    assert_eq!(body["source"], "mock");
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}
