//! HTTP surface tests against a bound listener.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use exchange_manager::api::{router, ApiState};
use exchange_manager::orchestrator::ReloadSettings;
use exchange_manager::{ExchangeManager, ExchangeRegistry, ProcessRegistry};

mod common;
use common::RecordingGateway;

const API_KEY: &str = "test-key";

fn state_with(gateway: Arc<RecordingGateway>) -> ApiState {
    let manager = Arc::new(ExchangeManager::new(
        Arc::new(ExchangeRegistry::new()),
        Arc::new(ProcessRegistry::new()),
        gateway,
        ReloadSettings::default(),
    ));
    ApiState {
        manager,
        api_key: API_KEY.to_string(),
    }
}

async fn serve(state: ApiState) -> String {
    let app = router(state, Duration::from_secs(5));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn management_routes_require_the_bearer_token() {
    let app = router(state_with(Arc::new(RecordingGateway::new())), Duration::from_secs(5));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/exchanges")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn system_status_is_open_and_reports_counts() {
    let url = serve(state_with(Arc::new(RecordingGateway::new()))).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/system/status", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["exchanges"], 0);
    assert_eq!(body["consumer_processes"], 0);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn exchange_crud_over_http() {
    let url = serve(state_with(Arc::new(RecordingGateway::new()))).await;
    let client = reqwest::Client::new();

    // Declare.
    let response = client
        .post(format!("{}/exchanges", url))
        .bearer_auth(API_KEY)
        .json(&json!({
            "name": "orders",
            "mode": "topic",
            "durable": true,
            "comment": "order events",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Duplicate declare conflicts.
    let response = client
        .post(format!("{}/exchanges", url))
        .bearer_auth(API_KEY)
        .json(&json!({
            "name": "orders",
            "mode": "topic",
            "durable": true,
            "comment": "order events",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // List and fetch.
    let body: Value = client
        .get(format!("{}/exchanges", url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);

    let body: Value = client
        .get(format!("{}/exchanges/orders", url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["mode"], "topic");
    assert_eq!(body["consumers"].as_array().unwrap().len(), 0);

    // Bind a consumer, then read it back.
    let body: Value = client
        .post(format!("{}/exchanges/orders/consumers", url))
        .bearer_auth(API_KEY)
        .json(&json!({ "id": "c1", "route_key": "order.*" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["id"], "c1");

    let body: Value = client
        .get(format!("{}/exchanges/orders/status", url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["state"], "stopped");

    // Delete, then 404.
    let response = client
        .delete(format!("{}/exchanges/orders", url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/exchanges/orders", url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn invalid_mode_maps_to_bad_request() {
    let gateway = Arc::new(RecordingGateway::new());
    let url = serve(state_with(gateway.clone())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/exchanges", url))
        .bearer_auth(API_KEY)
        .json(&json!({
            "name": "orders",
            "mode": "headers",
            "comment": "order events",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(gateway.calls().is_empty());
}
