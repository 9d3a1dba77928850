//! HTTP-level tests driving the full router over the in-memory store.

use std::net::IpAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use tiendita_backend::app;
use tiendita_backend::config::{BackendConfig, CollectionsConfig};
use tiendita_backend::state::AppState;
use tiendita_backend::store::{DocumentStore, MemoryStore, Query};

fn test_config() -> BackendConfig {
    BackendConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse::<IpAddr>().expect("valid ip"),
        port: 0,
        default_locale: "es".to_owned(),
        collections: CollectionsConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(test_config(), store.clone());
    (app(state), store)
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    router.clone().oneshot(request).await.expect("send request")
}

async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    router.clone().oneshot(request).await.expect("send request")
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn test_health() {
    let (router, _) = test_app();
    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_account_created_provisions_profile() {
    let (router, store) = test_app();

    let response = send_json(
        &router,
        "POST",
        "/events/account-created",
        json!({"id": "acct_1", "email": "ana@example.com", "name": "Ana García"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["profileId"], "acct_1");

    let profile = store
        .get("profiles", "acct_1")
        .await
        .expect("get")
        .expect("profile created");
    assert_eq!(profile.data["firstName"], "Ana");
    assert_eq!(profile.data["lastName"], "García");

    let prefs = store
        .query("preferences", Query::new().filter_eq("profileId", "acct_1"))
        .await
        .expect("query");
    assert_eq!(prefs.len(), 1);
}

#[tokio::test]
async fn test_account_created_bad_payload() {
    let (router, _) = test_app();

    let response = send_json(
        &router,
        "POST",
        "/events/account-created",
        json!({"id": "acct_1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_account_created_redelivery_is_idempotent() {
    let (router, store) = test_app();
    let event = json!({"id": "acct_1", "email": "ana@example.com", "name": "Ana"});

    let first = send_json(&router, "POST", "/events/account-created", event.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send_json(&router, "POST", "/events/account-created", event).await;
    assert_eq!(second.status(), StatusCode::OK);
    let body = json_body(second).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["profileId"], "acct_1");

    let profiles = store.query("profiles", Query::new()).await.expect("query");
    assert_eq!(profiles.len(), 1);
}

#[tokio::test]
async fn test_slug_check_reasons() {
    let (router, store) = test_app();
    store
        .create("storefronts", "store_1", json!({"slug": "mi-tienda", "enabled": true}))
        .await
        .expect("seed");

    let taken = json_body(
        send_json(&router, "POST", "/api/slug/check", json!({"slug": " mi-tienda "})).await,
    )
    .await;
    assert_eq!(taken["ok"], true);
    assert_eq!(taken["valid"], false);
    assert_eq!(taken["reason"], "taken");
    assert_eq!(taken["slug"], "mi-tienda");

    let uppercase = json_body(
        send_json(&router, "POST", "/api/slug/check", json!({"slug": "Mi-Tienda"})).await,
    )
    .await;
    assert_eq!(uppercase["valid"], false);
    assert_eq!(uppercase["reason"], "format");

    let short = json_body(
        send_json(&router, "POST", "/api/slug/check", json!({"slug": "ab"})).await,
    )
    .await;
    assert_eq!(short["valid"], false);
    assert_eq!(short["reason"], "too_short");

    let missing = json_body(
        send_json(&router, "POST", "/api/slug/check", json!({})).await,
    )
    .await;
    assert_eq!(missing["valid"], false);
    assert_eq!(missing["reason"], "empty");

    let free = json_body(
        send_json(&router, "POST", "/api/slug/check", json!({"slug": "nueva-tienda"})).await,
    )
    .await;
    assert_eq!(free["valid"], true);
    assert_eq!(free["slug"], "nueva-tienda");
    assert!(free.get("reason").is_none());
}

#[tokio::test]
async fn test_slug_suggest() {
    let (router, _) = test_app();
    let body = json_body(get(&router, "/api/slug/suggest?base=Caf%C3%A9%20Con%20Leche&count=2").await).await;
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["suggestions"],
        json!(["cafe-con-leche-1", "cafe-con-leche-2"])
    );
}

#[tokio::test]
async fn test_record_view_and_today_counters() {
    let (router, _) = test_app();

    for fp in ["fp-a", "fp-b", "fp-a"] {
        let response = send_json(
            &router,
            "POST",
            "/api/stores/s1/views",
            json!({"fingerprint": fp}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let today = json_body(get(&router, "/api/stores/s1/analytics/today").await).await;
    assert_eq!(today["totalViews"], 3);
    assert_eq!(today["uniqueViews"], 2);
}

#[tokio::test]
async fn test_record_view_without_body_uses_header_signal() {
    let (router, _) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/stores/s1/views")
        .header(header::USER_AGENT, "Mozilla/5.0 (test)")
        .header(header::ACCEPT_LANGUAGE, "es-MX")
        .body(Body::empty())
        .expect("build request");
    let response = router.clone().oneshot(request).await.expect("send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let today = json_body(get(&router, "/api/stores/s1/analytics/today").await).await;
    assert_eq!(today["totalViews"], 1);
    assert_eq!(today["uniqueViews"], 1);
}

#[tokio::test]
async fn test_store_analytics_range_summary() {
    let (router, _) = test_app();

    for fp in ["fp-a", "fp-b"] {
        send_json(
            &router,
            "POST",
            "/api/stores/s1/views",
            json!({"fingerprint": fp}),
        )
        .await;
    }
    // Another store's views must not leak into s1's range.
    send_json(
        &router,
        "POST",
        "/api/stores/s2/views",
        json!({"fingerprint": "fp-z"}),
    )
    .await;

    let body = json_body(get(&router, "/api/stores/s1/analytics?days=7").await).await;
    assert_eq!(body["summary"]["daysWithData"], 1);
    assert_eq!(body["summary"]["totalViews"], 2);
    assert_eq!(body["summary"]["uniqueViews"], 2);
    assert_eq!(
        body["documents"]
            .as_array()
            .expect("documents array")
            .len(),
        1
    );

    // Empty store: zero-valued summary, no documents.
    let empty = json_body(get(&router, "/api/stores/s3/analytics").await).await;
    assert_eq!(empty["summary"]["daysWithData"], 0);
    assert_eq!(empty["summary"]["totalViews"], 0);
    assert!(empty["documents"].as_array().expect("array").is_empty());
}
