//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint. None of these reach
//! the network: every outbound URL used here is refused by the guard.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use anypwa::{
    api::{create_router, RateLimiter},
    cache::{BoundedStore, ImageStore},
    site::{FetchConfig, PageMetadata, SafeFetcher},
    AppState,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::new(
        BoundedStore::new(100_000, 100, Duration::from_secs(300)),
        ImageStore::new(100_000, 10_000, 100, Duration::from_secs(300)),
        SafeFetcher::new(FetchConfig::default()).unwrap(),
        RateLimiter::new(100),
    )
}

fn create_test_app() -> Router {
    create_router(create_test_state())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Manifest Endpoint Tests ==

#[tokio::test]
async fn test_manifest_endpoint() {
    let response = create_test_app()
        .oneshot(get(
            "/app/manifest.json?name=Example&start_url=https%3A%2F%2Fexample.com%2F",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["name"], "Example");
    assert_eq!(json["short_name"], "Example");
    assert_eq!(json["start_url"], "/redirect?url=https%3A%2F%2Fexample.com%2F");
    assert_eq!(json["display"], "standalone");
    assert_eq!(json["icons"][0]["src"], "/app/icon.png");
    assert_eq!(json["icons"][0]["type"], "image/png");
}

#[tokio::test]
async fn test_manifest_with_short_name_and_icon() {
    let response = create_test_app()
        .oneshot(get(
            "/app/manifest.json?name=Example%20Site&short_name=Ex&start_url=example.com&icon_url=%2Fimages%2F42",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["name"], "Example Site");
    assert_eq!(json["short_name"], "Ex");
    assert_eq!(json["start_url"], "/redirect?url=https%3A%2F%2Fexample.com%2F");
    assert_eq!(json["icons"][0]["src"], "/images/42");
}

#[tokio::test]
async fn test_manifest_missing_start_url() {
    let response = create_test_app()
        .oneshot(get("/app/manifest.json?name=Example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("start_url"));
}

#[tokio::test]
async fn test_manifest_rejects_bad_scheme() {
    let response = create_test_app()
        .oneshot(get("/app/manifest.json?name=X&start_url=file%3A%2F%2F%2Fetc%2Fpasswd"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Website Infos Endpoint Tests ==

#[tokio::test]
async fn test_website_infos_requires_url() {
    let response = create_test_app()
        .oneshot(get("/getWebsiteInfos"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_website_infos_generic_denial() {
    let app = create_test_app();

    for url in [
        "http%3A%2F%2Fexample.com",
        "https%3A%2F%2F127.0.0.1%2Fx",
        "https%3A%2F%2F169.254.169.254%2Flatest%2Fmeta-data",
    ] {
        let response = app
            .clone()
            .oneshot(get(&format!("/getWebsiteInfos?url={}", url)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["error"], "Failed to get website infos");
    }
}

#[tokio::test]
async fn test_website_infos_long_url_denied() {
    let long = format!("https://example.com/{}", "a".repeat(280));
    let encoded: String = url::form_urlencoded::byte_serialize(long.as_bytes()).collect();

    let response = create_test_app()
        .oneshot(get(&format!("/getWebsiteInfos?url={}", encoded)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_website_infos_cached_result() {
    let state = create_test_state();
    let cached = PageMetadata {
        title: "Cached Title".to_string(),
        icon_url: None,
    };
    assert!(state
        .data_store
        .set("https://example.org/", serde_json::to_vec(&cached).unwrap()));

    let response = create_router(state)
        .oneshot(get("/getWebsiteInfos?url=https%3A%2F%2Fexample.org%2F"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["title"], "Cached Title");
    assert!(json["icon_url"].is_null());
}

// == Image Endpoint Tests ==

#[tokio::test]
async fn test_stored_image_served() {
    let state = create_test_state();
    let key = state.image_store.add(&b"GIF89a...."[..]).unwrap();

    let response = create_router(state)
        .oneshot(get(&format!("/images/{}", key)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(response
        .headers()
        .contains_key(header::CONTENT_SECURITY_POLICY));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"GIF89a....");
}

#[tokio::test]
async fn test_icon_proxy_denies_private_target() {
    let response = create_test_app()
        .oneshot(get("/icon?url=https%3A%2F%2F192.168.1.1%2Ffavicon.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Failed to fetch icon");
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let response = create_test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let response = create_test_app().oneshot(get("/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
