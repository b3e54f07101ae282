//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::cache::{BoundedStore, ImageStore};
use crate::config::{Config, DEFAULT_ICON_PATH};
use crate::error::{ApiError, FetchError, Result};
use crate::models::{HealthResponse, Manifest, ManifestQuery, StoredImageResponse, UrlQuery};
use crate::site::{PageMetadata, SafeFetcher};

use super::rate_limit::RateLimiter;

/// Message returned for every failed page lookup
const WEBSITE_INFOS_FAILED: &str = "Failed to get website infos";

/// Message returned for every failed icon fetch
const ICON_FETCH_FAILED: &str = "Failed to fetch icon";

/// Proxied images come from arbitrary sites; nothing in them may run as this origin.
const IMAGE_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

/// Application state shared across all handlers.
///
/// The stores carry their own locks, so handlers only clone `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Cached page metadata, keyed by URL, stored as JSON
    pub data_store: Arc<BoundedStore>,
    /// Proxied icons
    pub image_store: Arc<ImageStore>,
    /// Guarded HTTP client
    pub fetcher: SafeFetcher,
    /// Shared by the routes that trigger outbound requests
    pub limiter: RateLimiter,
    /// File served at `/app/icon.png`
    pub default_icon_path: String,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        data_store: BoundedStore,
        image_store: ImageStore,
        fetcher: SafeFetcher,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            data_store: Arc::new(data_store),
            image_store: Arc::new(image_store),
            fetcher,
            limiter,
            default_icon_path: DEFAULT_ICON_PATH.to_string(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, FetchError> {
        let data_store = BoundedStore::new(
            config.data_store_max_bytes,
            config.data_store_max_entries,
            std::time::Duration::from_secs(config.data_store_ttl),
        );
        let image_store = ImageStore::new(
            config.image_store_max_bytes,
            config.image_store_max_item_bytes,
            config.image_store_max_entries,
            std::time::Duration::from_secs(config.image_store_ttl),
        );
        let fetcher = SafeFetcher::new(config.fetch_config())?;
        let limiter = RateLimiter::new(config.rate_limit_tokens);

        Ok(Self {
            default_icon_path: config.default_icon_path.clone(),
            ..Self::new(data_store, image_store, fetcher, limiter)
        })
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /app/manifest.json
pub async fn manifest_handler(Query(query): Query<ManifestQuery>) -> Result<Json<Manifest>> {
    let data = query
        .validate()
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to parse user manifest data: {}", e)))?;

    Ok(Json(Manifest::for_app(data)))
}

/// Handler for GET /app/icon.png
pub async fn default_icon_handler(State(state): State<AppState>) -> Result<Response> {
    match tokio::fs::read(&state.default_icon_path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        Err(err) => {
            warn!("Default icon {} unavailable: {}", state.default_icon_path, err);
            Err(ApiError::NotFound("icon.png".to_string()))
        }
    }
}

/// Handler for GET /redirect
///
/// Answers 301 so installed apps land on the wrapped page.
pub async fn redirect_handler(Query(query): Query<UrlQuery>) -> Result<Response> {
    let url = query.required().map_err(ApiError::InvalidRequest)?;
    let location = HeaderValue::from_str(url)
        .map_err(|_| ApiError::InvalidRequest("url is not a valid location".to_string()))?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}

/// Handler for GET /getWebsiteInfos
///
/// Results are served from the data store when present. Fetch failures are
/// logged in full but reported to the client with a generic message.
pub async fn website_infos_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<PageMetadata>> {
    let url = query.required().map_err(ApiError::InvalidRequest)?;

    if let Some(cached) = state.data_store.get(url) {
        match serde_json::from_slice::<PageMetadata>(&cached) {
            Ok(metadata) => return Ok(Json(metadata)),
            Err(err) => warn!("Discarding unreadable cached metadata for {}: {}", url, err),
        }
    }

    let metadata = state.fetcher.fetch_page_metadata(url).await.map_err(|err| {
        error!("Failed to get website infos for {}: {}", url, err);
        ApiError::Upstream(WEBSITE_INFOS_FAILED)
    })?;

    match serde_json::to_vec(&metadata) {
        Ok(bytes) => {
            if !state.data_store.set(url, bytes) {
                warn!("Data store full, not caching metadata for {}", url);
            }
        }
        Err(err) => warn!("Failed to serialize metadata for {}: {}", url, err),
    }

    Ok(Json(metadata))
}

/// Handler for GET /icon
///
/// Downloads an icon through the guarded fetcher and files it in the image store.
pub async fn proxy_icon_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<StoredImageResponse>> {
    let url = query.required().map_err(ApiError::InvalidRequest)?;

    let limit = state.image_store.max_item_bytes();
    let bytes = state.fetcher.fetch_bytes(url, limit).await.map_err(|err| {
        error!("Failed to fetch icon {}: {}", url, err);
        ApiError::Upstream(ICON_FETCH_FAILED)
    })?;

    let key = state.image_store.add(bytes)?;
    info!("Proxied icon {} stored as {}", url, key);

    Ok(Json(StoredImageResponse::new(key)))
}

/// Handler for GET /images/:key
///
/// Stored bytes are untrusted. Responses are sandboxed, never sniffed, and
/// SVG is sent as an attachment so its scripts cannot run as this origin.
pub async fn image_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let bytes = state
        .image_store
        .get(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Image not found: {}", key)))?;

    let content_type = sniff_image_type(&bytes);
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_SECURITY_POLICY, IMAGE_CSP),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        bytes,
    )
        .into_response();

    if content_type == "image/svg+xml" {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
    }
    Ok(response)
}

/// Guesses an image MIME type from its leading bytes.
pub fn sniff_image_type(bytes: &[u8]) -> &'static str {
    const SIGNATURES: [(&[u8], &str); 5] = [
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF8", "image/gif"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
        (b"<svg", "image/svg+xml"),
    ];

    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if let Some(&(_, mime)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
        return mime;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    if head.trim_start().starts_with("<?xml") && head.contains("<svg") {
        return "image/svg+xml";
    }
    "application/octet-stream"
}
