//! Response DTOs for the app wrapper API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use url::form_urlencoded;

use super::requests::UserManifestData;

/// Icon served when the caller supplies none
pub const DEFAULT_ICON_SRC: &str = "/app/icon.png";

/// Web app manifest (GET /app/manifest.json)
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub icons: Vec<ManifestIcon>,
    pub display: String,
    pub theme_color: String,
    pub background_color: String,
}

/// One entry of a manifest's `icons` array
#[derive(Debug, Clone, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl Manifest {
    /// Builds the manifest for a wrapped page.
    ///
    /// The installed app starts on `/redirect`, which forwards to the real page.
    pub fn for_app(data: UserManifestData) -> Self {
        let target: String = form_urlencoded::byte_serialize(data.start_url.as_str().as_bytes()).collect();

        Self {
            name: data.name,
            short_name: data.short_name,
            start_url: format!("/redirect?url={}", target),
            icons: vec![ManifestIcon {
                src: data.icon_url.unwrap_or_else(|| DEFAULT_ICON_SRC.to_string()),
                // not measured, most sites serve something close
                sizes: "512x512".to_string(),
                mime_type: "image/png".to_string(),
            }],
            display: "standalone".to_string(),
            theme_color: "#ffffff".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

/// Response body for GET /icon
#[derive(Debug, Clone, Serialize)]
pub struct StoredImageResponse {
    /// Image store key
    pub key: String,
    /// Path the image is served from
    pub src: String,
}

impl StoredImageResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            src: format!("/images/{}", key),
            key,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
