//! Request DTOs for the app wrapper API
//!
//! Defines the query strings accepted by the HTTP handlers.

use serde::Deserialize;
use url::{ParseError, Url};

/// Query for routes taking a single target URL
/// (`/redirect`, `/getWebsiteInfos`, `/icon`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlQuery {
    #[serde(default)]
    pub url: Option<String>,
}

impl UrlQuery {
    /// Returns the non-empty `url` parameter.
    pub fn required(&self) -> Result<&str, String> {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err("url parameter is required".to_string()),
        }
    }
}

/// Query for `GET /app/manifest.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Validated manifest inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserManifestData {
    pub name: String,
    pub short_name: String,
    pub start_url: Url,
    pub icon_url: Option<String>,
}

impl ManifestQuery {
    /// Validates the query.
    ///
    /// `name` and `start_url` are required. A `start_url` without a scheme is
    /// taken to be HTTPS; schemes other than `http` and `https` are refused.
    pub fn validate(self) -> Result<UserManifestData, String> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "Required parameter name is missing".to_string())?;
        let raw_start = self
            .start_url
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Required parameter start_url is missing".to_string())?;

        let start_url = match Url::parse(&raw_start) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", raw_start))
                .map_err(|e| format!("failed to parse start_url: {}", e))?,
            Err(e) => return Err(format!("failed to parse start_url: {}", e)),
        };
        if start_url.scheme() != "http" && start_url.scheme() != "https" {
            return Err(format!("invalid start_url scheme: {}", start_url.scheme()));
        }

        let short_name = self
            .short_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| name.clone());

        Ok(UserManifestData {
            name,
            short_name,
            start_url,
            icon_url: self.icon_url.filter(|s| !s.is_empty()),
        })
    }
}
