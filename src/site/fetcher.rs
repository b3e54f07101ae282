//! Safe Fetcher
//!
//! Fetches remote resources on behalf of untrusted callers. Every request,
//! redirect hops included, goes through [`guard::validate_url`] first;
//! nothing is retried.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;
use crate::site::guard;
use crate::site::scanner::{PageMetadata, PageScanner};

/// Configuration for outbound fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Largest HTML body read when scanning a page
    pub max_page_bytes: usize,
    /// Smallest fixed icon dimension accepted by the scanner
    pub min_icon_pixels: u32,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_page_bytes: 5_000_000,
            min_icon_pixels: 144,
            user_agent: concat!("anypwa/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Most redirects followed for a single fetch
pub const MAX_REDIRECTS: usize = 5;

/// HTTP client wrapper enforcing the URL guard.
///
/// The underlying client never follows redirects or uses a proxy on its own.
/// Each `Location` is resolved here and sent back through the guard before it
/// is requested. Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SafeFetcher {
    client: Client,
    config: FetchConfig,
}

impl SafeFetcher {
    /// Creates a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url` and extracts its title and best icon.
    ///
    /// Parsing runs on the blocking pool; pages can be several megabytes.
    pub async fn fetch_page_metadata(&self, url: &str) -> Result<PageMetadata, FetchError> {
        let base = guard::validate_url(url).await?;
        let body = self.get(base.clone(), self.config.max_page_bytes).await?;

        let scanner = PageScanner::new(base, self.config.min_icon_pixels);
        let metadata = tokio::task::spawn_blocking(move || {
            let html = String::from_utf8_lossy(&body);
            scanner.scan_str(&html)
        })
        .await
        .map_err(|err| FetchError::FetchFailed(format!("page scan aborted: {}", err)))?;

        info!(
            "Scanned {}: title={:?} icon={:?}",
            url, metadata.title, metadata.icon_url
        );
        Ok(metadata)
    }

    /// Fetches `url` and returns at most `limit` bytes of its body.
    ///
    /// A body longer than `limit` is an error, not a truncation.
    pub async fn fetch_bytes(&self, url: &str, limit: usize) -> Result<Bytes, FetchError> {
        let url = guard::validate_url(url).await?;
        self.get(url, limit).await
    }

    /// GETs an already validated URL, following guarded redirects.
    async fn get(&self, url: Url, limit: usize) -> Result<Bytes, FetchError> {
        let mut url = url;
        let mut hops = 0;
        let mut response = loop {
            debug!("GET {}", url);
            let next = {
                let response = self.client.get(url.clone()).send().await?;
                if !response.status().is_redirection() {
                    break response.error_for_status()?;
                }
                redirect_target(&url, &response)?
            };
            if hops == MAX_REDIRECTS {
                return Err(FetchError::FetchFailed(format!(
                    "more than {} redirects",
                    MAX_REDIRECTS
                )));
            }
            hops += 1;
            debug!("Redirect {} -> {}", url, next);
            url = guard::validate_url(next.as_str()).await?;
        };

        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(too_large(limit));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(too_large(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

/// Resolves a redirect's `Location` against `from`. The result is not yet guarded.
fn redirect_target(from: &Url, response: &Response) -> Result<Url, FetchError> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            FetchError::FetchFailed(format!("{} redirect without Location", response.status()))
        })?;
    from.join(location)
        .map_err(|err| FetchError::UrlMalformed(err.to_string()))
}

fn too_large(limit: usize) -> FetchError {
    FetchError::FetchFailed(format!("response body exceeds {} bytes", limit))
}
