//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::site::FetchConfig;

/// Default file served at `/app/icon.png`
pub const DEFAULT_ICON_PATH: &str = "static/icon.png";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Aggregate byte limit of the page metadata store
    pub data_store_max_bytes: usize,
    /// Entry limit of the page metadata store
    pub data_store_max_entries: usize,
    /// Page metadata TTL in seconds
    pub data_store_ttl: u64,
    /// Aggregate byte limit of the image store
    pub image_store_max_bytes: usize,
    /// Largest single image accepted
    pub image_store_max_item_bytes: usize,
    /// Entry limit of the image store
    pub image_store_max_entries: usize,
    /// Image TTL in seconds
    pub image_store_ttl: u64,
    /// Outbound request timeout in seconds
    pub fetch_timeout: u64,
    /// Largest HTML page read when scanning
    pub max_page_bytes: usize,
    /// Smallest fixed icon dimension accepted
    pub min_icon_pixels: u32,
    /// Requests allowed per refill interval on rate limited routes
    pub rate_limit_tokens: usize,
    /// Rate limiter refill interval in seconds
    pub rate_limit_refill: u64,
    /// Periodic store sweep interval in seconds
    pub sweep_interval: u64,
    /// File served at `/app/icon.png`
    pub default_icon_path: String,
}

/// Reads `name` and parses it, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 8080)
    /// - `DATA_STORE_MAX_BYTES` / `DATA_STORE_MAX_ENTRIES` / `DATA_STORE_TTL_SECS`
    /// - `IMAGE_STORE_MAX_BYTES` / `IMAGE_STORE_MAX_ITEM_BYTES` /
    ///   `IMAGE_STORE_MAX_ENTRIES` / `IMAGE_STORE_TTL_SECS`
    /// - `FETCH_TIMEOUT_SECS`, `MAX_PAGE_BYTES`, `MIN_ICON_PIXELS`
    /// - `RATE_LIMIT_TOKENS`, `RATE_LIMIT_REFILL_SECS`
    /// - `SWEEP_INTERVAL_SECS`, `DEFAULT_ICON_PATH`
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            server_port: env_or("PORT", d.server_port),
            data_store_max_bytes: env_or("DATA_STORE_MAX_BYTES", d.data_store_max_bytes),
            data_store_max_entries: env_or("DATA_STORE_MAX_ENTRIES", d.data_store_max_entries),
            data_store_ttl: env_or("DATA_STORE_TTL_SECS", d.data_store_ttl),
            image_store_max_bytes: env_or("IMAGE_STORE_MAX_BYTES", d.image_store_max_bytes),
            image_store_max_item_bytes: env_or(
                "IMAGE_STORE_MAX_ITEM_BYTES",
                d.image_store_max_item_bytes,
            ),
            image_store_max_entries: env_or("IMAGE_STORE_MAX_ENTRIES", d.image_store_max_entries),
            image_store_ttl: env_or("IMAGE_STORE_TTL_SECS", d.image_store_ttl),
            fetch_timeout: env_or("FETCH_TIMEOUT_SECS", d.fetch_timeout),
            max_page_bytes: env_or("MAX_PAGE_BYTES", d.max_page_bytes),
            min_icon_pixels: env_or("MIN_ICON_PIXELS", d.min_icon_pixels),
            rate_limit_tokens: env_or("RATE_LIMIT_TOKENS", d.rate_limit_tokens),
            rate_limit_refill: env_or("RATE_LIMIT_REFILL_SECS", d.rate_limit_refill),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", d.sweep_interval),
            default_icon_path: env::var("DEFAULT_ICON_PATH").unwrap_or(d.default_icon_path),
        }
    }

    /// Outbound fetch settings derived from this configuration.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.fetch_timeout),
            max_page_bytes: self.max_page_bytes,
            min_icon_pixels: self.min_icon_pixels,
            ..FetchConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            data_store_max_bytes: 1_000_000,
            data_store_max_entries: 1000,
            data_store_ttl: 3600,
            image_store_max_bytes: 50_000_000,
            image_store_max_item_bytes: 1_000_000,
            image_store_max_entries: 1000,
            image_store_ttl: 3600,
            fetch_timeout: 10,
            max_page_bytes: 5_000_000,
            min_icon_pixels: 144,
            rate_limit_tokens: 30,
            rate_limit_refill: 60,
            sweep_interval: 300,
            default_icon_path: DEFAULT_ICON_PATH.to_string(),
        }
    }
}
