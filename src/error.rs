//! Error types for the app wrapper service
//!
//! Store and fetch errors stay internal; `ApiError` is what reaches clients.

use std::net::IpAddr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Capacity and validation failures of the in-memory stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Single payload larger than the per-item limit
    #[error("entry size exceeded: {size} bytes > {max} bytes")]
    EntrySizeExceeded { size: usize, max: usize },

    /// Payload would push the store past its aggregate limit
    #[error("total size exceeded (max {max} bytes)")]
    TotalSizeExceeded { max: usize },

    /// Store already holds its maximum number of entries
    #[error("max entries exceeded (max {max})")]
    MaxCountExceeded { max: usize },

    /// No unused key found within the retry bound
    #[error("no free key found after {attempts} attempts")]
    KeySpaceExhausted { attempts: usize },
}

// == Fetch Error Enum ==
/// Reasons a remote fetch was refused or failed.
///
/// These carry internal detail (resolved addresses, transport errors) and are
/// meant for logs, not for clients.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("URL is too long ({0} characters)")]
    UrlTooLong(usize),

    #[error("failed to parse URL: {0}")]
    UrlMalformed(String),

    #[error("URL scheme is not HTTPS: {0:?}")]
    InsecureScheme(String),

    #[error("failed to resolve {host}: {reason}")]
    DnsFailure { host: String, reason: String },

    #[error("URL resolves to a {class} address: {addr}")]
    UnsafeTarget { addr: IpAddr, class: &'static str },

    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::FetchFailed(err.to_string())
    }
}

// == API Error Enum ==
/// Errors returned to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Remote site could not be fetched; detail is logged, not returned
    #[error("{0}")]
    Upstream(&'static str),

    /// Store refused the payload
    #[error("Store full: {0}")]
    StoreFull(#[from] StoreError),

    /// Rate limit exhausted
    #[error("Too many requests, please try again later.")]
    TooManyRequests,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::StoreFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
