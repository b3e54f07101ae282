//! Rate Limiting
//!
//! Fixed-window token bucket shared by all routes that trigger outbound fetches.
//! The bucket is reset to full by `tasks::spawn_refill_task`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::ApiError;

/// Token bucket refilled to `max_tokens` by an external timer.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: Arc<Mutex<usize>>,
    max_tokens: usize,
}

impl RateLimiter {
    /// Creates a full bucket.
    pub fn new(max_tokens: usize) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(max_tokens)),
            max_tokens,
        }
    }

    /// Takes one token; returns false when the bucket is empty.
    pub fn try_acquire(&self) -> bool {
        let mut tokens = self.tokens.lock();
        if *tokens > 0 {
            *tokens -= 1;
            true
        } else {
            false
        }
    }

    pub fn refill(&self) {
        *self.tokens.lock() = self.max_tokens;
    }

    pub fn available(&self) -> usize {
        *self.tokens.lock()
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

/// Middleware rejecting requests with 429 once the bucket is empty.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !limiter.try_acquire() {
        warn!("Rate limit exhausted, rejecting {}", request.uri());
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(request).await)
}
