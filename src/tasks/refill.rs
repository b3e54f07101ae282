//! Rate Limiter Refill Task
//!
//! Resets the request token bucket to full on a fixed interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::RateLimiter;

/// Spawns a task that refills `limiter` every `interval_secs` seconds.
pub fn spawn_refill_task(limiter: RateLimiter, interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting rate limiter refill task ({} tokens every {} seconds)",
            limiter.max_tokens(),
            interval_secs
        );

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            limiter.refill();
            debug!("Rate limiter refilled");
        }
    })
}
