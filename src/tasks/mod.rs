//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Store sweep: removes expired metadata and images at a fixed interval
//! - Rate limiter refill: resets the request token bucket

mod refill;
mod sweep;

pub use refill::spawn_refill_task;
pub use sweep::spawn_sweep_task;
