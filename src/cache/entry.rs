//! Store Entry Module
//!
//! Defines the payload held by both stores together with its insertion time.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Store Entry ==
/// A stored payload and the instant it was written.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// The stored bytes
    pub value: Bytes,
    /// Insertion instant (monotonic clock)
    pub stored_at: Instant,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry is older than `ttl`.
    ///
    /// An entry whose age equals `ttl` exactly is still live; it expires once
    /// strictly more than `ttl` has elapsed.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }
}
