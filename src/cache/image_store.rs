//! Image Store Module
//!
//! Holds proxied image payloads under store-generated keys.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info};

use crate::cache::entry::Entry;
use crate::cache::{IMAGE_KEY_SPACE, MAX_KEY_ATTEMPTS};
use crate::error::StoreError;

// == Image Store ==
/// Thread-safe image store with per-item, aggregate, count and TTL limits.
#[derive(Debug)]
pub struct ImageStore {
    entries: Mutex<HashMap<String, Entry>>,
    max_total_bytes: usize,
    max_item_bytes: usize,
    max_count: usize,
    ttl: Duration,
}

impl ImageStore {
    // == Constructor ==
    pub fn new(max_total_bytes: usize, max_item_bytes: usize, max_count: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_total_bytes,
            max_item_bytes,
            max_count,
            ttl,
        }
    }

    // == Add ==
    /// Stores an image and returns the key it was filed under.
    ///
    /// The per-item limit is checked first and is not retried. If the
    /// aggregate size or entry count would be exceeded, expired entries are
    /// evicted once and the checks run again.
    pub fn add(&self, value: impl Into<Bytes>) -> Result<String, StoreError> {
        let value = value.into();
        if value.len() > self.max_item_bytes {
            return Err(StoreError::EntrySizeExceeded {
                size: value.len(),
                max: self.max_item_bytes,
            });
        }

        let mut entries = self.entries.lock();
        if self.check_capacity(&entries, value.len()).is_err() {
            Self::evict_expired(&mut entries, self.ttl);
            self.check_capacity(&entries, value.len())?;
        }

        let key = Self::free_key(&entries)?;
        debug!("Image store: added entry with key {} (size={})", key, value.len());
        entries.insert(key.clone(), Entry::new(value));

        Ok(key)
    }

    // == Get ==
    /// Returns the image stored under `key`, or `None` if there is none.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.lock().get(key).map(|e| e.value.clone())
    }

    // == Byte Size ==
    /// Sum of all stored payload lengths, recomputed on each call.
    pub fn byte_size(&self) -> usize {
        Self::total_bytes(&self.entries.lock())
    }

    /// Largest payload `add` accepts.
    pub fn max_item_bytes(&self) -> usize {
        self.max_item_bytes
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    // == Evict ==
    /// Removes every entry older than the TTL and returns how many were removed.
    pub fn evict(&self) -> usize {
        Self::evict_expired(&mut self.entries.lock(), self.ttl)
    }

    // == Internals ==
    fn total_bytes(entries: &HashMap<String, Entry>) -> usize {
        entries.values().map(Entry::len).sum()
    }

    fn check_capacity(&self, entries: &HashMap<String, Entry>, len: usize) -> Result<(), StoreError> {
        if Self::total_bytes(entries) + len > self.max_total_bytes {
            return Err(StoreError::TotalSizeExceeded {
                max: self.max_total_bytes,
            });
        }
        if entries.len() >= self.max_count {
            return Err(StoreError::MaxCountExceeded {
                max: self.max_count,
            });
        }
        Ok(())
    }

    fn evict_expired(entries: &mut HashMap<String, Entry>, ttl: Duration) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        let evicted = before - entries.len();
        info!("Image store: evicted {} entries", evicted);
        evicted
    }

    /// Draws random keys until one is not in use.
    fn free_key(entries: &HashMap<String, Entry>) -> Result<String, StoreError> {
        let mut rng = rand::rng();
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = rng.random_range(0..IMAGE_KEY_SPACE).to_string();
            if !entries.contains_key(&key) {
                return Ok(key);
            }
        }
        Err(StoreError::KeySpaceExhausted {
            attempts: MAX_KEY_ATTEMPTS,
        })
    }
}
