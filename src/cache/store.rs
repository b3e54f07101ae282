//! Bounded Store Module
//!
//! Key/value store for small computed payloads, limited both in aggregate
//! byte size and in entry count, with age-based expiry.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::entry::Entry;

// == Store State ==
#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Running sum of all stored payload lengths
    current_bytes: usize,
}

impl Inner {
    /// Whether `len` more bytes fit, treating `key`'s current entry as released.
    fn can_insert(&self, key: &str, len: usize, max_bytes: usize, max_count: usize) -> bool {
        let (released_bytes, released_slot) = match self.entries.get(key) {
            Some(old) => (old.len(), 1),
            None => (0, 0),
        };

        self.current_bytes - released_bytes + len <= max_bytes
            && self.entries.len() - released_slot < max_count
    }

    fn sweep(&mut self, ttl: Duration) -> usize {
        let before = self.entries.len();
        let mut freed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(ttl) {
                freed += entry.len();
                false
            } else {
                true
            }
        });
        self.current_bytes -= freed;
        before - self.entries.len()
    }
}

// == Bounded Store ==
/// Thread-safe byte store with total size, entry count and TTL limits.
///
/// Expired entries are only removed by [`BoundedStore::expiration_sweep`],
/// which also runs once whenever an insert would exceed a limit.
#[derive(Debug)]
pub struct BoundedStore {
    inner: Mutex<Inner>,
    max_total_bytes: usize,
    max_count: usize,
    ttl: Duration,
}

impl BoundedStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `max_total_bytes` - Upper bound on the sum of all stored payload lengths
    /// * `max_count` - Upper bound on the number of entries
    /// * `ttl` - Age after which an entry becomes eligible for removal
    pub fn new(max_total_bytes: usize, max_count: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_total_bytes,
            max_count,
            ttl,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Returns `false` when the value does not fit even after an expiry sweep.
    /// Nothing is written in that case.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) -> bool {
        let key = key.into();
        let value = value.into();
        let mut inner = self.inner.lock();

        if !inner.can_insert(&key, value.len(), self.max_total_bytes, self.max_count) {
            let removed = inner.sweep(self.ttl);
            if removed > 0 {
                info!("Data store: swept {} expired entries to make room", removed);
            }
            if !inner.can_insert(&key, value.len(), self.max_total_bytes, self.max_count) {
                debug!(
                    "Data store: rejected {} bytes for key {} (at {} bytes, {} entries)",
                    value.len(),
                    key,
                    inner.current_bytes,
                    inner.entries.len()
                );
                return false;
            }
        }

        inner.current_bytes += value.len();
        if let Some(old) = inner.entries.insert(key, Entry::new(value)) {
            inner.current_bytes -= old.len();
        }
        true
    }

    // == Get ==
    /// Returns the value stored under `key`, or `None` if there is none.
    ///
    /// Does not refresh the entry's age and does not check expiry.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.lock().entries.get(key).map(|e| e.value.clone())
    }

    // == Expiration Sweep ==
    /// Removes every entry older than the TTL.
    ///
    /// Returns the number of entries removed.
    pub fn expiration_sweep(&self) -> usize {
        self.inner.lock().sweep(self.ttl)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Returns the sum of all stored payload lengths.
    pub fn byte_size(&self) -> usize {
        self.inner.lock().current_bytes
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_store_set_and_get() {
        let store = BoundedStore::new(1_000_000, 1, HOUR);

        assert!(store.set("key1", "value"));
        assert_eq!(store.get("key1").as_deref(), Some(&b"value"[..]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.byte_size(), 5);
    }

    #[test]
    fn test_store_get_missing_key() {
        let store = BoundedStore::new(1_000_000, 1, HOUR);

        assert!(store.get("key1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_empty_value_distinct_from_absent() {
        let store = BoundedStore::new(1_000_000, 10, HOUR);

        assert!(store.set("empty", Bytes::new()));
        assert_eq!(store.get("empty"), Some(Bytes::new()));
        assert_eq!(store.get("other"), None);
    }

    #[test]
    fn test_store_max_values() {
        let store = BoundedStore::new(1_000_000, 1, HOUR);

        assert!(store.set("key1", "value"));
        assert!(!store.set("key2", "value"));
        assert!(store.get("key2").is_none());
    }

    #[test]
    fn test_store_max_size() {
        let store = BoundedStore::new(2, 1, HOUR);

        assert!(!store.set("k1", "123"));
        assert!(store.set("k2", "12"));
        assert!(!store.set("k3", "1"));
        assert_eq!(store.byte_size(), 2);
    }

    #[test]
    fn test_store_overwrite_releases_old_bytes() {
        let store = BoundedStore::new(10, 1, HOUR);

        assert!(store.set("key", "12345678"));
        assert!(store.set("key", "abcdefghij"));
        assert_eq!(store.byte_size(), 10);
        assert_eq!(store.get("key").as_deref(), Some(&b"abcdefghij"[..]));

        assert!(store.set("key", "x"));
        assert_eq!(store.byte_size(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_rejected_overwrite_keeps_old_value() {
        let store = BoundedStore::new(4, 2, HOUR);

        assert!(store.set("key", "abcd"));
        assert!(!store.set("key", "abcde"));
        assert_eq!(store.get("key").as_deref(), Some(&b"abcd"[..]));
        assert_eq!(store.byte_size(), 4);
    }

    #[test]
    fn test_store_expiration() {
        let store = BoundedStore::new(1_000_000, 1, Duration::from_secs(1));

        assert!(store.set("key1", "value"));
        store.expiration_sweep();
        assert_eq!(store.get("key1").as_deref(), Some(&b"value"[..]));

        sleep(Duration::from_millis(1100));

        // Still readable until a sweep runs
        assert!(store.get("key1").is_some());
        assert_eq!(store.expiration_sweep(), 1);
        assert!(store.get("key1").is_none());
        assert_eq!(store.byte_size(), 0);
    }

    #[test]
    fn test_store_failed_insert_triggers_sweep() {
        let store = BoundedStore::new(1_000_000, 1, Duration::from_millis(100));

        assert!(store.set("old", "value"));
        sleep(Duration::from_millis(150));

        assert!(store.set("new", "value"));
        assert!(store.get("old").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_sweep_keeps_fresh_entries() {
        let store = BoundedStore::new(1_000_000, 10, HOUR);

        store.set("a", "1");
        store.set("b", "22");

        assert_eq!(store.expiration_sweep(), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.byte_size(), 3);
    }
}
