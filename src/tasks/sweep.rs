//! Store Sweep Task
//!
//! Background task that periodically removes expired entries from both stores.
//! The stores also sweep on their own when an insert would not fit; this task
//! only keeps memory from lingering between inserts.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{BoundedStore, ImageStore};

/// Spawns a task that sweeps `data_store` and `image_store` every
/// `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_sweep_task(
    data_store: Arc<BoundedStore>,
    image_store: Arc<ImageStore>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting store sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let data_removed = data_store.expiration_sweep();
            let images_removed = image_store.evict();

            if data_removed + images_removed > 0 {
                info!(
                    "Store sweep: removed {} metadata entries and {} images",
                    data_removed, images_removed
                );
            } else {
                debug!("Store sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let data = Arc::new(BoundedStore::new(1000, 10, Duration::from_millis(500)));
        let images = Arc::new(ImageStore::new(1000, 100, 10, Duration::from_millis(500)));

        data.set("expire_soon", "value");
        let key = images.add("png").unwrap();

        let handle = spawn_sweep_task(data.clone(), images.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(data.get("expire_soon").is_none(), "Expired entry should have been swept");
        assert!(images.get(&key).is_none(), "Expired image should have been evicted");

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_live_entries() {
        let data = Arc::new(BoundedStore::new(1000, 10, Duration::from_secs(3600)));
        let images = Arc::new(ImageStore::new(1000, 100, 10, Duration::from_secs(3600)));

        data.set("long_lived", "value");

        let handle = spawn_sweep_task(data.clone(), images, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(data.get("long_lived").as_deref(), Some(&b"value"[..]));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let data = Arc::new(BoundedStore::new(1000, 10, Duration::from_secs(1)));
        let images = Arc::new(ImageStore::new(1000, 100, 10, Duration::from_secs(1)));

        let handle = spawn_sweep_task(data, images, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
