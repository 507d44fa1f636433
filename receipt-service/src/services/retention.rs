//! Timed deletion of generated files.
//!
//! Each stored file gets a one-shot task that deletes it once the retention
//! window has passed. Tasks are not cancelled when the file is downloaded.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::services::Storage;

#[derive(Clone)]
pub struct RetentionScheduler {
    storage: Arc<dyn Storage>,
    window: Duration,
    pending: Arc<DashMap<String, DateTime<Utc>>>,
}

impl RetentionScheduler {
    pub fn new(storage: Arc<dyn Storage>, window: Duration) -> Self {
        Self {
            storage,
            window,
            pending: Arc::new(DashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `key` for deletion and return its expiry time.
    pub fn schedule(&self, key: impl Into<String>) -> DateTime<Utc> {
        let key = key.into();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.window).unwrap_or_else(|_| chrono::Duration::zero());
        self.pending.insert(key.clone(), expires_at);

        tracing::debug!(
            key = %key,
            expires_at = %expires_at.to_rfc3339(),
            "Receipt file scheduled for deletion"
        );

        let storage = self.storage.clone();
        let pending = self.pending.clone();
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            match storage.delete(&key).await {
                Ok(()) => {
                    counter!("receipt_files_expired_total").increment(1);
                    tracing::info!(key = %key, "Expired receipt file deleted");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to delete expired receipt file");
                }
            }
            pending.remove(&key);
        });

        expires_at
    }

    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.pending.get(key).map(|entry| *entry.value())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LocalStorage;

    #[tokio::test]
    async fn file_is_deleted_after_window() {
        let path = std::env::temp_dir().join(format!("receipt-retention-{}", uuid::Uuid::new_v4()));
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(&path).await.unwrap());
        storage.upload("r.pdf", b"%PDF".to_vec()).await.unwrap();

        let scheduler = RetentionScheduler::new(storage.clone(), Duration::from_millis(100));
        let expires_at = scheduler.schedule("r.pdf");
        assert_eq!(scheduler.expires_at("r.pdf"), Some(expires_at));
        assert!(storage.exists("r.pdf").await.unwrap());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(!storage.exists("r.pdf").await.unwrap());
        assert_eq!(scheduler.pending_count(), 0);
        let _ = tokio::fs::remove_dir_all(&path).await;
    }

    #[tokio::test]
    async fn deleting_already_removed_file_is_not_an_error() {
        let path = std::env::temp_dir().join(format!("receipt-retention-{}", uuid::Uuid::new_v4()));
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(&path).await.unwrap());
        storage.upload("gone.pdf", b"%PDF".to_vec()).await.unwrap();

        let scheduler = RetentionScheduler::new(storage.clone(), Duration::from_millis(50));
        scheduler.schedule("gone.pdf");
        storage.delete("gone.pdf").await.unwrap();

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(scheduler.pending_count(), 0);
        let _ = tokio::fs::remove_dir_all(&path).await;
    }
}
