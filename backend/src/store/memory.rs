//! In-process blob cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{BlobCache, StoreResult};

#[derive(Debug, Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    stored_at: DateTime<Utc>,
}

/// Blob cache held in memory, shared between clones.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Cache whose entries expire `ttl` after being stored; `None` never expires.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        match (now - entry.stored_at).to_std() {
            Ok(age) => age >= ttl,
            // Stored "in the future" after a clock step back.
            Err(_) => false,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl BlobCache for MemoryCache {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let now = Utc::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !self.is_expired(entry, now) => {
                    return Ok(Some(entry.bytes.to_vec()));
                }
                Some(_) => {}
            }
        }

        tracing::debug!(key, "memory cache entry expired");
        self.entries.write().remove(key);
        Ok(None)
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let entry = Entry {
            bytes: Arc::from(bytes),
            stored_at: Utc::now(),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MemoryCache::default();
        assert!(cache.get("schedule.json").await.unwrap().is_none());

        cache.put("schedule.json", b"{\"r\":{}}").await.unwrap();
        assert_eq!(
            cache.get("schedule.json").await.unwrap().as_deref(),
            Some(&b"{\"r\":{}}"[..])
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let cache = MemoryCache::default();
        cache.put("k", b"old").await.unwrap();
        cache.put("k", b"new").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().unwrap(), b"new".to_vec());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::default();
        cache.put("k", b"v").await.unwrap();
        cache.invalidate("k").await.unwrap();
        cache.invalidate("missing").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = MemoryCache::new(Some(Duration::from_millis(20)));
        cache.put("k", b"v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = MemoryCache::new(Some(Duration::from_secs(3600)));
        let other = cache.clone();
        cache.put("k", b"v").await.unwrap();
        assert!(other.get("k").await.unwrap().is_some());
    }
}
