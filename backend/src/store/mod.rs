//! Injected cache for the raw timetable document.
//!
//! The cache stores opaque bytes under string keys. Expiry is fixed when a
//! backend is constructed; an expired entry reads as a miss.

use async_trait::async_trait;

pub mod checksum;
pub mod error;
pub mod factory;
pub mod file;
pub mod memory;

pub use checksum::calculate_checksum;
pub use error::{StoreError, StoreResult};
pub use factory::{CacheFactory, CacheSettings, CacheType};
pub use file::FileCache;
pub use memory::MemoryCache;

/// Byte cache keyed by name.
#[async_trait]
pub trait BlobCache: Send + Sync {
    /// Cached bytes for `key`, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Drop `key`. Removing a missing key is not an error.
    async fn invalidate(&self, key: &str) -> StoreResult<()>;

    /// Backend name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl BlobCache for NoCache {
    async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _bytes: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
