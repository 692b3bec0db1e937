//! Blob cache backed by a directory of files.
//!
//! Expiry is judged from the file's modification time, so entries survive
//! restarts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use super::{BlobCache, StoreError, StoreResult};
use crate::error::ErrorContext;

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        match (self.ttl, SystemTime::now().duration_since(modified)) {
            (Some(ttl), Ok(age)) => age >= ttl,
            _ => false,
        }
    }
}

/// Map a key onto a single safe file name.
fn file_name_for(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() || name.starts_with('.') {
        name.insert(0, '_');
    }
    name
}

fn io_error(source: std::io::Error, operation: &str, key: &str) -> StoreError {
    StoreError::io(
        source,
        ErrorContext::new(operation)
            .with_entity("file_cache")
            .with_entity_id(key),
    )
}

#[async_trait]
impl BlobCache for FileCache {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e, "get", key)),
        };

        let modified = metadata.modified().map_err(|e| io_error(e, "get", key))?;
        if self.is_expired(modified) {
            tracing::debug!(key, path = %path.display(), "file cache entry expired");
            return Ok(None);
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e, "get", key)),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(e, "put", key))?;

        // Write then rename so readers never see a partial blob.
        let path = self.path_for(key);
        let staging = self
            .dir
            .join(format!("{}.{}.tmp", file_name_for(key), uuid::Uuid::new_v4()));
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| io_error(e, "put", key))?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error(e, "put", key));
        }
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e, "invalidate", key)),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
