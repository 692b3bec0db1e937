//! Cache backend selection.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::{BlobCache, FileCache, MemoryCache, NoCache, StoreError, StoreResult};

/// Cache backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// Process memory, lost on restart
    #[default]
    Memory,
    /// One file per key in a directory
    File,
    /// Never stores; every lookup fetches
    None,
}

impl FromStr for CacheType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "fs" => Ok(Self::File),
            "none" | "off" | "disabled" => Ok(Self::None),
            _ => Err(format!("Unknown cache type: {}", s)),
        }
    }
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::None => "none",
        }
    }
}

/// Everything needed to build a cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub cache_type: CacheType,
    /// Directory for [`CacheType::File`].
    pub dir: Option<PathBuf>,
    pub ttl: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Memory,
            dir: None,
            ttl: Some(Duration::from_secs(3600)),
        }
    }
}

pub struct CacheFactory;

impl CacheFactory {
    /// Build the configured backend.
    ///
    /// A file cache without a directory is a configuration error.
    pub fn create(settings: &CacheSettings) -> StoreResult<Arc<dyn BlobCache>> {
        let cache: Arc<dyn BlobCache> = match settings.cache_type {
            CacheType::Memory => Arc::new(MemoryCache::new(settings.ttl)),
            CacheType::File => {
                let dir = settings.dir.clone().ok_or_else(|| {
                    StoreError::configuration("File cache requires a cache directory")
                })?;
                Arc::new(FileCache::new(dir, settings.ttl))
            }
            CacheType::None => Arc::new(NoCache),
        };

        tracing::info!(
            backend = cache.name(),
            ttl_secs = settings.ttl.map(|t| t.as_secs()),
            "timetable cache ready"
        );
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!("memory".parse::<CacheType>().unwrap(), CacheType::Memory);
        assert_eq!("FILE".parse::<CacheType>().unwrap(), CacheType::File);
        assert_eq!(" none ".parse::<CacheType>().unwrap(), CacheType::None);
        assert!("redis".parse::<CacheType>().is_err());
    }

    #[test]
    fn test_create_each_backend() {
        let memory = CacheFactory::create(&CacheSettings::default()).unwrap();
        assert_eq!(memory.name(), "memory");

        let none = CacheFactory::create(&CacheSettings {
            cache_type: CacheType::None,
            ..CacheSettings::default()
        })
        .unwrap();
        assert_eq!(none.name(), "none");

        let dir = tempfile::TempDir::new().unwrap();
        let file = CacheFactory::create(&CacheSettings {
            cache_type: CacheType::File,
            dir: Some(dir.path().to_path_buf()),
            ttl: None,
        })
        .unwrap();
        assert_eq!(file.name(), "file");
    }

    #[test]
    fn test_file_cache_requires_directory() {
        let result = CacheFactory::create(&CacheSettings {
            cache_type: CacheType::File,
            dir: None,
            ttl: None,
        });
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }
}
