//! Timetable document retrieval.
//!
//! [`TimetableProvider`] puts an injected [`BlobCache`] in front of a
//! [`TimetableFetcher`]. Only bytes that pass the validating decode are
//! cached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;

use super::{SourceError, SourceResult};
use crate::error::ErrorContext;
use crate::models::Timetable;
use crate::store::{calculate_checksum, BlobCache};

/// Public timetable endpoint.
pub const DEFAULT_TIMETABLE_URL: &str =
    "https://vjg.edupage.org/timetable/server/regulartt.js?__func=regularttGetData";

/// Timetable number requested from the endpoint.
pub const DEFAULT_TIMETABLE_NUMBER: &str = "48";

/// Cache key of the raw document.
pub const TIMETABLE_CACHE_KEY: &str = "schedule.json";

/// Source of raw timetable document bytes.
#[async_trait]
pub trait TimetableFetcher: Send + Sync {
    async fn fetch(&self) -> SourceResult<Vec<u8>>;

    fn describe(&self) -> String;
}

/// Where and how to download the timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEndpoint {
    pub url: String,
    pub timetable_number: String,
    pub timeout: Duration,
}

impl Default for TimetableEndpoint {
    fn default() -> Self {
        Self {
            url: DEFAULT_TIMETABLE_URL.to_string(),
            timetable_number: DEFAULT_TIMETABLE_NUMBER.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl TimetableEndpoint {
    /// JSON body of the `regularttGetData` call.
    pub fn request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "__args": [null, self.timetable_number],
            "__gsh": "00000000",
        })
    }
}

/// Downloads the document over HTTP.
pub struct HttpTimetableFetcher {
    client: reqwest::Client,
    endpoint: TimetableEndpoint,
}

impl HttpTimetableFetcher {
    pub fn new(endpoint: TimetableEndpoint) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .connect_timeout(Duration::from_secs(40))
            .build()
            .map_err(|e| {
                SourceError::fetch(
                    format!("failed to build HTTP client: {e}"),
                    ErrorContext::new("build_client"),
                )
            })?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &TimetableEndpoint {
        &self.endpoint
    }
}

/// Browser-like agent string; the endpoint rejects bare clients.
fn browser_user_agent() -> String {
    format!("Mozilla/5.0 ({})", uuid::Uuid::new_v4())
}

#[async_trait]
impl TimetableFetcher for HttpTimetableFetcher {
    async fn fetch(&self) -> SourceResult<Vec<u8>> {
        tracing::info!(url = %self.endpoint.url, "downloading timetable");
        let response = self
            .client
            .post(&self.endpoint.url)
            .header(USER_AGENT, browser_user_agent())
            .header(CONTENT_TYPE, "application/json")
            .body(self.endpoint.request_body().to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::fetch(
                format!("timetable endpoint returned {status}"),
                ErrorContext::new("fetch_timetable").with_details(format!("url={}", self.endpoint.url)),
            ));
        }

        let bytes = response.bytes().await?;
        tracing::info!(bytes = bytes.len(), "timetable download complete");
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.endpoint.url.clone()
    }
}

/// Reads the document from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileTimetableFetcher {
    path: PathBuf,
}

impl FileTimetableFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TimetableFetcher for FileTimetableFetcher {
    async fn fetch(&self) -> SourceResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            SourceError::io(
                &e,
                ErrorContext::new("read_timetable").with_entity_id(self.path.display()),
            )
        })
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// Where a loaded timetable came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimetableOrigin {
    Cache,
    Upstream,
}

/// A decoded timetable and the checksum of the bytes it came from.
#[derive(Debug, Clone)]
pub struct LoadedTimetable {
    pub timetable: Timetable,
    pub checksum: String,
    pub origin: TimetableOrigin,
}

/// Cache-fronted timetable loader.
pub struct TimetableProvider {
    fetcher: Arc<dyn TimetableFetcher>,
    cache: Arc<dyn BlobCache>,
    // Serializes downloads so concurrent misses fetch once.
    refresh: tokio::sync::Mutex<()>,
}

impl TimetableProvider {
    pub fn new(fetcher: Arc<dyn TimetableFetcher>, cache: Arc<dyn BlobCache>) -> Self {
        Self {
            fetcher,
            cache,
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<dyn BlobCache> {
        &self.cache
    }

    /// Load the timetable, preferring a valid cached copy.
    pub async fn load(&self) -> SourceResult<LoadedTimetable> {
        if let Some(loaded) = self.from_cache().await {
            return Ok(loaded);
        }

        let _guard = self.refresh.lock().await;
        if let Some(loaded) = self.from_cache().await {
            return Ok(loaded);
        }

        let bytes = self.fetcher.fetch().await?;
        let timetable = Timetable::from_slice(&bytes)?;
        if let Err(e) = self.cache.put(TIMETABLE_CACHE_KEY, &bytes).await {
            tracing::warn!(error = %e, backend = self.cache.name(), "failed to cache timetable");
        }

        Ok(LoadedTimetable {
            timetable,
            checksum: calculate_checksum(&bytes),
            origin: TimetableOrigin::Upstream,
        })
    }

    /// Drop the cached document so the next load fetches.
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.invalidate(TIMETABLE_CACHE_KEY).await {
            tracing::warn!(error = %e, backend = self.cache.name(), "failed to invalidate timetable cache");
        }
    }

    async fn from_cache(&self) -> Option<LoadedTimetable> {
        let bytes = match self.cache.get(TIMETABLE_CACHE_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, backend = self.cache.name(), "timetable cache read failed");
                return None;
            }
        };

        match Timetable::from_slice(&bytes) {
            Ok(timetable) => {
                tracing::debug!(backend = self.cache.name(), "timetable served from cache");
                Some(LoadedTimetable {
                    timetable,
                    checksum: calculate_checksum(&bytes),
                    origin: TimetableOrigin::Cache,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "cached timetable is invalid, refetching");
                self.invalidate().await;
                None
            }
        }
    }
}
