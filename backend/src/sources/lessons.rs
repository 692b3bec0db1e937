//! Scraped lesson record sources.
//!
//! The authenticated diary scraper lives outside this crate and plugs in
//! through [`LessonSource`].

use std::path::PathBuf;

use async_trait::async_trait;

use super::{SourceError, SourceResult};
use crate::error::ErrorContext;
use crate::models::RawLessonRecord;

/// Producer of raw lesson records, in scrape order.
#[async_trait]
pub trait LessonSource: Send + Sync {
    async fn lessons(&self) -> SourceResult<Vec<RawLessonRecord>>;

    fn name(&self) -> &'static str;
}

/// Reads a JSON array of lesson records from disk.
#[derive(Debug, Clone)]
pub struct FileLessonSource {
    path: PathBuf,
}

impl FileLessonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Decode a JSON array of records, reporting the failing element path.
pub fn parse_lesson_records(bytes: &[u8]) -> SourceResult<Vec<RawLessonRecord>> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut de).map_err(|e| {
        SourceError::parse(
            e.inner().to_string(),
            ErrorContext::new("parse_lessons")
                .with_entity("lessons")
                .with_details(format!("path={}", e.path())),
        )
    })
}

#[async_trait]
impl LessonSource for FileLessonSource {
    async fn lessons(&self) -> SourceResult<Vec<RawLessonRecord>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            SourceError::io(
                &e,
                ErrorContext::new("read_lessons").with_entity_id(self.path.display()),
            )
        })?;
        let records = parse_lesson_records(&bytes)?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "loaded lesson records");
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Placeholder used when no scraper or file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredLessonSource;

#[async_trait]
impl LessonSource for UnconfiguredLessonSource {
    async fn lessons(&self) -> SourceResult<Vec<RawLessonRecord>> {
        Err(SourceError::Unavailable(
            "no lesson source configured (set LESSONS_FILE)".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}
