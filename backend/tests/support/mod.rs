#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Vilnius;

use dienynas::services::LessonInfoService;
use dienynas::sources::{FileLessonSource, FileTimetableFetcher, LessonSource, TimetableProvider};
use dienynas::store::{BlobCache, MemoryCache};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Variables are restored on unwind, and callers are serialized since the
/// environment is process-global.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }
        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Tuesday 2024-09-10 12:00 in Vilnius, inside the fixture's first school week.
pub fn fixed_now() -> DateTime<Utc> {
    Vilnius
        .with_ymd_and_hms(2024, 9, 10, 12, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn fixture_provider(cache: Arc<dyn BlobCache>) -> Arc<TimetableProvider> {
    Arc::new(TimetableProvider::new(
        Arc::new(FileTimetableFetcher::new(fixture("timetable.json"))),
        cache,
    ))
}

/// Service over the fixture timetable with the given lesson source.
pub fn service_with(lessons: Arc<dyn LessonSource>) -> LessonInfoService {
    LessonInfoService::new(fixture_provider(Arc::new(MemoryCache::new(None))), lessons)
}

/// Service over both fixture files.
pub fn fixture_service() -> LessonInfoService {
    service_with(Arc::new(FileLessonSource::new(fixture("lessons.json"))))
}
