//! End-to-end runs of the lesson-info pipeline over fixture files.

mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use dienynas::models::{LessonDate, RawLessonRecord};
use dienynas::services::{Diagnostic, LessonInfoService, ServiceError};
use dienynas::sources::{
    FileLessonSource, FileTimetableFetcher, LessonSource, SourceError, SourceResult,
    TimetableProvider,
};
use dienynas::store::{calculate_checksum, MemoryCache, NoCache};

use support::{fixed_now, fixture, fixture_service, service_with};

fn rfc3339(date: &LessonDate) -> String {
    match date {
        LessonDate::Scheduled(at) => at.to_rfc3339(),
        LessonDate::Provisional(day) => day.to_string(),
    }
}

struct SlowSource(Duration);

#[async_trait]
impl LessonSource for SlowSource {
    async fn lessons(&self) -> SourceResult<Vec<RawLessonRecord>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test]
async fn test_fixture_lessons_are_reconciled() {
    let service = fixture_service();
    let info = service.lesson_info("5d", fixed_now()).await.unwrap();

    let summary: Vec<(&str, String)> = info
        .lessons
        .iter()
        .map(|l| (l.discipline.as_str(), rfc3339(&l.day)))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Šokis", "2024-09-06".to_string()),
            ("Lietuvių k.", "2024-09-04T09:00:00+03:00".to_string()),
            ("Tikyba", "2024-09-09T08:00:00+03:00".to_string()),
            ("Matematika", "2024-09-03T10:00:00+03:00".to_string()),
            ("Matematika", "2024-09-03T11:00:00+03:00".to_string()),
        ]
    );

    // Scraped fields ride along untouched.
    let first_math = &info.lessons[3];
    assert_eq!(first_math.mark.as_deref(), Some("9"));
    assert_eq!(first_math.topic, "Natūralieji skaičiai");
    assert_eq!(info.lessons[1].teacher, "Jonaš Jonaitiš");

    let next: Vec<String> = first_math.next_dates.iter().map(|d| d.to_rfc3339()).collect();
    assert_eq!(
        next,
        vec!["2024-09-17T10:00:00+03:00", "2024-09-17T11:00:00+03:00"]
    );

    assert_eq!(
        info.diagnostics,
        vec![Diagnostic::DisciplineUnmatched {
            day: NaiveDate::from_ymd_opt(2024, 9, 6).unwrap(),
            discipline: "Šokis".into(),
            records: 1,
        }]
    );
    assert_eq!(
        info.timetable_checksum,
        calculate_checksum(&std::fs::read(fixture("timetable.json")).unwrap())
    );
    assert_eq!(info.window_to - info.window_from, chrono::Duration::days(30));
}

#[tokio::test]
async fn test_timetable_is_cached_between_passes() {
    let service = fixture_service();
    let first = service.lesson_info("5d", fixed_now()).await.unwrap();
    let second = service.lesson_info("5d", fixed_now()).await.unwrap();

    assert_eq!(first.lessons, second.lessons);
    assert_eq!(first.timetable_checksum, second.timetable_checksum);
    assert_ne!(first.pass_id, second.pass_id);
}

#[tokio::test]
async fn test_unknown_class() {
    let err = fixture_service()
        .lesson_info("9z", fixed_now())
        .await
        .unwrap_err();
    assert_eq!(
        err.as_schedule_error().map(|e| e.code()),
        Some("CLASS_NOT_FOUND")
    );
}

#[tokio::test]
async fn test_slow_source_hits_deadline() {
    let service = service_with(Arc::new(SlowSource(Duration::from_secs(10))))
        .with_fetch_deadline(Duration::from_millis(50));
    let err = service.lesson_info("5d", fixed_now()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Timeout(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn test_missing_lessons_file() {
    let service = service_with(Arc::new(FileLessonSource::new(fixture("absent.json"))));
    let err = service.lesson_info("5d", fixed_now()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Source(SourceError::Io { .. })));
}

#[tokio::test]
async fn test_broken_timetable_is_a_decode_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("timetable.json");
    std::fs::write(&path, br#"{"r": {}}"#).unwrap();

    let cache = Arc::new(MemoryCache::new(None));
    let provider = Arc::new(TimetableProvider::new(
        Arc::new(FileTimetableFetcher::new(&path)),
        cache.clone(),
    ));
    let service = LessonInfoService::new(
        provider,
        Arc::new(FileLessonSource::new(fixture("lessons.json"))),
    );

    let err = service.lesson_info("5d", fixed_now()).await.unwrap_err();
    assert_eq!(err.as_schedule_error().map(|e| e.code()), Some("DECODE_ERROR"));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_reconcile_supplied_records_for_other_class() {
    let provider = support::fixture_provider(Arc::new(NoCache));
    let service = LessonInfoService::new(provider, Arc::new(FileLessonSource::new("unused")));

    let records = vec![
        RawLessonRecord::new("Matematika", NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()),
        // 6a's timetable spells the subject "Tikyba", the diary uses the long name.
        RawLessonRecord::new(
            "Dorinis ugdymas (tikyba)",
            NaiveDate::from_ymd_opt(2024, 9, 6).unwrap(),
        ),
    ];
    let info = service.reconcile(records, "6a", fixed_now()).await.unwrap();

    let tikyba = info
        .lessons
        .iter()
        .find(|l| l.discipline == "Dorinis ugdymas (tikyba)")
        .unwrap();
    assert_eq!(rfc3339(&tikyba.day), "2024-09-06T08:00:00+03:00");
    assert_eq!(
        tikyba.next_dates.first().map(|d| d.to_rfc3339()),
        Some("2024-09-13T08:00:00+03:00".to_string())
    );

    let math = info
        .lessons
        .iter()
        .find(|l| l.discipline == "Matematika")
        .unwrap();
    assert_eq!(rfc3339(&math.day), "2024-09-03T10:00:00+03:00");
    assert!(info.diagnostics.is_empty());
}
