//! The lesson-info pipeline: fetch both upstreams, generate occurrences for
//! the configured window, reconcile.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::diagnostics::Diagnostic;
use super::disciplines::DisciplineTable;
use super::occurrences::{OccurrenceGenerator, Window};
use super::reconciler::Reconciler;
use super::timetable_index::TimetableIndex;
use crate::error::ScheduleError;
use crate::models::{CivilZone, RawLessonRecord, ReconciledLesson};
use crate::sources::{LessonSource, LoadedTimetable, SourceError, TimetableProvider};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Source(#[from] SourceError),

    /// The upstream fetches did not finish before the deadline.
    #[error("Upstream fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    /// The schedule error behind this failure, including one raised while
    /// decoding fetched timetable bytes.
    pub fn as_schedule_error(&self) -> Option<&ScheduleError> {
        match self {
            Self::Schedule(e) | Self::Source(SourceError::Decode(e)) => Some(e),
            _ => None,
        }
    }
}

/// Occurrence window relative to the request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Window width, counted back from its end.
    pub back: chrono::Duration,
    /// How far past now the window ends.
    pub ahead: chrono::Duration,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            back: chrono::Duration::days(30),
            ahead: chrono::Duration::days(7),
        }
    }
}

impl WindowPolicy {
    pub fn window(&self, now: DateTime<Utc>) -> Window {
        Window::around(now, self.back, self.ahead)
    }
}

/// Reconciled lessons plus everything a caller needs to audit them.
#[derive(Debug, Clone, Serialize)]
pub struct LessonInfo {
    pub pass_id: String,
    pub lessons: Vec<ReconciledLesson>,
    pub diagnostics: Vec<Diagnostic>,
    pub timetable_checksum: String,
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
}

pub struct LessonInfoService {
    timetable: Arc<TimetableProvider>,
    lessons: Arc<dyn LessonSource>,
    disciplines: DisciplineTable,
    generator: OccurrenceGenerator,
    window: WindowPolicy,
    fetch_deadline: Duration,
}

impl LessonInfoService {
    pub const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(60);

    pub fn new(timetable: Arc<TimetableProvider>, lessons: Arc<dyn LessonSource>) -> Self {
        Self {
            timetable,
            lessons,
            disciplines: DisciplineTable::default(),
            generator: OccurrenceGenerator::default(),
            window: WindowPolicy::default(),
            fetch_deadline: Self::DEFAULT_FETCH_DEADLINE,
        }
    }

    pub fn with_disciplines(mut self, disciplines: DisciplineTable) -> Self {
        self.disciplines = disciplines;
        self
    }

    pub fn with_zone(mut self, zone: CivilZone) -> Self {
        self.generator = OccurrenceGenerator::new(zone);
        self
    }

    pub fn with_window(mut self, window: WindowPolicy) -> Self {
        self.window = window;
        self
    }

    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    pub fn zone(&self) -> CivilZone {
        self.generator.zone()
    }

    pub fn lesson_source(&self) -> &dyn LessonSource {
        self.lessons.as_ref()
    }

    pub fn timetable(&self) -> &TimetableProvider {
        &self.timetable
    }

    /// Fetch lessons and timetable concurrently, then reconcile.
    pub async fn lesson_info(&self, class: &str, now: DateTime<Utc>) -> ServiceResult<LessonInfo> {
        let fetch = async { tokio::try_join!(self.lessons.lessons(), self.timetable.load()) };
        let (records, loaded) = tokio::time::timeout(self.fetch_deadline, fetch)
            .await
            .map_err(|_| ServiceError::Timeout(self.fetch_deadline))??;

        tracing::info!(
            class,
            source = self.lessons.name(),
            records = records.len(),
            origin = ?loaded.origin,
            "upstream data ready"
        );
        self.run(records, &loaded, class, now)
    }

    /// Reconcile caller-supplied records against the timetable.
    pub async fn reconcile(
        &self,
        records: Vec<RawLessonRecord>,
        class: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<LessonInfo> {
        let loaded = tokio::time::timeout(self.fetch_deadline, self.timetable.load())
            .await
            .map_err(|_| ServiceError::Timeout(self.fetch_deadline))??;
        self.run(records, &loaded, class, now)
    }

    fn run(
        &self,
        records: Vec<RawLessonRecord>,
        loaded: &LoadedTimetable,
        class: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<LessonInfo> {
        let index = TimetableIndex::new(&loaded.timetable);
        let window = self.window.window(now);
        let sets = self
            .generator
            .class_occurrences(&index, class, &window, now)?;
        let reconciliation = Reconciler::new(&self.disciplines, now).reconcile(records, &sets);

        Ok(LessonInfo {
            pass_id: reconciliation.pass_id,
            lessons: reconciliation.lessons,
            diagnostics: reconciliation.diagnostics,
            timetable_checksum: loaded.checksum.clone(),
            window_from: window.from,
            window_to: window.to,
        })
    }
}
