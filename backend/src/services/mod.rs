//! Occurrence generation, reconciliation and the pipeline that joins them.
//!
//! Everything below [`lesson_info`] is synchronous and does no I/O.

pub mod diagnostics;
pub mod disciplines;
pub mod lesson_info;
pub mod occurrences;
pub mod reconciler;
pub mod timetable_index;

pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use disciplines::{DisciplineTable, DEFAULT_DISCIPLINES};
pub use lesson_info::{LessonInfo, LessonInfoService, ServiceError, ServiceResult, WindowPolicy};
pub use occurrences::{OccurrenceGenerator, OccurrenceSet, Window};
pub use reconciler::{Reconciler, Reconciliation};
pub use timetable_index::TimetableIndex;
