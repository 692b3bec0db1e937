//! Upstream data: the public timetable document and scraped lessons.

pub mod error;
pub mod lessons;
pub mod timetable;

pub use error::{SourceError, SourceResult};
pub use lessons::{parse_lesson_records, FileLessonSource, LessonSource, UnconfiguredLessonSource};
pub use timetable::{
    FileTimetableFetcher, HttpTimetableFetcher, LoadedTimetable, TimetableEndpoint,
    TimetableFetcher, TimetableOrigin, TimetableProvider, TIMETABLE_CACHE_KEY,
};
