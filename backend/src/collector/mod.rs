//! Parsers for diary payloads.
//!
//! Logging in and scraping the marks table happen outside this crate. A
//! scraper implementing [`crate::sources::LessonSource`] builds its records
//! from these pieces: it reads the lesson id out of each cell's `onclick`
//! with [`parse_lesson_info_command`], fetches the popup, and merges the
//! result of [`parse_lesson_info_response`] into the record with
//! [`crate::models::RawLessonRecord::apply_details`].

pub mod lesson_info;

pub use lesson_info::{parse_lesson_info_command, parse_lesson_info_response};
