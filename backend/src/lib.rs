//! # dienynas
//!
//! Corrects the dates of lessons scraped from a school e-diary using the
//! public weekly timetable.
//!
//! The diary reports a lesson on a calendar day but not at a reliable time.
//! The timetable knows when each subject meets every week. This crate
//! expands the timetable into concrete occurrences over a rolling window,
//! matches each scraped record against them and attaches the upcoming
//! occurrences of the same subject.
//!
//! ## Architecture
//!
//! - [`models`]: Timetable rows, lesson records and civil-time helpers
//! - [`services`]: Occurrence generation, reconciliation and the pipeline service
//! - [`sources`]: Timetable download and lesson record sources
//! - [`store`]: Byte cache for the downloaded timetable
//! - [`collector`]: Parsers for the diary's lesson-info popup
//! - [`config`]: TOML and environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers

// ScheduleError carries an ErrorContext on every variant.
#![allow(clippy::result_large_err)]

pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;
pub mod store;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ErrorContext, ScheduleError, ScheduleResult};
