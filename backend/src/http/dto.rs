//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ReconciledLesson;
use crate::services::{Diagnostic, LessonInfo};

/// `?class=` query parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassQuery {
    pub class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timezone: String,
    pub cache: String,
    pub lesson_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowDto {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Body of both lesson endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonInfoResponse {
    pub class: String,
    pub pass_id: String,
    pub lessons: Vec<ReconciledLesson>,
    pub diagnostics: Vec<Diagnostic>,
    pub timetable_checksum: String,
    pub window: WindowDto,
}

impl LessonInfoResponse {
    pub fn new(class: impl Into<String>, info: LessonInfo) -> Self {
        Self {
            class: class.into(),
            pass_id: info.pass_id,
            lessons: info.lessons,
            diagnostics: info.diagnostics,
            timetable_checksum: info.timetable_checksum,
            window: WindowDto {
                from: info.window_from,
                to: info.window_to,
            },
        }
    }
}
