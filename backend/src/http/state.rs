//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::LessonInfoService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LessonInfoService>,
    /// Class used when a request does not name one.
    pub default_class: String,
    /// Request body limit for `POST /v1/reconcile`.
    pub body_limit: usize,
}

impl AppState {
    pub fn new(service: Arc<LessonInfoService>, default_class: impl Into<String>) -> Self {
        Self {
            service,
            default_class: default_class.into(),
            body_limit: 2 * 1024 * 1024,
        }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }
}
