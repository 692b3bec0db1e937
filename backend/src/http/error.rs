//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, ScheduleError};
use crate::services::ServiceError;
use crate::sources::SourceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn with_context(self, context: &ErrorContext) -> Self {
        let rendered = context.to_string();
        if rendered.is_empty() {
            self
        } else {
            self.with_details(rendered)
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Pipeline failure
    Service(ServiceError),
}

fn schedule_status(err: &ScheduleError) -> StatusCode {
    match err {
        ScheduleError::ClassNotFound { .. } => StatusCode::NOT_FOUND,
        ScheduleError::InvalidTimezone { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ScheduleError::InvalidWeekdayMask { .. }
        | ScheduleError::TimeParse { .. }
        | ScheduleError::SubjectNotFound { .. }
        | ScheduleError::PeriodNotFound { .. }
        | ScheduleError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn schedule_response(err: &ScheduleError) -> (StatusCode, ApiError) {
    let message = match err {
        ScheduleError::ClassNotFound { class, .. } => format!("Class not found: {class}"),
        other => other.to_string().trim_end().to_string(),
    };
    (
        schedule_status(err),
        ApiError::new(err.code(), message).with_context(err.context()),
    )
}

fn source_response(err: &SourceError) -> (StatusCode, ApiError) {
    match err {
        SourceError::Decode(e) => schedule_response(e),
        SourceError::Unavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new(err.code(), msg.clone()),
        ),
        SourceError::Fetch { message, context }
        | SourceError::Parse { message, context }
        | SourceError::Io { message, context } => (
            StatusCode::BAD_GATEWAY,
            ApiError::new(err.code(), message.clone()).with_context(context),
        ),
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg.clone()))
            }
            AppError::Service(ServiceError::Schedule(e)) => schedule_response(e),
            AppError::Service(ServiceError::Source(e)) => source_response(e),
            AppError::Service(err @ ServiceError::Timeout(_)) => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::new("UPSTREAM_TIMEOUT", err.to_string()),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code = %error.code, message = %error.message, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), code = %error.code, message = %error.message, "request rejected");
        }
        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}
