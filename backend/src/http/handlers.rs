//! HTTP handlers for the lesson-info API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::dto::{ClassQuery, HealthResponse, LessonInfoResponse};
use super::error::AppError;
use super::state::AppState;
use crate::models::RawLessonRecord;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Health check endpoint.
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timezone: state.service.zone().name().to_string(),
        cache: state.service.timetable().cache().name().to_string(),
        lesson_source: state.service.lesson_source().name().to_string(),
    })
}

fn resolve_class(state: &AppState, query: ClassQuery) -> Result<String, AppError> {
    match query.class {
        Some(class) if class.trim().is_empty() => {
            Err(AppError::BadRequest("class must not be empty".to_string()))
        }
        Some(class) => Ok(class.trim().to_string()),
        None => Ok(state.default_class.clone()),
    }
}

/// Scrape lessons and reconcile them with the class timetable.
///
/// GET /v1/lesson-info?class=5d
pub async fn get_lesson_info(
    State(state): State<AppState>,
    Query(query): Query<ClassQuery>,
) -> HandlerResult<LessonInfoResponse> {
    let class = resolve_class(&state, query)?;
    let info = state.service.lesson_info(&class, Utc::now()).await?;
    Ok(Json(LessonInfoResponse::new(class, info)))
}

/// Reconcile a caller-supplied record list.
///
/// POST /v1/reconcile?class=5d
pub async fn post_reconcile(
    State(state): State<AppState>,
    Query(query): Query<ClassQuery>,
    Json(records): Json<Vec<RawLessonRecord>>,
) -> HandlerResult<LessonInfoResponse> {
    let class = resolve_class(&state, query)?;
    tracing::debug!(class = %class, records = records.len(), "reconcile request");
    let info = state.service.reconcile(records, &class, Utc::now()).await?;
    Ok(Json(LessonInfoResponse::new(class, info)))
}

/// Drop the cached timetable so the next request downloads it again.
///
/// POST /v1/timetable/refresh
pub async fn refresh_timetable(State(state): State<AppState>) -> axum::http::StatusCode {
    state.service.timetable().invalidate().await;
    axum::http::StatusCode::NO_CONTENT
}
