//! HTTP router configuration.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1_routes = Router::new()
        .route("/lesson-info", get(handlers::get_lesson_info))
        .route("/reconcile", post(handlers::post_reconcile))
        .route("/timetable/refresh", post(handlers::refresh_timetable));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", v1_routes)
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
