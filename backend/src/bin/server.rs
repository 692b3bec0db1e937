//! dienynas HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: memory cache, live timetable, class 5d
//! cargo run --bin dienynas-server
//!
//! # Offline, from exported files
//! TIMETABLE_FILE=./timetable.json LESSONS_FILE=./lessons.json \
//!   cargo run --bin dienynas-server
//! ```
//!
//! # Environment Variables
//!
//! - `DIENYNAS_CONFIG`: Path to a TOML config file (default: `dienynas.toml` if present)
//! - `HOST`, `PORT`: Bind address (default: 0.0.0.0:8080)
//! - `CLASS_ID`, `TIMEZONE`: Default class and civil timezone
//! - `CACHE_TYPE`, `CACHE_DIR`, `CACHE_TTL_SECS`: Timetable cache backend
//! - `TIMETABLE_URL`, `TIMETABLE_FILE`, `LESSONS_FILE`: Upstream sources
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dienynas::config::AppConfig;
use dienynas::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting dienynas HTTP server");

    let config = AppConfig::load()?;
    let service = config.build_service()?;
    info!(
        class = %config.schedule.class_id,
        timezone = %service.zone(),
        "Lesson-info service initialized"
    );

    let state = AppState::new(Arc::new(service), config.schedule.class_id.clone())
        .with_body_limit(config.server.body_limit_bytes);
    let app = create_router(state);

    let addr = config.socket_addr()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
