//! HTTP API over the lesson-info pipeline.
//!
//! ```text
//! GET  /health
//! GET  /v1/lesson-info?class=5d    scraped lessons, reconciled
//! POST /v1/reconcile?class=5d      caller-supplied lessons, reconciled
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
