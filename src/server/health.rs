//! Health check endpoint for liveness probes.
//!
//! Served in both active and inert modes, so orchestration can tell "bot
//! process up" apart from "bot activated".

use axum::http::StatusCode;

/// Returns 200 OK with the text "OK".
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
