/// Health check endpoint
///
/// `GET /health` reports liveness; when a database pool is attached it also
/// pings it, so orchestrators can tell "process up" from "ready to serve".
/// A failed ping degrades the response to 503 while still reporting the
/// body, so probes see which dependency is down.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded"
    pub status: &'static str,

    /// Database status: "ok", "unreachable", or "not_configured"
    pub database: &'static str,

    /// Service version
    pub version: &'static str,
}

/// Liveness/readiness probe
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = match &state.db {
        Some(pool) => match mentordesk_shared::db::health_check(pool).await {
            Ok(()) => (StatusCode::OK, "ok", "ok"),
            Err(e) => {
                tracing::warn!("Health check database ping failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
            }
        },
        None => (StatusCode::OK, "ok", "not_configured"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            version: mentordesk_shared::VERSION,
        }),
    )
}
