/// Health check and metrics endpoints
///
/// Liveness answers as long as the process can respond; readiness also
/// probes the moderation database when one is configured.

use crate::{context::AppContext, db, metrics};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/live", get(health_basic))
        .route("/health/ready", get(readiness_probe))
        .route("/metrics", get(metrics_endpoint))
}

/// Basic health check
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe
///
/// Returns 503 when the moderation database does not answer. The ban
/// check would still fail open in that state, so this is the signal that
/// enforcement is currently off.
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if let Some(pool) = &ctx.db {
        if let Err(e) = db::test_connection(pool).await {
            tracing::warn!(error = %e, "readiness_probe_failed: database check failed");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    let store = if ctx.db.is_some() { "sqlite" } else { "memory" };

    Ok(Json(serde_json::json!({
        "status": "ready",
        "store": store,
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// Prometheus text exposition
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}
