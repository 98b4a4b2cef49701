use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::error;

use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthError {
    pub status: &'static str,
    pub error: String,
}

/// GET /api/health
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.stats.health().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => {
            metrics::counter!("stats.api.errors_total").increment(1);
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthError {
                    status: "error",
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /metrics, Prometheus text format
pub async fn get_metrics() -> impl IntoResponse {
    match crate::metrics::render() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics recorder not installed").into_response(),
    }
}
