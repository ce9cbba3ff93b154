//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "connected" or "disconnected"
    pub database: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    /// Version of the service
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness plus a record store probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Record store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probe = state.services.health.ping().await;

    let (status, database, error) = match probe {
        Ok(()) => (StatusCode::OK, "connected", None),
        Err(e) => {
            tracing::warn!(error = %e, "health probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "disconnected", Some(e.to_string()))
        }
    };

    let response = HealthResponse {
        status: if status.is_success() { "healthy" } else { "unhealthy" }.to_string(),
        database: database.to_string(),
        timestamp: Utc::now(),
        environment: state.config.server.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        error,
    };
    (status, Json(response))
}
