use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub vector_store: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK".into(),
    })
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    match state.vector_store.health_check().await {
        Ok(()) => Ok(Json(ReadinessResponse {
            status: "ready".into(),
            vector_store: "connected".into(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Vector store health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".into(),
                    vector_store: "disconnected".into(),
                }),
            ))
        }
    }
}
