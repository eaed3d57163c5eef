use axum::Json;

use crate::models::HealthResponse;

/// Health check
/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "Document portal backend is running".to_string(),
    })
}
