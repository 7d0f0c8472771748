// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::config::AppState;

// Liveness + alcance do banco
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Servidor e banco OK"),
        (status = 500, description = "Banco inacessível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&app_state.db_pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "database": "connected",
                "timestamp": Utc::now(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check falhou: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "ERROR",
                    "database": "disconnected",
                    "timestamp": Utc::now(),
                })),
            )
        }
    }
}
