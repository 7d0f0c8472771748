// src/handlers/qr.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::Envelope,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        json::AppJson,
        rbac::{DriverRole, RequireRole},
    },
    models::qr::{QrScan, ScanOutcome, ScanPayload},
};

// ---
// Handler: scan (motorista)
// ---
#[utoipa::path(
    post,
    path = "/api/qr/scan",
    tag = "QR",
    request_body = ScanPayload,
    responses(
        (status = 201, description = "Leitura registrada e status aplicado", body = ScanOutcome),
        (status = 400, description = "Sem GPS (require_gps)"),
        (status = 403, description = "Remessa de outro motorista"),
        (status = 404, description = "Remessa não encontrada"),
        (status = 409, description = "Transição não permitida (invalidTransition)")
    ),
    security(("api_jwt" = []))
)]
pub async fn scan(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<DriverRole>,
    AppJson(payload): AppJson<ScanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .qr_service
        .scan(guard.user.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "scan_recorded"),
            outcome,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/qr/scans/{shipment_id}",
    tag = "QR",
    params(("shipment_id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "Leituras da remessa (mais recente primeiro)", body = Vec<QrScan>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_scans(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(shipment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let scans = app_state
        .qr_service
        .list_scans(shipment_id, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "scans": scans }))))
}
