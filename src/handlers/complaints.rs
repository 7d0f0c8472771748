// src/handlers/complaints.rs

use axum::{
    extract::{Path, Query, State},
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
        rbac::{AdminRoles, RequireRole},
    },
    models::complaint::{
        Complaint, ComplaintChanges, ComplaintListItem, ComplaintListQuery, CreateComplaintPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/complaints",
    tag = "Complaints",
    request_body = CreateComplaintPayload,
    responses(
        (status = 201, description = "Reclamação aberta", body = Complaint),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Remessa de outra pessoa"),
        (status = 404, description = "Remessa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_complaint(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<CreateComplaintPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let complaint = app_state
        .complaint_service
        .create(user.id, user.role, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "complaint_created"),
            json!({ "complaint": complaint }),
        )),
    ))
}

// Fila de triagem do painel
#[utoipa::path(
    get,
    path = "/api/complaints",
    tag = "Complaints",
    params(ComplaintListQuery),
    responses(
        (status = 200, description = "urgent > high > medium > low; empate pelo mais recente", body = Vec<ComplaintListItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_complaints(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
    Query(query): Query<ComplaintListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let complaints = app_state
        .complaint_service
        .list_triage(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "complaints": complaints }))))
}

#[utoipa::path(
    get,
    path = "/api/complaints/mine",
    tag = "Complaints",
    responses(
        (status = 200, description = "Reclamações do próprio usuário", body = Vec<Complaint>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_complaints(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let complaints = app_state
        .complaint_service
        .list_mine(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "complaints": complaints }))))
}

#[utoipa::path(
    put,
    path = "/api/complaints/{id}",
    tag = "Complaints",
    params(("id" = Uuid, Path, description = "ID da reclamação")),
    request_body = ComplaintChanges,
    responses(
        (status = 200, description = "Reclamação atualizada", body = Complaint),
        (status = 400, description = "Responsável não é admin"),
        (status = 404, description = "Reclamação ou responsável não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_complaint(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
    Path(id): Path<Uuid>,
    AppJson(changes): AppJson<ComplaintChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let complaint = app_state
        .complaint_service
        .update(id, &changes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "complaint_updated"),
        json!({ "complaint": complaint }),
    )))
}
