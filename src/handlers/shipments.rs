// src/handlers/shipments.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
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
        rbac::{AdminRoles, ClientOrAdmin, DriverOrAdmin, RequireRole},
    },
    models::shipment::{
        AssignDriverPayload, CreateShipmentPayload, Shipment, ShipmentListItem, ShipmentListQuery,
        StatusHistoryEntry, UpdateStatusPayload,
    },
};

// ---
// Handler: create_shipment (cliente ou admin)
// ---
#[utoipa::path(
    post,
    path = "/api/shipments",
    tag = "Shipments",
    request_body = CreateShipmentPayload,
    responses(
        (status = 201, description = "Remessa criada com número de rastreio e QR", body = Shipment),
        (status = 400, description = "Dados inválidos / cliente ausente / motorista inapto")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ClientOrAdmin>,
    AppJson(payload): AppJson<CreateShipmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let shipment = app_state
        .shipment_service
        .create(guard.user.id, guard.user.role, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "shipment_created"),
            json!({ "shipment": shipment }),
        )),
    ))
}

// ---
// Handler: list_shipments (escopo pelo papel; também /api/admin/shipments)
// ---
#[utoipa::path(
    get,
    path = "/api/shipments",
    tag = "Shipments",
    params(ShipmentListQuery),
    responses(
        (status = 200, description = "Remessas visíveis ao usuário", body = Vec<ShipmentListItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_shipments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ShipmentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shipments = app_state
        .shipment_service
        .list(user.id, user.role, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "shipments": shipments }))))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "Remessa", body = Shipment),
        (status = 403, description = "Sem acesso"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let shipment = app_state
        .shipment_service
        .get(id, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "shipment": shipment }))))
}

#[utoipa::path(
    get,
    path = "/api/shipments/track/{tracking_number}",
    tag = "Shipments",
    params(("tracking_number" = String, Path, description = "Número de rastreio")),
    responses(
        (status = 200, description = "Remessa", body = Shipment),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn track_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(tracking_number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shipment = app_state
        .shipment_service
        .track(&tracking_number, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "shipment": shipment }))))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}/history",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "Histórico de status (mais antigo primeiro)", body = Vec<StatusHistoryEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn shipment_history(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .shipment_service
        .history(id, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "history": history }))))
}

// SVG pronto para impressão na etiqueta
#[utoipa::path(
    get,
    path = "/api/shipments/{id}/qr",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "QR code em SVG", content_type = "image/svg+xml", body = String)
    ),
    security(("api_jwt" = []))
)]
pub async fn shipment_qr(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let svg = app_state
        .shipment_service
        .qr_svg(id, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

// ---
// Handler: update_status (motorista atribuído ou admin)
// ---
#[utoipa::path(
    put,
    path = "/api/shipments/{id}/status",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado + linha de histórico", body = Shipment),
        (status = 403, description = "Remessa de outro motorista"),
        (status = 409, description = "Transição não permitida (invalidTransition)")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<DriverOrAdmin>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shipment = app_state
        .shipment_service
        .update_status(id, guard.user.id, guard.user.role, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "shipment_status_updated"),
        json!({ "shipment": shipment }),
    )))
}

// ---
// Handler: assign_driver (admin; também /api/admin/shipments/{id}/assign)
// ---
#[utoipa::path(
    put,
    path = "/api/shipments/{id}/assign",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    request_body = AssignDriverPayload,
    responses(
        (status = 200, description = "Motorista atribuído", body = Shipment),
        (status = 400, description = "Usuário não é motorista ativo e aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_driver(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AssignDriverPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shipment = app_state
        .shipment_service
        .assign(id, payload.driver_id, guard.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "shipment_assigned"),
        json!({ "shipment": shipment }),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/shipments/{id}",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "Remessa removida (histórico e leituras junto)"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .shipment_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "shipment_deleted"),
        json!({}),
    )))
}
