// src/handlers/location.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

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
        rbac::{AdminRoles, DriverRole, RequireRole},
    },
    models::location::{
        ActiveDriver, ActiveDriversQuery, DriverLocation, GpsDisabledPayload, UpdateLocationPayload,
    },
    services::location_service::clamp_window,
};

// ---
// Handler: update_location (motorista)
// ---
#[utoipa::path(
    post,
    path = "/api/location/update",
    tag = "Location",
    request_body = UpdateLocationPayload,
    responses(
        (status = 200, description = "Posição atual gravada (upsert)", body = DriverLocation),
        (status = 400, description = "Coordenadas ausentes ou fora do intervalo"),
        (status = 403, description = "Apenas motoristas")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_location(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<DriverRole>,
    AppJson(payload): AppJson<UpdateLocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fix = payload
        .into_fix()
        .ok_or(AppError::LocationRequired)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let location = app_state
        .location_service
        .update_location(guard.user.id, fix)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "location_updated"),
        json!({ "location": location }),
    )))
}

// ---
// Handler: gps_disabled (motorista)
// ---
#[utoipa::path(
    post,
    path = "/api/location/gps-disabled",
    tag = "Location",
    request_body = GpsDisabledPayload,
    responses(
        (status = 200, description = "GPS marcado como desligado; admins notificados")
    ),
    security(("api_jwt" = []))
)]
pub async fn gps_disabled(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<DriverRole>,
    AppJson(payload): AppJson<GpsDisabledPayload>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(
        "GPS desligado em ({:?}, {:?})",
        payload.latitude,
        payload.longitude
    );

    let location = app_state
        .location_service
        .mark_gps_disabled(guard.user.id, payload.reason.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "gps_disabled_recorded"),
        json!({ "location": location }),
    )))
}

// ---
// Handler: active_drivers (admin)
// ---
#[utoipa::path(
    get,
    path = "/api/location/drivers",
    tag = "Location",
    params(ActiveDriversQuery),
    responses(
        (status = 200, description = "Motoristas com posição dentro da janela", body = Vec<ActiveDriver>)
    ),
    security(("api_jwt" = []))
)]
pub async fn active_drivers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
    Query(query): Query<ActiveDriversQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let drivers = app_state
        .location_service
        .list_active_drivers(clamp_window(query.minutes))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "drivers": drivers }))))
}

// ---
// Handler: driver_location
// ---
#[utoipa::path(
    get,
    path = "/api/location/driver/{id}",
    tag = "Location",
    params(("id" = Uuid, Path, description = "ID do motorista")),
    responses(
        (status = 200, description = "Última posição do motorista", body = DriverLocation),
        (status = 403, description = "Sem remessa em andamento com este motorista"),
        (status = 404, description = "Motorista sem posição registrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn driver_location(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(driver_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let location = app_state
        .location_service
        .get_driver_location(driver_id, user.id, user.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "location": location }))))
}
