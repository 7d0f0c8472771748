// src/handlers/admin.rs

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
        i18n::Locale,
        json::AppJson,
        rbac::{AdminRoles, RequireRole},
    },
    models::{
        auth::{ApproveUserPayload, CreateUserPayload, SetActivePayload, User, UserListQuery},
        dashboard::DashboardOverview,
        location::ActiveDriver,
        shipment::{ShipmentListItem, ShipmentListQuery},
    },
    services::location_service::DEFAULT_WINDOW_MINUTES,
};

// ---
// Handler: list_users
// ---
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(UserListQuery),
    responses(
        (status = 200, description = "Usuários (mais recentes primeiro)", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_users(query.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "users": users }))))
}

#[utoipa::path(
    get,
    path = "/api/admin/pending-users",
    tag = "Admin",
    responses(
        (status = 200, description = "Motoristas/admins aguardando aprovação", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_pending()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "users": users }))))
}

// ---
// Handler: approve_user
// ---
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = ApproveUserPayload,
    responses(
        (status = 200, description = "Papel e aprovação atualizados", body = User),
        (status = 403, description = "Conta ou papel administrativo exige super admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<ApproveUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let approved = payload.approved.unwrap_or(true);

    let user = app_state
        .user_service
        .approve(guard.user.role, user_id, payload.role, approved)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let key = if approved { "user_approved" } else { "user_approval_revoked" };
    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, key),
        json!({ "user": user }),
    )))
}

// ---
// Handler: set_user_active (ativar/desativar)
// ---
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/disable",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = SetActivePayload,
    responses(
        (status = 200, description = "Estado da conta atualizado", body = User),
        (status = 400, description = "Não é possível alterar a própria conta"),
        (status = 403, description = "Conta administrativa exige super admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_user_active(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<SetActivePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_service
        .set_active(guard.user.id, guard.user.role, user_id, payload.is_active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let key = if payload.is_active { "user_enabled" } else { "user_disabled" };
    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, key),
        json!({ "user": user }),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário e sessões removidos"),
        (status = 403, description = "Conta administrativa exige super admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete_user(guard.user.id, guard.user.role, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "user_deleted"),
        json!({}),
    )))
}

// ---
// Handler: create_user (conta já aprovada)
// ---
#[utoipa::path(
    post,
    path = "/api/admin/create-user",
    tag = "Admin",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    AppJson(payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .create_user(
            guard.user.id,
            guard.user.role,
            &payload.phone,
            &payload.password,
            &payload.name,
            payload.role,
            payload.email.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "user_created"),
            json!({ "user": user }),
        )),
    ))
}

// ---
// Handler: get_dashboard
// ---
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Contadores, últimas remessas e motoristas ativos", body = DashboardOverview)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .dashboard_service
        .get_overview()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(overview)))
}

// Mesmo conteúdo de /api/location/drivers, com a chave usada pelo mapa do painel
#[utoipa::path(
    get,
    path = "/api/admin/drivers-locations",
    tag = "Admin",
    responses(
        (status = 200, description = "Motoristas ativos nos últimos 10 minutos", body = Vec<ActiveDriver>)
    ),
    security(("api_jwt" = []))
)]
pub async fn drivers_locations(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRoles>,
) -> Result<impl IntoResponse, ApiError> {
    let locations = app_state
        .location_service
        .list_active_drivers(DEFAULT_WINDOW_MINUTES)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "locations": locations }))))
}

#[utoipa::path(
    get,
    path = "/api/admin/shipments",
    tag = "Admin",
    params(ShipmentListQuery),
    responses(
        (status = 200, description = "Todas as remessas (mais recentes primeiro)", body = Vec<ShipmentListItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_shipments(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    Query(query): Query<ShipmentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shipments = app_state
        .shipment_service
        .list(guard.user.id, guard.user.role, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "shipments": shipments }))))
}
