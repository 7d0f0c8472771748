// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
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
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, ResetPasswordPayload, User},
};

// ---
// Handler: register (público)
// ---
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Conta criada (motoristas ficam pendentes)", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Telefone já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (user, token) = app_state
        .auth_service
        .register_user(
            &payload.phone,
            &payload.password,
            &payload.name,
            payload.role,
            payload.email.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let body = match token {
        Some(token) => Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "register_success"),
            json!({ "user": user, "token": token, "user_type": user.role }),
        ),
        None => Envelope::with_message(
            app_state.i18n_store.translate(&locale.0, "register_pending"),
            json!({ "user": user, "pendingApproval": true }),
        ),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

// ---
// Handler: login (público)
// ---
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token JWT (7 dias)", body = AuthResponse),
        (status = 401, description = "Telefone ou senha incorretos"),
        (status = 403, description = "Conta desativada (accountDisabled) ou pendente (pendingApproval)")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.phone, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let user_type = user.role;
    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "login_success"),
        AuthResponse { token, user, user_type },
    )))
}

// ---
// Handler: get_me (também em /api/user/profile)
// ---
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = User),
        (status = 401, description = "Token ausente"),
        (status = 403, description = "Token inválido, conta desativada ou pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    // Revalida ativo/aprovado a cada chamada
    let user = app_state
        .auth_service
        .current_user(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::ok(json!({ "user": user }))))
}

// ---
// Handler: reset_password (admin)
// ---
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha trocada e sessões revogadas"),
        (status = 403, description = "Conta administrativa exige super admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminRoles>,
    AppJson(payload): AppJson<ResetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .reset_password(guard.user.role, &payload.phone, &payload.new_password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(Envelope::with_message(
        app_state.i18n_store.translate(&locale.0, "password_reset_success"),
        json!({}),
    )))
}
