// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. Conjunto de papéis aceito por uma rota
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião). Guarda o usuário já validado.
pub struct RequireRole<T> {
    pub user: AuthenticatedUser,
    _marker: PhantomData<T>,
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A. Usuário colocado pelo auth_guard
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Papel precisa estar no conjunto
        if !T::allowed().contains(&user.role) {
            let app_state = AppState::from_ref(state);
            return Err(AppError::InsufficientRole
                .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store));
        }

        Ok(RequireRole {
            user,
            _marker: PhantomData,
        })
    }
}

// ---
// DEFINIÇÃO DOS CONJUNTOS (TIPOS)
// ---

pub struct AdminRoles;
impl RoleSet for AdminRoles {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin, UserRole::SuperAdmin] }
}

pub struct DriverRole;
impl RoleSet for DriverRole {
    fn allowed() -> &'static [UserRole] { &[UserRole::Driver] }
}

pub struct ClientOrAdmin;
impl RoleSet for ClientOrAdmin {
    fn allowed() -> &'static [UserRole] { &[UserRole::Client, UserRole::Admin, UserRole::SuperAdmin] }
}

pub struct DriverOrAdmin;
impl RoleSet for DriverOrAdmin {
    fn allowed() -> &'static [UserRole] { &[UserRole::Driver, UserRole::Admin, UserRole::SuperAdmin] }
}
