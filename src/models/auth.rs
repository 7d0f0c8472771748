// src/models/auth.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Papel do usuário (tipo Postgres `user_role`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Driver,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Driver => "driver",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// Motoristas e admins só entram depois de aprovados.
    pub fn requires_approval(&self) -> bool {
        matches!(self, UserRole::Driver | UserRole::Admin)
    }

    /// Contas administrativas (e os papéis que as criam) só mudam pela mão do super admin.
    pub fn can_manage(&self, target: UserRole) -> bool {
        !target.is_admin() || *self == UserRole::SuperAdmin
    }

    /// Papéis aceitos no auto-cadastro público.
    pub fn is_self_registrable(&self) -> bool {
        matches!(self, UserRole::Client | UserRole::Driver)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "01012345678")]
    pub phone: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Ahmed Ali")]
    pub name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_approved: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Ordem das checagens: conta desativada antes de aprovação pendente.
    pub fn ensure_can_authenticate(&self) -> Result<(), crate::common::error::AppError> {
        use crate::common::error::AppError;

        if !self.is_active {
            return Err(AppError::AccountDisabled);
        }
        if self.role.requires_approval() && !self.is_approved {
            return Err(AppError::PendingApproval);
        }
        Ok(())
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 8, max = 20, message = "phone_length"))]
    #[schema(example = "01012345678")]
    pub phone: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: String,
    #[validate(length(min = 2, max = 100, message = "name_length"))]
    pub name: String,
    /// `client` ou `driver` (padrão: `driver`)
    pub role: Option<UserRole>,
    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 8, max = 20, message = "phone_length"))]
    pub phone: String,
    #[validate(length(min = 1, message = "password_length"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 8, max = 20, message = "phone_length"))]
    pub phone: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub new_password: String,
}

// --- Administração de usuários ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 8, max = 20, message = "phone_length"))]
    pub phone: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: String,
    #[validate(length(min = 2, max = 100, message = "name_length"))]
    pub name: String,
    pub role: UserRole,
    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveUserPayload {
    /// Mantém o papel atual quando ausente
    pub role: Option<UserRole>,
    /// Padrão: `true`
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActivePayload {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

// Resposta de login com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub user_type: UserRole,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    pub phone: String,
    pub role: UserRole,
    pub jti: Uuid, // ID da sessão registrada no login
    pub exp: usize,
    pub iat: usize,
}
