use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::shipment::ShipmentStatus,
};

// Nosso tipo de erro de domínio. Os handlers convertem para `ApiError`
// (status + mensagem traduzida) com `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // A string é a chave de tradução da mensagem
    #[error("Entrada inválida: {0}")]
    InvalidInput(&'static str),

    // Corpo JSON ilegível ou com tipos errados (rejeição do extrator)
    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("Leitura de QR sem coordenadas GPS")]
    GpsRequired,

    #[error("Latitude e longitude são obrigatórias")]
    LocationRequired,

    #[error("Telefone já cadastrado")]
    PhoneAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Conta desativada")]
    AccountDisabled,

    #[error("Conta aguardando aprovação")]
    PendingApproval,

    #[error("Papel do usuário sem permissão para a rota")]
    InsufficientRole,

    #[error("Acesso negado ao recurso")]
    AccessDenied,

    #[error("Operação sobre conta administrativa exige super admin")]
    SuperAdminRequired,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Remessa não encontrada")]
    ShipmentNotFound,

    #[error("Localização não encontrada")]
    LocationNotFound,

    #[error("Reclamação não encontrada")]
    ComplaintNotFound,

    #[error("Notificação não encontrada")]
    NotificationNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP, chave de tradução e flag opcional para o cliente.
    pub fn classify(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed", None),
            AppError::InvalidInput(key) => (StatusCode::BAD_REQUEST, *key, None),
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "invalid_body", None),
            AppError::GpsRequired => (StatusCode::BAD_REQUEST, "gps_required", Some("require_gps")),
            AppError::LocationRequired => (StatusCode::BAD_REQUEST, "location_required", None),
            AppError::PhoneAlreadyExists => (StatusCode::CONFLICT, "phone_already_exists", None),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials", None),
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token", None),
            AppError::InvalidToken => (StatusCode::FORBIDDEN, "invalid_token", None),
            AppError::AccountDisabled => {
                (StatusCode::FORBIDDEN, "account_disabled", Some("accountDisabled"))
            }
            AppError::PendingApproval => {
                (StatusCode::FORBIDDEN, "pending_approval", Some("pendingApproval"))
            }
            AppError::InsufficientRole => (StatusCode::FORBIDDEN, "insufficient_role", None),
            AppError::AccessDenied => (StatusCode::FORBIDDEN, "access_denied", None),
            AppError::SuperAdminRequired => {
                (StatusCode::FORBIDDEN, "role_requires_super_admin", None)
            }
            AppError::InvalidStatusTransition { .. } => (
                StatusCode::CONFLICT,
                "invalid_status_transition",
                Some("invalidTransition"),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", None),
            AppError::ShipmentNotFound => (StatusCode::NOT_FOUND, "shipment_not_found", None),
            AppError::LocationNotFound => (StatusCode::NOT_FOUND, "location_not_found", None),
            AppError::ComplaintNotFound => (StatusCode::NOT_FOUND, "complaint_not_found", None),
            AppError::NotificationNotFound => {
                (StatusCode::NOT_FOUND, "notification_not_found", None)
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    /// Erros internos são logados aqui e nunca expostos.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key, flag) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let msg_key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, msg_key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError {
            status,
            message: store.translate(&locale.0, key),
            flag,
            details,
        }
    }
}

// O erro que efetivamente vira resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub flag: Option<&'static str>,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(flag) = self.flag {
                obj.insert(flag.to_string(), Value::Bool(true));
            }
            if let Some(details) = self.details {
                obj.insert("details".to_string(), details);
            }
        }

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn token_errors_are_distinct() {
        let (missing, _, _) = AppError::MissingToken.classify();
        let (invalid, _, _) = AppError::InvalidToken.classify();
        assert_eq!(missing, StatusCode::UNAUTHORIZED);
        assert_eq!(invalid, StatusCode::FORBIDDEN);
    }

    #[test]
    fn account_state_errors_carry_flags() {
        assert_eq!(AppError::AccountDisabled.classify().2, Some("accountDisabled"));
        assert_eq!(AppError::PendingApproval.classify().2, Some("pendingApproval"));
        assert_eq!(AppError::GpsRequired.classify().2, Some("require_gps"));
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exploded at 10.0.0.3"));
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("10.0.0.3"));
    }

    #[test]
    fn malformed_body_hides_serde_message() {
        let err = AppError::MalformedBody("scan_type: unknown variant `teleport`".into());
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(!api.message.contains("teleport"));
    }

    #[test]
    fn messages_follow_locale() {
        let en = AppError::ShipmentNotFound.to_api_error(&Locale("en".into()), &store());
        let ar = AppError::ShipmentNotFound.to_api_error(&Locale("ar".into()), &store());
        assert_eq!(en.status, StatusCode::NOT_FOUND);
        assert_ne!(en.message, ar.message);
    }
}
