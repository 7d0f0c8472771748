// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, UserRepository},
    models::auth::{Claims, User, UserRole},
};

// --- Primitivas de senha (bcrypt roda fora do executor async) ---

pub(crate) async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

// --- Primitivas de token ---

pub fn issue_token(
    secret: &str,
    user: &User,
    jti: Uuid,
    ttl_days: i64,
) -> Result<(String, DateTime<Utc>), AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(ttl_days);

    let claims = Claims {
        sub: user.id,
        phone: user.phone.clone(),
        role: user.role,
        jti,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok((token, expires_at))
}

// Assinatura + expiração; qualquer falha vira InvalidToken
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl_days: i64,
    bcrypt_cost: u32,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        jwt_secret: String,
        token_ttl_days: i64,
        bcrypt_cost: u32,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, jwt_secret, token_ttl_days, bcrypt_cost, pool }
    }

    /// Auto-cadastro. Clientes já saem com token; motoristas ficam pendentes.
    pub async fn register_user(
        &self,
        phone: &str,
        password: &str,
        name: &str,
        role: Option<UserRole>,
        email: Option<&str>,
    ) -> Result<(User, Option<String>), AppError> {
        let role = role.unwrap_or(UserRole::Driver);
        if !role.is_self_registrable() {
            return Err(AppError::InvalidInput("invalid_role"));
        }

        if self.user_repo.find_by_phone(phone).await?.is_some() {
            return Err(AppError::PhoneAlreadyExists);
        }

        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(password, self.bcrypt_cost).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria Usuário (a unique constraint cobre a corrida com outro cadastro)
        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    phone,
                    password_hash: &hashed_password,
                    name,
                    email,
                    role,
                    is_approved: !role.requires_approval(),
                    created_by: None,
                },
            )
            .await?;

        // 3. Sessão + token só para quem já pode entrar
        let token = if new_user.ensure_can_authenticate().is_ok() {
            let jti = Uuid::new_v4();
            let (token, expires_at) = issue_token(&self.jwt_secret, &new_user, jti, self.token_ttl_days)?;
            self.user_repo.insert_session(&mut *tx, jti, new_user.id, expires_at).await?;
            Some(token)
        } else {
            None
        };

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("👤 Novo usuário {} ({})", new_user.id, new_user.role);
        Ok((new_user, token))
    }

    /// Senha primeiro; o estado da conta só é revelado a quem acertou a senha.
    pub async fn login_user(&self, phone: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_phone(phone)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        user.ensure_can_authenticate()?;

        let jti = Uuid::new_v4();
        let (token, expires_at) = issue_token(&self.jwt_secret, &user, jti, self.token_ttl_days)?;

        let mut tx = self.pool.begin().await?;
        self.user_repo.touch_last_login(&mut *tx, user.id).await?;
        self.user_repo.insert_session(&mut *tx, jti, user.id, expires_at).await?;
        tx.commit().await?;

        Ok((token, user))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt_secret, token)
    }

    /// Perfil atual, revalidando ativo/aprovado a cada chamada.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        user.ensure_can_authenticate()?;
        Ok(user)
    }

    /// Troca a senha e derruba as sessões registradas do usuário.
    pub async fn reset_password(
        &self,
        actor_role: UserRole,
        phone: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_phone(phone)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !actor_role.can_manage(user.role) {
            return Err(AppError::SuperAdminRequired);
        }

        let hashed_password = hash_password(new_password, self.bcrypt_cost).await?;

        let mut tx = self.pool.begin().await?;
        self.user_repo.update_password(&mut *tx, user.id, &hashed_password).await?;
        self.user_repo.delete_sessions_for_user(&mut *tx, user.id).await?;
        tx.commit().await?;

        tracing::info!("🔑 Senha redefinida para o usuário {}", user.id);
        Ok(())
    }
}
