// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::SuperAdminSeed,
    db::{user_repo::NewUser, UserRepository},
    models::auth::{User, UserRole},
    services::auth::hash_password,
};

// Ciclo de vida das contas (lado administrativo)
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    bcrypt_cost: u32,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, bcrypt_cost: u32, pool: PgPool) -> Self {
        Self { user_repo, bcrypt_cost, pool }
    }

    pub async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        self.user_repo.list_users(&self.pool, role).await
    }

    pub async fn list_pending(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_pending(&self.pool).await
    }

    /// Define papel + aprovação. Revogar a aprovação também derruba as sessões.
    pub async fn approve(
        &self,
        actor_role: UserRole,
        user_id: Uuid,
        role: Option<UserRole>,
        approved: bool,
    ) -> Result<User, AppError> {
        let target = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Papel atual e papel pedido passam pela mesma regra
        ensure_can_manage(actor_role, target.role)?;
        let role = role.unwrap_or(target.role);
        ensure_can_manage(actor_role, role)?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .set_approval(&mut *tx, user_id, role, approved)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !approved {
            self.user_repo.delete_sessions_for_user(&mut *tx, user_id).await?;
        }

        tx.commit().await?;

        tracing::info!("✅ Usuário {} -> papel {}, aprovado = {}", user.id, user.role, user.is_approved);
        Ok(user)
    }

    /// Ativa/desativa. Desativar remove as sessões registradas na mesma transação.
    pub async fn set_active(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        user_id: Uuid,
        active: bool,
    ) -> Result<User, AppError> {
        if actor_id == user_id {
            return Err(AppError::InvalidInput("cannot_modify_self"));
        }

        let mut tx = self.pool.begin().await?;

        let target = self
            .user_repo
            .find_by_id_in(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_can_manage(actor_role, target.role)?;

        let user = self
            .user_repo
            .set_active(&mut *tx, user_id, active)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !active {
            let revoked = self.user_repo.delete_sessions_for_user(&mut *tx, user_id).await?;
            tracing::info!("🚫 Usuário {} desativado ({} sessões removidas)", user_id, revoked);
        }

        tx.commit().await?;
        Ok(user)
    }

    // Sessões primeiro, depois o usuário
    pub async fn delete_user(&self, actor_id: Uuid, actor_role: UserRole, user_id: Uuid) -> Result<(), AppError> {
        if actor_id == user_id {
            return Err(AppError::InvalidInput("cannot_modify_self"));
        }

        let mut tx = self.pool.begin().await?;

        let target = self
            .user_repo
            .find_by_id_in(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_can_manage(actor_role, target.role)?;

        self.user_repo.delete_sessions_for_user(&mut *tx, user_id).await?;
        let deleted = self.user_repo.delete_user(&mut *tx, user_id).await?;
        if deleted == 0 {
            return Err(AppError::UserNotFound);
        }

        tx.commit().await?;

        tracing::info!("🗑️ Usuário {} removido", user_id);
        Ok(())
    }

    /// Conta criada pelo admin já nasce aprovada.
    pub async fn create_user(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        phone: &str,
        password: &str,
        name: &str,
        role: UserRole,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        ensure_can_manage(actor_role, role)?;

        if self.user_repo.find_by_phone(phone).await?.is_some() {
            return Err(AppError::PhoneAlreadyExists);
        }

        let hashed_password = hash_password(password, self.bcrypt_cost).await?;

        self.user_repo
            .create_user(
                &self.pool,
                NewUser {
                    phone,
                    password_hash: &hashed_password,
                    name,
                    email,
                    role,
                    is_approved: true,
                    created_by: Some(actor_id),
                },
            )
            .await
    }

    /// Garante a conta super admin configurada no ambiente (boot).
    pub async fn ensure_super_admin(&self, seed: &SuperAdminSeed) -> Result<(), AppError> {
        if self.user_repo.find_by_phone(&seed.phone).await?.is_some() {
            return Ok(());
        }

        let hashed_password = hash_password(&seed.password, self.bcrypt_cost).await?;

        let user = self
            .user_repo
            .create_user(
                &self.pool,
                NewUser {
                    phone: &seed.phone,
                    password_hash: &hashed_password,
                    name: &seed.name,
                    email: None,
                    role: UserRole::SuperAdmin,
                    is_approved: true,
                    created_by: None,
                },
            )
            .await?;

        tracing::info!("👑 Super admin criado: {}", user.id);
        Ok(())
    }
}

// Só o super admin concede papéis administrativos ou mexe em contas administrativas
fn ensure_can_manage(actor_role: UserRole, role: UserRole) -> Result<(), AppError> {
    if !actor_role.can_manage(role) {
        return Err(AppError::SuperAdminRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_super_admin_grants_admin_roles() {
        assert!(ensure_can_manage(UserRole::Admin, UserRole::Driver).is_ok());
        assert!(ensure_can_manage(UserRole::Admin, UserRole::Client).is_ok());
        assert!(ensure_can_manage(UserRole::SuperAdmin, UserRole::Admin).is_ok());
        assert!(ensure_can_manage(UserRole::SuperAdmin, UserRole::SuperAdmin).is_ok());
        assert!(matches!(
            ensure_can_manage(UserRole::Admin, UserRole::SuperAdmin),
            Err(AppError::SuperAdminRequired)
        ));
    }
}
