// src/services/location_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        i18n::{I18nStore, DEFAULT_LANG},
    },
    db::{LocationRepository, NotificationRepository, UserRepository},
    models::{
        auth::UserRole,
        location::{ActiveDriver, DriverLocation, LocationFix},
        notification::TYPE_GPS_DISABLED,
    },
};

pub const DEFAULT_WINDOW_MINUTES: i32 = 10;
const MAX_WINDOW_MINUTES: i32 = 24 * 60;

/// Janela pedida pelo painel, limitada a 1..=1440 minutos.
pub fn clamp_window(minutes: Option<i32>) -> i32 {
    minutes
        .unwrap_or(DEFAULT_WINDOW_MINUTES)
        .clamp(1, MAX_WINDOW_MINUTES)
}

#[derive(Clone)]
pub struct LocationService {
    location_repo: LocationRepository,
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    i18n_store: I18nStore,
    pool: PgPool,
}

impl LocationService {
    pub fn new(
        location_repo: LocationRepository,
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        i18n_store: I18nStore,
        pool: PgPool,
    ) -> Self {
        Self { location_repo, notification_repo, user_repo, i18n_store, pool }
    }

    pub async fn update_location(&self, driver_id: Uuid, fix: LocationFix) -> Result<DriverLocation, AppError> {
        if !fix.in_range() {
            return Err(AppError::InvalidInput("coordinates_out_of_range"));
        }
        self.location_repo.upsert(&self.pool, driver_id, &fix).await
    }

    /// Desliga a flag de GPS e avisa todos os admins ativos (mesma transação).
    /// Retorna `None` se o motorista nunca enviou posição.
    pub async fn mark_gps_disabled(
        &self,
        driver_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<DriverLocation>, AppError> {
        let mut tx = self.pool.begin().await?;

        let driver = self
            .user_repo
            .find_by_id_in(&mut *tx, driver_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let location = self.location_repo.mark_gps_disabled(&mut *tx, driver_id).await?;

        // As notificações são gravadas no idioma padrão do painel
        let title = self.i18n_store.translate(DEFAULT_LANG, "notif_gps_disabled_title");
        let message = self.i18n_store.translate_with(
            DEFAULT_LANG,
            "notif_gps_disabled_body",
            &[("name", &driver.name), ("reason", reason.unwrap_or("-"))],
        );
        let notified = self
            .notification_repo
            .notify_admins(&mut *tx, &title, &message, TYPE_GPS_DISABLED)
            .await?;

        tx.commit().await?;

        tracing::warn!("📴 GPS desligado pelo motorista {} ({} admins notificados)", driver_id, notified);
        Ok(location)
    }

    pub async fn list_active_drivers(&self, window_minutes: i32) -> Result<Vec<ActiveDriver>, AppError> {
        self.location_repo.list_active(&self.pool, window_minutes).await
    }

    /// Admin vê todos; motorista só a si mesmo; cliente só o motorista de uma remessa sua em andamento.
    pub async fn get_driver_location(
        &self,
        driver_id: Uuid,
        requester_id: Uuid,
        requester_role: UserRole,
    ) -> Result<DriverLocation, AppError> {
        let allowed = match requester_role {
            UserRole::Admin | UserRole::SuperAdmin => true,
            UserRole::Driver => requester_id == driver_id,
            UserRole::Client => {
                self.location_repo
                    .client_has_open_shipment_with(requester_id, driver_id)
                    .await?
            }
        };

        if !allowed {
            return Err(AppError::AccessDenied);
        }

        self.location_repo
            .find_by_driver(driver_id)
            .await?
            .ok_or(AppError::LocationNotFound)
    }
}
