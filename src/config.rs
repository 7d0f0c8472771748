// src/config.rs

use std::{env, str::FromStr};

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    common::{db_utils::connect_with_retry, i18n::I18nStore},
    db::{
        ComplaintRepository, DashboardRepository, LocationRepository, NotificationRepository,
        QrRepository, ShipmentRepository, UserRepository,
    },
    services::{
        auth::AuthService, complaint_service::ComplaintService,
        dashboard_service::DashboardService, location_service::LocationService,
        qr_service::QrService, shipment_service::ShipmentService, user_service::UserService,
    },
};

/// Conta super admin criada no boot, se configurada.
#[derive(Clone)]
pub struct SuperAdminSeed {
    pub phone: String,
    pub password: String,
    pub name: String,
}

// Configuração do processo, lida uma única vez do ambiente (.env)
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_connect_retries: u32,
    pub db_retry_delay_secs: u64,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub strict_status_transitions: bool,
    pub super_admin: Option<SuperAdminSeed>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let super_admin = match (env::var("SUPER_ADMIN_PHONE"), env::var("SUPER_ADMIN_PASSWORD")) {
            (Ok(phone), Ok(password)) => Some(SuperAdminSeed {
                phone,
                password,
                name: env::var("SUPER_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            port: env_or("PORT", 5000)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            db_connect_retries: env_or("DB_CONNECT_RETRIES", 10)?,
            db_retry_delay_secs: env_or("DB_RETRY_DELAY_SECS", 3)?,
            token_ttl_days: env_or("TOKEN_TTL_DAYS", 7)?,
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            strict_status_transitions: env_or("STRICT_STATUS_TRANSITIONS", true)?,
            super_admin,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub location_service: LocationService,
    pub shipment_service: ShipmentService,
    pub qr_service: QrService,
    pub complaint_service: ComplaintService,
    pub dashboard_service: DashboardService,
    pub notification_repo: NotificationRepository,
}

impl AppState {
    // Conecta ao banco (com retry) e monta o estado
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = connect_with_retry(&settings).await?;
        Self::from_pool(db_pool, settings)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, settings: Settings) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        let user_repo = UserRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let shipment_repo = ShipmentRepository::new(db_pool.clone());
        let qr_repo = QrRepository::new(db_pool.clone());
        let complaint_repo = ComplaintRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new();

        let auth_service = AuthService::new(
            user_repo.clone(),
            settings.jwt_secret.clone(),
            settings.token_ttl_days,
            settings.bcrypt_cost,
            db_pool.clone(),
        );

        let user_service = UserService::new(user_repo.clone(), settings.bcrypt_cost, db_pool.clone());

        let location_service = LocationService::new(
            location_repo.clone(),
            notification_repo.clone(),
            user_repo.clone(),
            i18n_store.clone(),
            db_pool.clone(),
        );

        let shipment_service = ShipmentService::new(
            shipment_repo.clone(),
            user_repo.clone(),
            notification_repo.clone(),
            i18n_store.clone(),
            settings.strict_status_transitions,
            db_pool.clone(),
        );

        let qr_service = QrService::new(qr_repo, shipment_service.clone(), db_pool.clone());
        let complaint_service =
            ComplaintService::new(complaint_repo, shipment_repo.clone(), user_repo, db_pool.clone());
        let dashboard_service =
            DashboardService::new(dashboard_repo, shipment_repo, location_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            settings,
            i18n_store,
            auth_service,
            user_service,
            location_service,
            shipment_service,
            qr_service,
            complaint_service,
            dashboard_service,
            notification_repo,
        })
    }
}
