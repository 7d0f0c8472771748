// src/services/dashboard_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        dashboard_repo::ACTIVE_DRIVER_WINDOW_MINUTES, shipment_repo::ShipmentFilter,
        DashboardRepository, LocationRepository, ShipmentRepository,
    },
    models::dashboard::DashboardOverview,
};

const RECENT_SHIPMENTS: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    shipment_repo: ShipmentRepository,
    location_repo: LocationRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        shipment_repo: ShipmentRepository,
        location_repo: LocationRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, shipment_repo, location_repo, pool }
    }

    /// Contadores + últimas remessas + motoristas ativos, lidos na mesma transação
    /// para que os números batam entre si. Sem cache.
    pub async fn get_overview(&self) -> Result<DashboardOverview, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let stats = self.repo.get_stats(&mut *tx).await?;
        let recent_shipments = self
            .shipment_repo
            .list(&mut *tx, ShipmentFilter::default(), Some(RECENT_SHIPMENTS))
            .await?;
        let active_drivers = self
            .location_repo
            .list_active(&mut *tx, ACTIVE_DRIVER_WINDOW_MINUTES)
            .await?;

        tx.commit().await?;

        Ok(DashboardOverview {
            stats,
            recent_shipments,
            active_drivers,
        })
    }
}
