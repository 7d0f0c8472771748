// src/db/qr_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::qr::{QrScan, ScanType},
};

pub struct NewScan<'a> {
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub scan_type: ScanType,
    pub qr_data: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub photo_url: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Clone)]
pub struct QrRepository {
    pool: PgPool,
}

impl QrRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_scan<'e, E>(&self, executor: E, scan: NewScan<'_>) -> Result<QrScan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let scan = sqlx::query_as::<_, QrScan>(
            r#"
            INSERT INTO qr_scans (
                shipment_id, driver_id, scan_type, qr_data,
                latitude, longitude, accuracy, photo_url, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(scan.shipment_id)
        .bind(scan.driver_id)
        .bind(scan.scan_type)
        .bind(scan.qr_data)
        .bind(scan.latitude)
        .bind(scan.longitude)
        .bind(scan.accuracy)
        .bind(scan.photo_url)
        .bind(scan.notes)
        .fetch_one(executor)
        .await?;

        Ok(scan)
    }

    pub async fn list_for_shipment(&self, shipment_id: Uuid) -> Result<Vec<QrScan>, AppError> {
        let scans = sqlx::query_as::<_, QrScan>(
            "SELECT * FROM qr_scans WHERE shipment_id = $1 ORDER BY scanned_at DESC",
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(scans)
    }
}
