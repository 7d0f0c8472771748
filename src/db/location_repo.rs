// src/db/location_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::location::{ActiveDriver, DriverLocation, LocationFix},
};

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // UPSERT (Insert or Update): sempre uma única linha por motorista
    pub async fn upsert<'e, E>(&self, executor: E, driver_id: Uuid, fix: &LocationFix) -> Result<DriverLocation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, DriverLocation>(
            r#"
            INSERT INTO driver_locations (
                driver_id, latitude, longitude, accuracy, speed, heading, battery_level,
                is_gps_active, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW())
            ON CONFLICT (driver_id)
            DO UPDATE SET
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                accuracy = EXCLUDED.accuracy,
                speed = EXCLUDED.speed,
                heading = EXCLUDED.heading,
                battery_level = EXCLUDED.battery_level,
                is_gps_active = TRUE,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(fix.latitude)
        .bind(fix.longitude)
        .bind(fix.accuracy)
        .bind(fix.speed)
        .bind(fix.heading)
        .bind(fix.battery_level)
        .fetch_one(executor)
        .await?;

        Ok(location)
    }

    // Só desliga a flag; coordenadas continuam as últimas conhecidas
    pub async fn mark_gps_disabled<'e, E>(&self, executor: E, driver_id: Uuid) -> Result<Option<DriverLocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, DriverLocation>(
            r#"
            UPDATE driver_locations
            SET is_gps_active = FALSE, updated_at = NOW()
            WHERE driver_id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .fetch_optional(executor)
        .await?;

        Ok(location)
    }

    pub async fn find_by_driver(&self, driver_id: Uuid) -> Result<Option<DriverLocation>, AppError> {
        let location = sqlx::query_as::<_, DriverLocation>(
            "SELECT * FROM driver_locations WHERE driver_id = $1",
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    // Motoristas com posição dentro da janela + remessa não terminal mais recente
    pub async fn list_active<'e, E>(&self, executor: E, window_minutes: i32) -> Result<Vec<ActiveDriver>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let drivers = sqlx::query_as::<_, ActiveDriver>(
            r#"
            SELECT
                dl.driver_id,
                u.name AS driver_name,
                u.phone AS driver_phone,
                dl.latitude, dl.longitude, dl.accuracy, dl.speed, dl.heading,
                dl.battery_level, dl.is_gps_active, dl.updated_at,
                s.id AS current_shipment_id,
                s.tracking_number AS current_tracking_number,
                s.status AS current_shipment_status
            FROM driver_locations dl
            JOIN users u ON u.id = dl.driver_id
            LEFT JOIN LATERAL (
                SELECT id, tracking_number, status
                FROM shipments
                WHERE driver_id = dl.driver_id
                  AND status NOT IN ('delivered', 'cancelled')
                ORDER BY updated_at DESC
                LIMIT 1
            ) s ON TRUE
            WHERE dl.updated_at >= NOW() - make_interval(mins => $1)
            ORDER BY dl.updated_at DESC
            "#,
        )
        .bind(window_minutes)
        .fetch_all(executor)
        .await?;

        Ok(drivers)
    }

    // O cliente só vê o motorista de uma remessa sua ainda em andamento
    pub async fn client_has_open_shipment_with(&self, client_id: Uuid, driver_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM shipments
                WHERE customer_id = $1
                  AND driver_id = $2
                  AND status NOT IN ('delivered', 'cancelled')
            )
            "#,
        )
        .bind(client_id)
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
