// src/db/shipment_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::shipment::{Shipment, ShipmentListItem, ShipmentStatus, StatusChange, StatusHistoryEntry},
};

pub struct NewShipment<'a> {
    pub tracking_number: &'a str,
    pub qr_code: &'a str,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: ShipmentStatus,
    pub recipient_name: &'a str,
    pub recipient_phone: Option<&'a str>,
    pub pickup_address: &'a str,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub destination_address: &'a str,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub description: Option<&'a str>,
    pub weight: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub notes: Option<&'a str>,
}

/// Filtro das listagens; `None` não restringe.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShipmentFilter {
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub status: Option<ShipmentStatus>,
}

const LIST_SELECT: &str = r#"
    SELECT s.*, c.name AS customer_name, d.name AS driver_name
    FROM shipments s
    LEFT JOIN users c ON c.id = s.customer_id
    LEFT JOIN users d ON d.id = s.driver_id
"#;

#[derive(Clone)]
pub struct ShipmentRepository {
    pool: PgPool,
}

impl ShipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  REMESSAS
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, new: NewShipment<'_>) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>(
            r#"
            INSERT INTO shipments (
                tracking_number, qr_code, customer_id, driver_id, status,
                recipient_name, recipient_phone,
                pickup_address, pickup_lat, pickup_lng,
                destination_address, destination_lat, destination_lng,
                description, weight, cost, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(new.tracking_number)
        .bind(new.qr_code)
        .bind(new.customer_id)
        .bind(new.driver_id)
        .bind(new.status)
        .bind(new.recipient_name)
        .bind(new.recipient_phone)
        .bind(new.pickup_address)
        .bind(new.pickup_lat)
        .bind(new.pickup_lng)
        .bind(new.destination_address)
        .bind(new.destination_lat)
        .bind(new.destination_lng)
        .bind(new.description)
        .bind(new.weight)
        .bind(new.cost)
        .bind(new.notes)
        .fetch_one(executor)
        .await?;

        Ok(shipment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Shipment>, AppError> {
        let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shipment)
    }

    // Trava a linha até o fim da transação (checagem + escrita do status)
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Shipment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(shipment)
    }

    pub async fn find_by_tracking_number(&self, tracking_number: &str) -> Result<Option<Shipment>, AppError> {
        let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE tracking_number = $1")
            .bind(tracking_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shipment)
    }

    pub async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Shipment>, AppError> {
        let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE qr_code = $1")
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shipment)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: ShipmentFilter,
        limit: Option<i64>,
    ) -> Result<Vec<ShipmentListItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {LIST_SELECT}
            WHERE ($1::uuid IS NULL OR s.customer_id = $1)
              AND ($2::uuid IS NULL OR s.driver_id = $2)
              AND ($3::shipment_status IS NULL OR s.status = $3)
            ORDER BY s.created_at DESC
            LIMIT $4
            "#
        );

        let shipments = sqlx::query_as::<_, ShipmentListItem>(&sql)
            .bind(filter.customer_id)
            .bind(filter.driver_id)
            .bind(filter.status)
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(shipments)
    }

    pub async fn set_driver<'e, E>(&self, executor: E, id: Uuid, driver_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE shipments SET driver_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(driver_id)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Status + updated_at (+ dados de entrega quando `delivered`)
    pub async fn update_status<'e, E>(&self, executor: E, id: Uuid, change: &StatusChange) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments
            SET status = $1,
                notes = COALESCE($2, notes),
                updated_at = NOW(),
                delivered_at = CASE WHEN $1 = 'delivered'::shipment_status THEN NOW() ELSE delivered_at END,
                delivery_lat = CASE WHEN $1 = 'delivered'::shipment_status THEN $3 ELSE delivery_lat END,
                delivery_lng = CASE WHEN $1 = 'delivered'::shipment_status THEN $4 ELSE delivery_lng END
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(change.status)
        .bind(change.notes.as_deref())
        .bind(change.latitude)
        .bind(change.longitude)
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(shipment)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  HISTÓRICO
    // =========================================================================

    pub async fn append_history<'e, E>(
        &self,
        executor: E,
        shipment_id: Uuid,
        change: &StatusChange,
    ) -> Result<StatusHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            INSERT INTO shipment_status_history (shipment_id, status, latitude, longitude, notes, changed_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(shipment_id)
        .bind(change.status)
        .bind(change.latitude)
        .bind(change.longitude)
        .bind(change.notes.as_deref())
        .bind(change.actor_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_history(&self, shipment_id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            SELECT * FROM shipment_status_history
            WHERE shipment_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
