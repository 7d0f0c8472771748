// src/db/complaint_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::UserRole,
        complaint::{Complaint, ComplaintChanges, ComplaintListItem, ComplaintPriority, ComplaintStatus},
    },
};

pub struct NewComplaint<'a> {
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub shipment_id: Option<Uuid>,
    pub title: &'a str,
    pub description: &'a str,
    pub complaint_type: &'a str,
    pub priority: ComplaintPriority,
}

#[derive(Clone)]
pub struct ComplaintRepository {
    pool: PgPool,
}

impl ComplaintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, new: NewComplaint<'_>) -> Result<Complaint, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (
                user_id, user_role, shipment_id, title, description, complaint_type, priority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.user_role)
        .bind(new.shipment_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.complaint_type)
        .bind(new.priority)
        .fetch_one(executor)
        .await?;

        Ok(complaint)
    }

    // Fila de triagem: urgent, high, medium, low; empate -> mais recente primeiro
    pub async fn list_triage(&self, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintListItem>, AppError> {
        let complaints = sqlx::query_as::<_, ComplaintListItem>(
            r#"
            SELECT c.*, u.name AS user_name, u.phone AS user_phone, s.tracking_number
            FROM complaints c
            LEFT JOIN users u ON u.id = c.user_id
            LEFT JOIN shipments s ON s.id = c.shipment_id
            WHERE ($1::complaint_status IS NULL OR c.status = $1)
            ORDER BY array_position($2::text[], c.priority::text), c.created_at DESC
            "#,
        )
        .bind(status)
        .bind(ComplaintPriority::triage_order())
        .fetch_all(&self.pool)
        .await?;

        Ok(complaints)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError> {
        let complaints = sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(complaints)
    }

    // Atualização incremental: só o que veio preenchido muda
    pub async fn update(&self, id: Uuid, changes: &ComplaintChanges) -> Result<Option<Complaint>, AppError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = COALESCE($1, status),
                priority = COALESCE($2, priority),
                assigned_to = COALESCE($3, assigned_to),
                resolution_notes = COALESCE($4, resolution_notes),
                resolved_at = CASE
                    WHEN $1 = 'resolved'::complaint_status THEN NOW()
                    ELSE resolved_at
                END,
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(changes.status)
        .bind(changes.priority)
        .bind(changes.assigned_to)
        .bind(changes.resolution_notes.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(complaint)
    }
}
