// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const TYPE_GPS_DISABLED: &str = "gps_disabled";
pub const TYPE_SHIPMENT_ASSIGNED: &str = "shipment_assigned";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[schema(example = "gps_disabled")]
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
