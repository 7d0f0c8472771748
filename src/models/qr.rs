// src/models/qr.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use validator::Validate;

use crate::models::shipment::{Shipment, ShipmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "qr_scan_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Pickup,
    Delivery,
    Transfer,
}

impl ScanType {
    /// Mapeamento fixo tipo de leitura -> status da remessa.
    /// Não olha o status atual; quem decide se a transição vale é a tabela de transições.
    pub fn derived_status(&self) -> ShipmentStatus {
        match self {
            ScanType::Pickup => ShipmentStatus::PickedUp,
            ScanType::Delivery => ShipmentStatus::Delivered,
            ScanType::Transfer => ShipmentStatus::InTransit,
        }
    }
}

// Evento de leitura (imutável)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct QrScan {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub scan_type: ScanType,
    pub qr_data: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

// Leitura enviada pelo app. Coordenadas são opcionais no JSON, mas obrigatórias
// para a leitura ser aceita.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanPayload {
    pub shipment_id: Option<Uuid>,
    #[validate(length(min = 1, message = "qr_data_required"))]
    pub qr_data: String,
    pub scan_type: ScanType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanOutcome {
    pub scan: QrScan,
    pub shipment: Shipment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_type_mapping() {
        assert_eq!(ScanType::Pickup.derived_status(), ShipmentStatus::PickedUp);
        assert_eq!(ScanType::Delivery.derived_status(), ShipmentStatus::Delivered);
        assert_eq!(ScanType::Transfer.derived_status(), ShipmentStatus::InTransit);
    }

    #[test]
    fn pickup_rescan_after_delivery_is_a_regression() {
        let derived = ScanType::Pickup.derived_status();
        assert!(!ShipmentStatus::Delivered.can_transition_to(derived));
    }
}
