// src/models/shipment.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shipment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Assigned,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Assigned => "assigned",
            ShipmentStatus::PickedUp => "picked_up",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::OutForDelivery => "out_for_delivery",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }

    // Posição na cadeia principal. `Cancelled` fica fora dela.
    fn rank(&self) -> Option<u8> {
        match self {
            ShipmentStatus::Pending => Some(0),
            ShipmentStatus::Assigned => Some(1),
            ShipmentStatus::PickedUp => Some(2),
            ShipmentStatus::InTransit => Some(3),
            ShipmentStatus::OutForDelivery => Some(4),
            ShipmentStatus::Delivered => Some(5),
            ShipmentStatus::Cancelled => None,
        }
    }

    /// Tabela de transições (estado atual x estado pedido).
    ///
    /// * nada sai de um estado terminal;
    /// * `cancelled` é alcançável de qualquer estado não terminal;
    /// * na cadeia principal só se anda para frente (pular etapas é permitido);
    /// * reaplicar o mesmo estado não terminal é permitido (ex.: várias leituras de transferência).
    pub fn can_transition_to(&self, next: ShipmentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == ShipmentStatus::Cancelled || next == *self {
            return true;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Shipment {
    pub id: Uuid,
    #[schema(example = "SHP-20250101-1A2B3C4D")]
    pub tracking_number: String,
    pub qr_code: Option<String>,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub recipient_name: String,
    pub recipient_phone: Option<String>,
    pub pickup_address: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub destination_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>, example = 2.5)]
    pub weight: Option<Decimal>,
    #[schema(value_type = Option<f64>, example = 75.0)]
    pub cost: Option<Decimal>,
    pub status: ShipmentStatus,
    pub notes: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Dono (cliente), motorista atribuído ou admin.
    pub fn is_visible_to(&self, user_id: Uuid, role: crate::models::auth::UserRole) -> bool {
        role.is_admin() || self.customer_id == user_id || self.driver_id == Some(user_id)
    }

    /// Conteúdo impresso no QR da etiqueta.
    pub fn label_payload(&self) -> &str {
        self.qr_code.as_deref().unwrap_or(&self.tracking_number)
    }

    /// Leitura confere com a etiqueta (token do QR ou número de rastreio digitado).
    pub fn matches_label(&self, qr_data: &str) -> bool {
        let qr_data = qr_data.trim();
        qr_data == self.label_payload() || qr_data == self.tracking_number
    }
}

// Remessa + nomes das pessoas envolvidas (listas do painel)
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ShipmentListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub shipment: Shipment,
    pub customer_name: Option<String>,
    pub driver_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub status: ShipmentStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Efeitos de uma mudança de status (quem, onde, observação).
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ShipmentStatus,
    pub actor_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

// --- Payloads ---

// Nova remessa. `customer_id`/`driver_id` só valem quando quem cria é admin.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShipmentPayload {
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "recipient_required"))]
    pub recipient_name: String,
    pub recipient_phone: Option<String>,
    #[validate(length(min = 1, message = "address_required"))]
    pub pickup_address: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    #[validate(length(min = 1, message = "address_required"))]
    pub destination_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: ShipmentStatus,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDriverPayload {
    pub driver_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShipmentListQuery {
    pub status: Option<ShipmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::ShipmentStatus::*;
    use super::*;

    const ALL: [ShipmentStatus; 7] = [
        Pending,
        Assigned,
        PickedUp,
        InTransit,
        OutForDelivery,
        Delivered,
        Cancelled,
    ];

    #[test]
    fn forward_moves_are_allowed() {
        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(PickedUp));
        assert!(PickedUp.can_transition_to(InTransit));
        assert!(InTransit.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Delivered));
        // pular etapas
        assert!(Assigned.can_transition_to(Delivered));
    }

    #[test]
    fn backward_moves_are_rejected() {
        assert!(!InTransit.can_transition_to(PickedUp));
        assert!(!Assigned.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn cancel_from_any_open_state() {
        for from in ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(Cancelled), "{} -> cancelled", from);
        }
    }

    #[test]
    fn same_state_only_while_open() {
        assert!(InTransit.can_transition_to(InTransit));
        assert!(!Delivered.can_transition_to(Delivered));
    }

    #[test]
    fn serde_and_display_agree() {
        for status in ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    fn labelled(qr_code: Option<&str>) -> Shipment {
        let now = Utc::now();
        Shipment {
            id: Uuid::new_v4(),
            tracking_number: "SHP-20250309-0A1B2C3D".into(),
            qr_code: qr_code.map(String::from),
            customer_id: Uuid::new_v4(),
            driver_id: None,
            recipient_name: "Sara".into(),
            recipient_phone: None,
            pickup_address: "Cairo".into(),
            pickup_lat: None,
            pickup_lng: None,
            destination_address: "Giza".into(),
            destination_lat: None,
            destination_lng: None,
            description: None,
            weight: None,
            cost: None,
            status: Assigned,
            notes: None,
            delivered_at: None,
            delivery_lat: None,
            delivery_lng: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn scan_must_match_label() {
        let shipment = labelled(Some("9f2c4e"));
        assert!(shipment.matches_label("9f2c4e"));
        assert!(shipment.matches_label(" SHP-20250309-0A1B2C3D "));
        assert!(!shipment.matches_label("anything"));

        let legacy = labelled(None);
        assert_eq!(legacy.label_payload(), "SHP-20250309-0A1B2C3D");
        assert!(!legacy.matches_label(""));
    }
}
