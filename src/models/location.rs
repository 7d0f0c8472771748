// src/models/location.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::shipment::ShipmentStatus;

// Última posição conhecida do motorista (uma linha por motorista)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DriverLocation {
    pub id: Uuid,
    pub driver_id: Uuid,
    #[schema(example = 30.0444)]
    pub latitude: f64,
    #[schema(example = 31.2357)]
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<i32>,
    pub is_gps_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Leitura de posição enviada pelo app do motorista.
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<i32>,
}

impl LocationFix {
    pub fn in_range(&self) -> bool {
        coordinates_in_range(self.latitude, self.longitude)
    }
}

pub fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

// Motorista ativo na janela + remessa em andamento (se houver)
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ActiveDriver {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub driver_phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<i32>,
    pub is_gps_active: bool,
    pub updated_at: DateTime<Utc>,
    pub current_shipment_id: Option<Uuid>,
    pub current_tracking_number: Option<String>,
    pub current_shipment_status: Option<ShipmentStatus>,
}

// --- Payloads ---

// Coordenadas chegam opcionais para que a ausência vire 400 com mensagem própria
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationPayload {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<i32>,
}

impl UpdateLocationPayload {
    pub fn into_fix(self) -> Option<LocationFix> {
        Some(LocationFix {
            latitude: self.latitude?,
            longitude: self.longitude?,
            accuracy: self.accuracy,
            speed: self.speed,
            heading: self.heading,
            battery_level: self.battery_level,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GpsDisabledPayload {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActiveDriversQuery {
    /// Janela em minutos (padrão 10, máximo 1440)
    pub minutes: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_bounds() {
        assert!(coordinates_in_range(30.0444, 31.2357));
        assert!(coordinates_in_range(-90.0, 180.0));
        assert!(!coordinates_in_range(90.5, 0.0));
        assert!(!coordinates_in_range(0.0, -181.0));
        assert!(!coordinates_in_range(f64::NAN, 0.0));
    }

    #[test]
    fn fix_needs_both_coordinates() {
        let payload = UpdateLocationPayload {
            latitude: Some(30.0),
            longitude: None,
            accuracy: None,
            speed: None,
            heading: None,
            battery_level: Some(80),
        };
        assert!(payload.into_fix().is_none());
    }
}
