// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{location::ActiveDriver, shipment::ShipmentListItem};

// 1. Os cards do topo
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub active_drivers: i64,
    pub total_clients: i64,
    pub active_shipments: i64, // tudo que não está delivered/cancelled
    pub open_complaints: i64,
    pub pending_approvals: i64,
}

// 2. Visão completa do painel
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub recent_shipments: Vec<ShipmentListItem>,
    pub active_drivers: Vec<ActiveDriver>,
}
