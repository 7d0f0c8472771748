// src/models/complaint.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "complaint_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl ComplaintPriority {
    pub const ALL: [ComplaintPriority; 4] = [
        ComplaintPriority::Low,
        ComplaintPriority::Medium,
        ComplaintPriority::High,
        ComplaintPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "low",
            ComplaintPriority::Medium => "medium",
            ComplaintPriority::High => "high",
            ComplaintPriority::Urgent => "urgent",
        }
    }

    /// Ordem da fila de triagem (1 = primeiro).
    pub fn rank(&self) -> u8 {
        match self {
            ComplaintPriority::Urgent => 1,
            ComplaintPriority::High => 2,
            ComplaintPriority::Medium => 3,
            ComplaintPriority::Low => 4,
        }
    }

    /// Nomes na ordem da triagem, para o `ORDER BY array_position(...)`.
    pub fn triage_order() -> Vec<&'static str> {
        let mut all = Self::ALL;
        all.sort_by_key(|p| p.rank());
        all.iter().map(|p| p.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "complaint_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: Uuid,
    // Papel no momento do envio
    pub user_role: UserRole,
    pub shipment_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    #[schema(example = "delay")]
    pub complaint_type: String,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub assigned_to: Option<Uuid>,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ComplaintListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub complaint: Complaint,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub tracking_number: Option<String>,
}

/// Campos opcionais da atualização; `None` mantém o valor atual.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ComplaintChanges {
    pub status: Option<ComplaintStatus>,
    pub priority: Option<ComplaintPriority>,
    pub assigned_to: Option<Uuid>,
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComplaintPayload {
    #[validate(length(min = 1, max = 200, message = "title_required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description_required"))]
    pub description: String,
    /// Padrão: `other`
    pub complaint_type: Option<String>,
    /// Padrão: `medium`
    pub priority: Option<ComplaintPriority>,
    pub shipment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComplaintListQuery {
    pub status: Option<ComplaintStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_rank_order() {
        assert_eq!(
            ComplaintPriority::triage_order(),
            vec!["urgent", "high", "medium", "low"]
        );
    }

    #[test]
    fn names_match_postgres_labels() {
        for priority in ComplaintPriority::ALL {
            assert_eq!(serde_json::to_value(priority).unwrap(), priority.as_str());
        }
    }

    #[test]
    fn default_priority_is_medium() {
        assert_eq!(ComplaintPriority::default(), ComplaintPriority::Medium);
    }
}
