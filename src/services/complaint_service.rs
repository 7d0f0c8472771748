// src/services/complaint_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{complaint_repo::NewComplaint, ComplaintRepository, ShipmentRepository, UserRepository},
    models::{
        auth::UserRole,
        complaint::{
            Complaint, ComplaintChanges, ComplaintListItem, ComplaintStatus, CreateComplaintPayload,
        },
    },
};

pub const DEFAULT_COMPLAINT_TYPE: &str = "other";

#[derive(Clone)]
pub struct ComplaintService {
    repo: ComplaintRepository,
    shipment_repo: ShipmentRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ComplaintService {
    pub fn new(
        repo: ComplaintRepository,
        shipment_repo: ShipmentRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, shipment_repo, user_repo, pool }
    }

    /// Qualquer papel. O papel do autor é gravado como estava no envio.
    /// A remessa citada precisa existir e ser visível para o autor.
    pub async fn create(
        &self,
        user_id: Uuid,
        user_role: UserRole,
        payload: &CreateComplaintPayload,
    ) -> Result<Complaint, AppError> {
        let complaint_type = payload
            .complaint_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_COMPLAINT_TYPE);

        if let Some(shipment_id) = payload.shipment_id {
            let shipment = self
                .shipment_repo
                .find_by_id(shipment_id)
                .await?
                .ok_or(AppError::ShipmentNotFound)?;
            if !shipment.is_visible_to(user_id, user_role) {
                return Err(AppError::AccessDenied);
            }
        }

        let complaint = self
            .repo
            .create(
                &self.pool,
                NewComplaint {
                    user_id,
                    user_role,
                    shipment_id: payload.shipment_id,
                    title: &payload.title,
                    description: &payload.description,
                    complaint_type,
                    priority: payload.priority.unwrap_or_default(),
                },
            )
            .await?;

        tracing::info!("📝 Reclamação {} ({:?}) aberta por {}", complaint.id, complaint.priority, user_id);
        Ok(complaint)
    }

    pub async fn list_triage(&self, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintListItem>, AppError> {
        self.repo.list_triage(status).await
    }

    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<Complaint>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    // O responsável, quando informado, precisa ser uma conta administrativa
    pub async fn update(&self, id: Uuid, changes: &ComplaintChanges) -> Result<Complaint, AppError> {
        if let Some(assignee_id) = changes.assigned_to {
            let assignee = self
                .user_repo
                .find_by_id(assignee_id)
                .await?
                .ok_or(AppError::UserNotFound)?;
            if !assignee.role.is_admin() {
                return Err(AppError::InvalidInput("assignee_not_admin"));
            }
        }

        self.repo
            .update(id, changes)
            .await?
            .ok_or(AppError::ComplaintNotFound)
    }
}
