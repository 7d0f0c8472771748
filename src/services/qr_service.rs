// src/services/qr_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{qr_repo::NewScan, QrRepository},
    models::{
        auth::UserRole,
        location::coordinates_in_range,
        qr::{QrScan, ScanOutcome, ScanPayload},
        shipment::StatusChange,
    },
    services::shipment_service::ShipmentService,
};

// A leitura é a prova de presença física: sem GPS não existe leitura.
fn require_fix(latitude: Option<f64>, longitude: Option<f64>) -> Result<(f64, f64), AppError> {
    let (Some(lat), Some(lng)) = (latitude, longitude) else {
        return Err(AppError::GpsRequired);
    };
    if !coordinates_in_range(lat, lng) {
        return Err(AppError::InvalidInput("coordinates_out_of_range"));
    }
    Ok((lat, lng))
}

#[derive(Clone)]
pub struct QrService {
    qr_repo: QrRepository,
    shipment_service: ShipmentService,
    pool: PgPool,
}

impl QrService {
    pub fn new(qr_repo: QrRepository, shipment_service: ShipmentService, pool: PgPool) -> Self {
        Self { qr_repo, shipment_service, pool }
    }

    /// Registra a leitura e aplica o status derivado do tipo, numa única transação.
    pub async fn scan(&self, driver_id: Uuid, payload: ScanPayload) -> Result<ScanOutcome, AppError> {
        // 1. GPS antes de qualquer acesso ao banco
        let (latitude, longitude) = require_fix(payload.latitude, payload.longitude)?;

        // 2. Resolve a remessa (id explícito ou token do QR)
        let target = self
            .shipment_service
            .resolve(payload.shipment_id, &payload.qr_data)
            .await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let shipment = self.shipment_service.lock(&mut tx, target.id).await?;

        // 3. Só o motorista atribuído
        if shipment.driver_id != Some(driver_id) {
            return Err(AppError::AccessDenied);
        }

        // Com id explícito, o conteúdo lido ainda precisa ser o da etiqueta
        if !shipment.matches_label(&payload.qr_data) {
            return Err(AppError::InvalidInput("qr_mismatch"));
        }

        // 4. Evento de leitura
        let scan = self
            .qr_repo
            .insert_scan(
                &mut *tx,
                NewScan {
                    shipment_id: shipment.id,
                    driver_id,
                    scan_type: payload.scan_type,
                    qr_data: &payload.qr_data,
                    latitude,
                    longitude,
                    accuracy: payload.accuracy,
                    photo_url: payload.photo_url.as_deref(),
                    notes: payload.notes.as_deref(),
                },
            )
            .await?;

        // 5. Status derivado + histórico
        let shipment = self
            .shipment_service
            .apply_status(
                &mut tx,
                &shipment,
                StatusChange {
                    status: payload.scan_type.derived_status(),
                    actor_id: driver_id,
                    latitude: Some(latitude),
                    longitude: Some(longitude),
                    notes: payload.notes.clone(),
                },
            )
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            "📷 Leitura {:?} da remessa {} pelo motorista {}",
            scan.scan_type,
            shipment.tracking_number,
            driver_id
        );
        Ok(ScanOutcome { scan, shipment })
    }

    pub async fn list_scans(
        &self,
        shipment_id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<Vec<QrScan>, AppError> {
        self.shipment_service.get(shipment_id, actor_id, actor_role).await?;
        self.qr_repo.list_for_shipment(shipment_id).await
    }
}
