// src/services/shipment_service.rs

use chrono::{DateTime, Utc};
use qrcode::{render::svg, QrCode};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        i18n::{I18nStore, DEFAULT_LANG},
    },
    db::{
        shipment_repo::{NewShipment, ShipmentFilter},
        NotificationRepository, ShipmentRepository, UserRepository,
    },
    models::{
        auth::UserRole,
        location::coordinates_in_range,
        notification::TYPE_SHIPMENT_ASSIGNED,
        shipment::{
            CreateShipmentPayload, Shipment, ShipmentListItem, ShipmentStatus, StatusChange,
            StatusHistoryEntry, UpdateStatusPayload,
        },
    },
};

/// `SHP-AAAAMMDD-XXXXXXXX` (sufixo hex aleatório, maiúsculo).
pub fn generate_tracking_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SHP-{}-{}", now.format("%Y%m%d"), suffix)
}

// Token opaco impresso no QR da etiqueta
fn generate_qr_token() -> String {
    Uuid::new_v4().simple().to_string()
}

// Dono, motorista atribuído ou admin
fn ensure_visible(shipment: &Shipment, user_id: Uuid, role: UserRole) -> Result<(), AppError> {
    if shipment.is_visible_to(user_id, role) {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

fn ensure_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    if let (Some(lat), Some(lng)) = (latitude, longitude) {
        if !coordinates_in_range(lat, lng) {
            return Err(AppError::InvalidInput("coordinates_out_of_range"));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ShipmentService {
    shipment_repo: ShipmentRepository,
    user_repo: UserRepository,
    notification_repo: NotificationRepository,
    i18n_store: I18nStore,
    strict_transitions: bool,
    pool: PgPool,
}

impl ShipmentService {
    pub fn new(
        shipment_repo: ShipmentRepository,
        user_repo: UserRepository,
        notification_repo: NotificationRepository,
        i18n_store: I18nStore,
        strict_transitions: bool,
        pool: PgPool,
    ) -> Self {
        Self {
            shipment_repo,
            user_repo,
            notification_repo,
            i18n_store,
            strict_transitions,
            pool,
        }
    }

    /// Cliente cria para si mesmo; admin informa o cliente e, opcionalmente, o motorista.
    /// A criação não grava histórico.
    pub async fn create(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        payload: &CreateShipmentPayload,
    ) -> Result<Shipment, AppError> {
        ensure_coordinates(payload.pickup_lat, payload.pickup_lng)?;
        ensure_coordinates(payload.destination_lat, payload.destination_lng)?;

        let (customer_id, driver_id) = if actor_role.is_admin() {
            let customer_id = payload.customer_id.ok_or(AppError::InvalidInput("customer_required"))?;
            (customer_id, payload.driver_id)
        } else {
            (actor_id, None)
        };

        let status = if driver_id.is_some() {
            ShipmentStatus::Assigned
        } else {
            ShipmentStatus::Pending
        };

        let tracking_number = generate_tracking_number(Utc::now());
        let qr_code = generate_qr_token();

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Cliente precisa existir
        self.user_repo
            .find_by_id_in(&mut *tx, customer_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // 2. Motorista (se houver) precisa estar apto
        if let Some(driver_id) = driver_id {
            self.ensure_assignable(&mut tx, driver_id).await?;
        }

        // 3. Remessa
        let shipment = self
            .shipment_repo
            .create(
                &mut *tx,
                NewShipment {
                    tracking_number: &tracking_number,
                    qr_code: &qr_code,
                    customer_id,
                    driver_id,
                    status,
                    recipient_name: &payload.recipient_name,
                    recipient_phone: payload.recipient_phone.as_deref(),
                    pickup_address: &payload.pickup_address,
                    pickup_lat: payload.pickup_lat,
                    pickup_lng: payload.pickup_lng,
                    destination_address: &payload.destination_address,
                    destination_lat: payload.destination_lat,
                    destination_lng: payload.destination_lng,
                    description: payload.description.as_deref(),
                    weight: payload.weight,
                    cost: payload.cost,
                    notes: payload.notes.as_deref(),
                },
            )
            .await?;

        // 4. Aviso ao motorista
        if let Some(driver_id) = driver_id {
            self.notify_assignment(&mut tx, driver_id, &shipment).await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("📦 Remessa {} criada ({})", shipment.tracking_number, shipment.status);
        Ok(shipment)
    }

    /// Cliente vê as suas, motorista as atribuídas a ele, admin todas.
    pub async fn list(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        status: Option<ShipmentStatus>,
    ) -> Result<Vec<ShipmentListItem>, AppError> {
        let filter = match actor_role {
            UserRole::Client => ShipmentFilter {
                customer_id: Some(actor_id),
                status,
                ..Default::default()
            },
            UserRole::Driver => ShipmentFilter {
                driver_id: Some(actor_id),
                status,
                ..Default::default()
            },
            UserRole::Admin | UserRole::SuperAdmin => ShipmentFilter {
                status,
                ..Default::default()
            },
        };

        self.shipment_repo.list(&self.pool, filter, None).await
    }

    pub async fn get(&self, id: Uuid, actor_id: Uuid, actor_role: UserRole) -> Result<Shipment, AppError> {
        let shipment = self
            .shipment_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ShipmentNotFound)?;

        ensure_visible(&shipment, actor_id, actor_role)?;
        Ok(shipment)
    }

    pub async fn track(
        &self,
        tracking_number: &str,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<Shipment, AppError> {
        let shipment = self
            .shipment_repo
            .find_by_tracking_number(tracking_number)
            .await?
            .ok_or(AppError::ShipmentNotFound)?;

        ensure_visible(&shipment, actor_id, actor_role)?;
        Ok(shipment)
    }

    pub async fn history(
        &self,
        id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        self.get(id, actor_id, actor_role).await?;
        self.shipment_repo.list_history(id).await
    }

    /// QR da etiqueta em SVG.
    pub async fn qr_svg(&self, id: Uuid, actor_id: Uuid, actor_role: UserRole) -> Result<String, AppError> {
        let shipment = self.get(id, actor_id, actor_role).await?;
        let code = QrCode::new(shipment.label_payload().as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(code.render::<svg::Color>().min_dimensions(240, 240).build())
    }

    /// Motorista atribuído ou admin.
    pub async fn update_status(
        &self,
        id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
        payload: UpdateStatusPayload,
    ) -> Result<Shipment, AppError> {
        ensure_coordinates(payload.latitude, payload.longitude)?;

        let mut tx = self.pool.begin().await?;

        let shipment = self.lock(&mut tx, id).await?;

        if !actor_role.is_admin() && shipment.driver_id != Some(actor_id) {
            return Err(AppError::AccessDenied);
        }

        let updated = self
            .apply_status(
                &mut tx,
                &shipment,
                StatusChange {
                    status: payload.status,
                    actor_id,
                    latitude: payload.latitude,
                    longitude: payload.longitude,
                    notes: payload.notes,
                },
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Atribui o motorista e aplica `assigned` (com histórico) na mesma transação.
    pub async fn assign(&self, id: Uuid, driver_id: Uuid, actor_id: Uuid) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;

        let shipment = self.lock(&mut tx, id).await?;
        self.ensure_assignable(&mut tx, driver_id).await?;

        self.shipment_repo.set_driver(&mut *tx, id, driver_id).await?;

        let updated = self
            .apply_status(
                &mut tx,
                &shipment,
                StatusChange {
                    status: ShipmentStatus::Assigned,
                    actor_id,
                    latitude: None,
                    longitude: None,
                    notes: None,
                },
            )
            .await?;

        self.notify_assignment(&mut tx, driver_id, &updated).await?;

        tx.commit().await?;

        tracing::info!("🚚 Remessa {} atribuída ao motorista {}", updated.tracking_number, driver_id);
        Ok(updated)
    }

    // Histórico e leituras saem junto (ON DELETE CASCADE)
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.shipment_repo.delete(&self.pool, id).await?;
        if deleted == 0 {
            return Err(AppError::ShipmentNotFound);
        }
        tracing::info!("🗑️ Remessa {} removida", id);
        Ok(())
    }

    /// Remessa pelo id ou, sem id, pelo token do QR.
    pub async fn resolve(&self, id: Option<Uuid>, qr_code: &str) -> Result<Shipment, AppError> {
        let shipment = match id {
            Some(id) => self.shipment_repo.find_by_id(id).await?,
            None => self.shipment_repo.find_by_qr_code(qr_code).await?,
        };
        shipment.ok_or(AppError::ShipmentNotFound)
    }

    // =========================================================================
    //  MUTAÇÃO DE STATUS (compartilhada com a leitura de QR)
    // =========================================================================

    pub(crate) async fn lock(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Shipment, AppError> {
        self.shipment_repo
            .find_for_update(&mut **tx, id)
            .await?
            .ok_or(AppError::ShipmentNotFound)
    }

    /// Checa a tabela de transições (modo estrito), grava o status e
    /// acrescenta uma linha de histórico. Tudo dentro da transação recebida.
    pub(crate) async fn apply_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        current: &Shipment,
        change: StatusChange,
    ) -> Result<Shipment, AppError> {
        if self.strict_transitions && !current.status.can_transition_to(change.status) {
            return Err(AppError::InvalidStatusTransition {
                from: current.status,
                to: change.status,
            });
        }

        let updated = self.shipment_repo.update_status(&mut **tx, current.id, &change).await?;
        self.shipment_repo.append_history(&mut **tx, current.id, &change).await?;

        tracing::debug!("Remessa {}: {} -> {}", current.id, current.status, updated.status);
        Ok(updated)
    }

    // Motorista ativo e aprovado
    async fn ensure_assignable(&self, tx: &mut Transaction<'_, Postgres>, driver_id: Uuid) -> Result<(), AppError> {
        let driver = self.user_repo.find_by_id_in(&mut **tx, driver_id).await?;
        match driver {
            Some(d) if d.role == UserRole::Driver && d.is_active && d.is_approved => Ok(()),
            _ => Err(AppError::InvalidInput("driver_not_assignable")),
        }
    }

    async fn notify_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver_id: Uuid,
        shipment: &Shipment,
    ) -> Result<(), AppError> {
        let title = self.i18n_store.translate(DEFAULT_LANG, "notif_shipment_assigned_title");
        let message = self.i18n_store.translate_with(
            DEFAULT_LANG,
            "notif_shipment_assigned_body",
            &[("tracking", &shipment.tracking_number)],
        );
        self.notification_repo
            .create(&mut **tx, driver_id, &title, &message, TYPE_SHIPMENT_ASSIGNED)
            .await?;
        Ok(())
    }
}
