// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::reset_password,

        // --- Admin ---
        handlers::admin::list_users,
        handlers::admin::list_pending_users,
        handlers::admin::approve_user,
        handlers::admin::set_user_active,
        handlers::admin::delete_user,
        handlers::admin::create_user,
        handlers::admin::get_dashboard,
        handlers::admin::drivers_locations,
        handlers::admin::list_all_shipments,

        // --- Location ---
        handlers::location::update_location,
        handlers::location::gps_disabled,
        handlers::location::active_drivers,
        handlers::location::driver_location,

        // --- Shipments ---
        handlers::shipments::create_shipment,
        handlers::shipments::list_shipments,
        handlers::shipments::get_shipment,
        handlers::shipments::track_shipment,
        handlers::shipments::shipment_history,
        handlers::shipments::shipment_qr,
        handlers::shipments::update_status,
        handlers::shipments::assign_driver,
        handlers::shipments::delete_shipment,

        // --- QR ---
        handlers::qr::scan,
        handlers::qr::list_scans,

        // --- Complaints ---
        handlers::complaints::create_complaint,
        handlers::complaints::list_complaints,
        handlers::complaints::my_complaints,
        handlers::complaints::update_complaint,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::ResetPasswordPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::ApproveUserPayload,
            models::auth::SetActivePayload,

            // --- Location ---
            models::location::DriverLocation,
            models::location::ActiveDriver,
            models::location::UpdateLocationPayload,
            models::location::GpsDisabledPayload,

            // --- Shipments ---
            models::shipment::ShipmentStatus,
            models::shipment::Shipment,
            models::shipment::ShipmentListItem,
            models::shipment::StatusHistoryEntry,
            models::shipment::CreateShipmentPayload,
            models::shipment::UpdateStatusPayload,
            models::shipment::AssignDriverPayload,

            // --- QR ---
            models::qr::ScanType,
            models::qr::QrScan,
            models::qr::ScanPayload,
            models::qr::ScanOutcome,

            // --- Complaints ---
            models::complaint::ComplaintPriority,
            models::complaint::ComplaintStatus,
            models::complaint::Complaint,
            models::complaint::ComplaintListItem,
            models::complaint::CreateComplaintPayload,
            models::complaint::ComplaintChanges,

            // --- Notifications / Dashboard ---
            models::notification::Notification,
            models::dashboard::DashboardStats,
            models::dashboard::DashboardOverview,
        )
    ),
    tags(
        (name = "Health", description = "Liveness e banco"),
        (name = "Auth", description = "Cadastro, login e perfil"),
        (name = "Admin", description = "Usuários, aprovações e painel"),
        (name = "Location", description = "Rastreamento GPS dos motoristas"),
        (name = "Shipments", description = "Ciclo de vida das remessas"),
        (name = "QR", description = "Leituras de QR com prova de GPS"),
        (name = "Complaints", description = "Reclamações e fila de triagem"),
        (name = "Notifications", description = "Caixa de notificações")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
