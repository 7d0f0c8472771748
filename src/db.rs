pub mod user_repo;
pub use user_repo::UserRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod shipment_repo;
pub use shipment_repo::ShipmentRepository;
pub mod qr_repo;
pub use qr_repo::QrRepository;
pub mod complaint_repo;
pub use complaint_repo::ComplaintRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
