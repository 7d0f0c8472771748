pub mod auth;
pub mod user_service;
pub mod location_service;
pub mod shipment_service;
pub mod qr_service;
pub mod complaint_service;
pub mod dashboard_service;
