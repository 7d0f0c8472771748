pub mod auth;
pub mod complaint;
pub mod dashboard;
pub mod location;
pub mod notification;
pub mod qr;
pub mod shipment;
