pub mod health;
pub mod auth;
pub mod admin;
pub mod location;
pub mod shipments;
pub mod qr;
pub mod complaints;
pub mod notifications;
