// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta o roteador completo (rotas públicas + protegidas + docs).
pub fn app(app_state: AppState) -> Router {
    // Define as rotas públicas
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    let auth_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/reset-password", post(handlers::auth::reset_password));

    let admin_routes = Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/pending-users", get(handlers::admin::list_pending_users))
        .route("/users/{id}", delete(handlers::admin::delete_user))
        .route("/users/{id}/approve", put(handlers::admin::approve_user))
        .route("/users/{id}/disable", put(handlers::admin::set_user_active))
        .route("/create-user", post(handlers::admin::create_user))
        .route("/dashboard", get(handlers::admin::get_dashboard))
        .route("/drivers-locations", get(handlers::admin::drivers_locations))
        .route("/shipments", get(handlers::admin::list_all_shipments))
        .route("/shipments/{id}", delete(handlers::shipments::delete_shipment))
        .route("/shipments/{id}/assign", put(handlers::shipments::assign_driver));

    let location_routes = Router::new()
        .route("/update", post(handlers::location::update_location))
        .route("/gps-disabled", post(handlers::location::gps_disabled))
        .route("/drivers", get(handlers::location::active_drivers))
        .route("/driver/{id}", get(handlers::location::driver_location));

    let shipment_routes = Router::new()
        .route(
            "/",
            post(handlers::shipments::create_shipment).get(handlers::shipments::list_shipments),
        )
        .route("/track/{tracking_number}", get(handlers::shipments::track_shipment))
        .route(
            "/{id}",
            get(handlers::shipments::get_shipment).delete(handlers::shipments::delete_shipment),
        )
        .route("/{id}/history", get(handlers::shipments::shipment_history))
        .route("/{id}/qr", get(handlers::shipments::shipment_qr))
        .route("/{id}/status", put(handlers::shipments::update_status))
        .route("/{id}/assign", put(handlers::shipments::assign_driver));

    let qr_routes = Router::new()
        .route("/scan", post(handlers::qr::scan))
        .route("/scans/{shipment_id}", get(handlers::qr::list_scans));

    let complaint_routes = Router::new()
        .route(
            "/",
            post(handlers::complaints::create_complaint).get(handlers::complaints::list_complaints),
        )
        .route("/mine", get(handlers::complaints::my_complaints))
        .route("/{id}", put(handlers::complaints::update_complaint));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/read-all", put(handlers::notifications::mark_all_read))
        .route("/{id}/read", put(handlers::notifications::mark_read));

    // Tudo abaixo exige token válido
    let protected_routes = Router::new()
        .route("/api/user/profile", get(handlers::auth::get_me))
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/location", location_routes)
        .nest("/api/shipments", shipment_routes)
        .nest("/api/qr", qr_routes)
        .nest("/api/complaints", complaint_routes)
        .nest("/api/notifications", notification_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
