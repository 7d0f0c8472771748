// Fluxos que precisam de Postgres. Rodar com:
//   DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use logistics_backend::{
    app,
    common::error::AppError,
    models::{
        auth::UserRole,
        complaint::{ComplaintChanges, ComplaintPriority, ComplaintStatus, CreateComplaintPayload},
        location::LocationFix,
        qr::ScanPayload,
        shipment::{CreateShipmentPayload, Shipment, ShipmentStatus, UpdateStatusPayload},
    },
};

use common::{body_json, request, state_with_pool, token_for};

async fn insert_user(pool: &PgPool, phone: &str, role: UserRole, approved: bool, active: bool) -> Uuid {
    let hash = bcrypt::hash("secret123", 4).unwrap();
    sqlx::query_scalar(
        "INSERT INTO users (phone, password_hash, name, role, is_approved, is_active)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(phone)
    .bind(hash)
    .bind(format!("User {}", phone))
    .bind(role)
    .bind(approved)
    .bind(active)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn shipment_payload(customer_id: Uuid, driver_id: Option<Uuid>) -> CreateShipmentPayload {
    serde_json::from_value(json!({
        "customer_id": customer_id,
        "driver_id": driver_id,
        "recipient_name": "Sara",
        "pickup_address": "Cairo",
        "destination_address": "Giza"
    }))
    .unwrap()
}

fn scan_payload(shipment: &Shipment, scan_type: &str, gps: bool) -> ScanPayload {
    let mut body = json!({
        "shipment_id": shipment.id,
        "qr_data": shipment.label_payload(),
        "scan_type": scan_type
    });
    if gps {
        body["latitude"] = json!(30.05);
        body["longitude"] = json!(31.23);
    }
    serde_json::from_value(body).unwrap()
}

async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn location_upsert_keeps_one_row(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let driver = insert_user(&pool, "0100000001", UserRole::Driver, true, true).await;

    for lat in [30.0, 30.1, 30.2] {
        let fix = LocationFix {
            latitude: lat,
            longitude: 31.0,
            accuracy: None,
            speed: None,
            heading: None,
            battery_level: Some(80),
        };
        state.location_service.update_location(driver, fix).await.unwrap();
    }

    let rows = count(&pool, "SELECT COUNT(*) FROM driver_locations WHERE driver_id = $1", driver).await;
    assert_eq!(rows, 1);

    let active = state.location_service.list_active_drivers(10).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn history_grows_once_per_mutation(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000002", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000003", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000004", UserRole::Driver, true, true).await;

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, None))
        .await
        .unwrap();
    assert_eq!(shipment.status, ShipmentStatus::Pending);
    assert!(shipment.tracking_number.starts_with("SHP-"));

    let sql = "SELECT COUNT(*) FROM shipment_status_history WHERE shipment_id = $1";
    assert_eq!(count(&pool, sql, shipment.id).await, 0);

    state.shipment_service.assign(shipment.id, driver, admin).await.unwrap();
    state
        .qr_service
        .scan(driver, scan_payload(&shipment, "pickup", true))
        .await
        .unwrap();
    let delivered = state
        .shipment_service
        .update_status(
            shipment.id,
            driver,
            UserRole::Driver,
            UpdateStatusPayload {
                status: ShipmentStatus::Delivered,
                notes: None,
                latitude: Some(30.0),
                longitude: Some(31.0),
            },
        )
        .await
        .unwrap();

    assert_eq!(delivered.status, ShipmentStatus::Delivered);
    assert!(delivered.delivered_at.is_some());
    assert_eq!(count(&pool, sql, shipment.id).await, 3);

    // o motorista foi notificado da atribuição
    let notified = count(&pool, "SELECT COUNT(*) FROM notifications WHERE user_id = $1", driver).await;
    assert_eq!(notified, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn pickup_rescan_after_delivery_is_rejected(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000005", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000006", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000007", UserRole::Driver, true, true).await;

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
        .await
        .unwrap();
    assert_eq!(shipment.status, ShipmentStatus::Assigned);

    state.qr_service.scan(driver, scan_payload(&shipment, "delivery", true)).await.unwrap();
    let err = state
        .qr_service
        .scan(driver, scan_payload(&shipment, "pickup", true))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidStatusTransition { .. }));
    let scans = count(&pool, "SELECT COUNT(*) FROM qr_scans WHERE shipment_id = $1", shipment.id).await;
    assert_eq!(scans, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn scan_without_gps_writes_nothing(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000008", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000009", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000010", UserRole::Driver, true, true).await;

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
        .await
        .unwrap();

    let err = state
        .qr_service
        .scan(driver, scan_payload(&shipment, "pickup", false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::GpsRequired));

    let scans = count(&pool, "SELECT COUNT(*) FROM qr_scans WHERE shipment_id = $1", shipment.id).await;
    let history = count(
        &pool,
        "SELECT COUNT(*) FROM shipment_status_history WHERE shipment_id = $1",
        shipment.id,
    )
    .await;
    assert_eq!((scans, history), (0, 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn foreign_driver_cannot_touch_shipment(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000011", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000012", UserRole::Client, true, true).await;
    let owner = insert_user(&pool, "0100000013", UserRole::Driver, true, true).await;
    let intruder = insert_user(&pool, "0100000014", UserRole::Driver, true, true).await;

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(owner)))
        .await
        .unwrap();

    let scan_err = state
        .qr_service
        .scan(intruder, scan_payload(&shipment, "pickup", true))
        .await
        .unwrap_err();
    assert!(matches!(scan_err, AppError::AccessDenied));

    let status_err = state
        .shipment_service
        .update_status(
            shipment.id,
            intruder,
            UserRole::Driver,
            UpdateStatusPayload {
                status: ShipmentStatus::InTransit,
                notes: None,
                latitude: None,
                longitude: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(status_err, AppError::AccessDenied));

    let unchanged = state.shipment_service.resolve(Some(shipment.id), "").await.unwrap();
    assert_eq!(unchanged.status, ShipmentStatus::Assigned);
    let scans = count(&pool, "SELECT COUNT(*) FROM qr_scans WHERE shipment_id = $1", shipment.id).await;
    assert_eq!(scans, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unapproved_driver_cannot_be_assigned(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000015", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000016", UserRole::Client, true, true).await;
    let pending = insert_user(&pool, "0100000017", UserRole::Driver, false, true).await;

    let err = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(pending)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput("driver_not_assignable")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn login_reports_account_state(pool: PgPool) {
    insert_user(&pool, "0100000018", UserRole::Driver, false, true).await;
    insert_user(&pool, "0100000019", UserRole::Driver, true, false).await;
    let router = app(state_with_pool(pool));

    let pending = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "phone": "0100000018", "password": "secret123" })),
        ))
        .await
        .unwrap();
    assert_eq!(pending.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(pending).await["pendingApproval"], true);

    let disabled = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "phone": "0100000019", "password": "secret123" })),
        ))
        .await
        .unwrap();
    assert_eq!(disabled.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(disabled).await["accountDisabled"], true);

    // senha errada não revela o estado da conta
    let wrong = router
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "phone": "0100000018", "password": "nope-nope" })),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(wrong).await.get("pendingApproval").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn duplicate_phone_is_conflict(pool: PgPool) {
    let router = app(state_with_pool(pool.clone()));
    let register = |name: &str| {
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "phone": "0100000020", "password": "secret123", "name": name, "role": "client" })),
        )
    };

    let first = router.clone().oneshot(register("First")).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = body_json(first).await;
    assert!(body["token"].is_string());

    let second = router.oneshot(register("Second")).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let name: String = sqlx::query_scalar("SELECT name FROM users WHERE phone = '0100000020'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "First");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn driver_registration_waits_for_approval(pool: PgPool) {
    let router = app(state_with_pool(pool));

    let response = router
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "phone": "0100000021", "password": "secret123", "name": "Omar" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["pendingApproval"], true);
    assert!(body.get("token").is_none());
}

fn complaint(title: &str, priority: ComplaintPriority, shipment_id: Option<Uuid>) -> CreateComplaintPayload {
    CreateComplaintPayload {
        title: title.into(),
        description: "details".into(),
        complaint_type: None,
        priority: Some(priority),
        shipment_id,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn triage_orders_by_priority_then_newest(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let client = insert_user(&pool, "0100000022", UserRole::Client, true, true).await;

    for (title, priority) in [
        ("urgent", ComplaintPriority::Urgent),
        ("low", ComplaintPriority::Low),
        ("high older", ComplaintPriority::High),
        ("medium", ComplaintPriority::Medium),
        ("high newer", ComplaintPriority::High),
    ] {
        state
            .complaint_service
            .create(client, UserRole::Client, &complaint(title, priority, None))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let queue = state.complaint_service.list_triage(None).await.unwrap();
    let titles: Vec<&str> = queue.iter().map(|c| c.complaint.title.as_str()).collect();
    assert_eq!(titles, vec!["urgent", "high newer", "high older", "medium", "low"]);

    let mine = state.complaint_service.list_mine(client).await.unwrap();
    assert_eq!(mine.len(), 5);
    assert_eq!(mine[0].title, "high newer");
    assert!(mine.iter().all(|c| c.complaint_type == "other"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn complaint_update_changes_only_given_fields(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000027", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000028", UserRole::Client, true, true).await;

    let created = state
        .complaint_service
        .create(client, UserRole::Client, &complaint("late", ComplaintPriority::High, None))
        .await
        .unwrap();
    assert_eq!(created.status, ComplaintStatus::Open);

    let in_progress = state
        .complaint_service
        .update(
            created.id,
            &ComplaintChanges {
                status: Some(ComplaintStatus::InProgress),
                priority: None,
                assigned_to: Some(admin),
                resolution_notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.priority, ComplaintPriority::High);
    assert_eq!(in_progress.assigned_to, Some(admin));
    assert!(in_progress.resolved_at.is_none());

    let resolved = state
        .complaint_service
        .update(
            created.id,
            &ComplaintChanges {
                status: Some(ComplaintStatus::Resolved),
                priority: None,
                assigned_to: None,
                resolution_notes: Some("refunded".into()),
            },
        )
        .await
        .unwrap();
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.assigned_to, Some(admin));

    let reprioritized = state
        .complaint_service
        .update(
            created.id,
            &ComplaintChanges {
                status: None,
                priority: Some(ComplaintPriority::Low),
                assigned_to: None,
                resolution_notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(reprioritized.status, ComplaintStatus::Resolved);
    assert_eq!(reprioritized.resolution_notes.as_deref(), Some("refunded"));
    assert_eq!(reprioritized.resolved_at, resolved.resolved_at);

    let missing = state
        .complaint_service
        .update(
            Uuid::new_v4(),
            &ComplaintChanges {
                status: Some(ComplaintStatus::Closed),
                priority: None,
                assigned_to: None,
                resolution_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::ComplaintNotFound));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn complaint_references_must_exist(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000029", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000030", UserRole::Client, true, true).await;
    let other_client = insert_user(&pool, "0100000031", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000032", UserRole::Driver, true, true).await;

    let unknown = state
        .complaint_service
        .create(client, UserRole::Client, &complaint("lost", ComplaintPriority::High, Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::ShipmentNotFound));

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, None))
        .await
        .unwrap();
    let foreign = state
        .complaint_service
        .create(other_client, UserRole::Client, &complaint("lost", ComplaintPriority::High, Some(shipment.id)))
        .await
        .unwrap_err();
    assert!(matches!(foreign, AppError::AccessDenied));

    let own = state
        .complaint_service
        .create(client, UserRole::Client, &complaint("lost", ComplaintPriority::High, Some(shipment.id)))
        .await
        .unwrap();

    let no_user = state
        .complaint_service
        .update(
            own.id,
            &ComplaintChanges {
                status: None,
                priority: None,
                assigned_to: Some(Uuid::new_v4()),
                resolution_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(no_user, AppError::UserNotFound));

    let not_staff = state
        .complaint_service
        .update(
            own.id,
            &ComplaintChanges {
                status: None,
                priority: None,
                assigned_to: Some(driver),
                resolution_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(not_staff, AppError::InvalidInput("assignee_not_admin")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn dashboard_counts_open_shipments(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000023", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000024", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000025", UserRole::Driver, true, true).await;
    insert_user(&pool, "0100000026", UserRole::Driver, false, true).await;

    // pending, assigned, picked_up, in_transit, out_for_delivery, delivered, cancelled
    let targets = [
        None,
        Some(ShipmentStatus::PickedUp),
        Some(ShipmentStatus::InTransit),
        Some(ShipmentStatus::OutForDelivery),
        Some(ShipmentStatus::Delivered),
        Some(ShipmentStatus::Cancelled),
    ];

    let pending = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, None))
        .await
        .unwrap();
    let assigned = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
        .await
        .unwrap();

    for target in targets.into_iter().flatten() {
        let shipment = state
            .shipment_service
            .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
            .await
            .unwrap();
        state
            .shipment_service
            .update_status(
                shipment.id,
                admin,
                UserRole::Admin,
                UpdateStatusPayload {
                    status: target,
                    notes: None,
                    latitude: None,
                    longitude: None,
                },
            )
            .await
            .unwrap();
    }

    let overview = state.dashboard_service.get_overview().await.unwrap();
    // pending, assigned, picked_up, in_transit, out_for_delivery
    assert_eq!(overview.stats.active_shipments, 5);
    assert_eq!(overview.stats.total_clients, 1);
    assert_eq!(overview.stats.pending_approvals, 1);
    assert_eq!(overview.recent_shipments.len(), 7);
    assert!(overview.recent_shipments.iter().any(|s| s.shipment.id == pending.id));
    assert!(overview.recent_shipments.iter().any(|s| s.shipment.id == assigned.id));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn gps_disabled_notifies_each_active_admin(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000033", UserRole::Admin, true, true).await;
    let super_admin = insert_user(&pool, "0100000034", UserRole::SuperAdmin, true, true).await;
    let inactive_admin = insert_user(&pool, "0100000035", UserRole::Admin, true, false).await;
    let driver = insert_user(&pool, "0100000036", UserRole::Driver, true, true).await;

    let fix = LocationFix {
        latitude: 30.0,
        longitude: 31.0,
        accuracy: None,
        speed: None,
        heading: None,
        battery_level: None,
    };
    state.location_service.update_location(driver, fix).await.unwrap();

    let location = state
        .location_service
        .mark_gps_disabled(driver, Some("battery"))
        .await
        .unwrap()
        .expect("driver has a location row");
    assert!(!location.is_gps_active);
    assert_eq!(location.latitude, 30.0);

    let sql = "SELECT COUNT(*) FROM notifications WHERE user_id = $1";
    assert_eq!(count(&pool, sql, admin).await, 1);
    assert_eq!(count(&pool, sql, super_admin).await, 1);
    assert_eq!(count(&pool, sql, inactive_admin).await, 0);
    assert_eq!(count(&pool, sql, driver).await, 0);

    // sem GPS ativo o motorista sai da lista de ativos
    let active = state.location_service.list_active_drivers(10).await.unwrap();
    assert!(active.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn client_sees_only_driver_of_open_shipment(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000037", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000038", UserRole::Client, true, true).await;
    let stranger = insert_user(&pool, "0100000039", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000040", UserRole::Driver, true, true).await;

    let fix = LocationFix {
        latitude: 30.0,
        longitude: 31.0,
        accuracy: None,
        speed: None,
        heading: None,
        battery_level: None,
    };
    state.location_service.update_location(driver, fix).await.unwrap();
    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
        .await
        .unwrap();

    let seen = state
        .location_service
        .get_driver_location(driver, client, UserRole::Client)
        .await
        .unwrap();
    assert_eq!(seen.driver_id, driver);

    let denied = state
        .location_service
        .get_driver_location(driver, stranger, UserRole::Client)
        .await
        .unwrap_err();
    assert!(matches!(denied, AppError::AccessDenied));

    state.qr_service.scan(driver, scan_payload(&shipment, "delivery", true)).await.unwrap();
    let after_delivery = state
        .location_service
        .get_driver_location(driver, client, UserRole::Client)
        .await
        .unwrap_err();
    assert!(matches!(after_delivery, AppError::AccessDenied));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn disable_and_delete_drop_sessions(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000041", UserRole::Admin, true, true).await;
    let driver = insert_user(&pool, "0100000042", UserRole::Driver, true, true).await;
    let client = insert_user(&pool, "0100000043", UserRole::Client, true, true).await;
    let router = app(state.clone());

    for phone in ["0100000042", "0100000043"] {
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "phone": phone, "password": "secret123" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let sql = "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1";
    assert_eq!(count(&pool, sql, driver).await, 1);
    assert_eq!(count(&pool, sql, client).await, 1);

    let disabled = state
        .user_service
        .set_active(admin, UserRole::Admin, driver, false)
        .await
        .unwrap();
    assert!(!disabled.is_active);
    assert_eq!(count(&pool, sql, driver).await, 0);

    state.user_service.delete_user(admin, UserRole::Admin, client).await.unwrap();
    assert_eq!(count(&pool, sql, client).await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM users WHERE id = $1", client).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn admin_cannot_take_over_super_admin(pool: PgPool) {
    let admin = insert_user(&pool, "0100000044", UserRole::Admin, true, true).await;
    let super_admin = insert_user(&pool, "0100000045", UserRole::SuperAdmin, true, true).await;
    let router = app(state_with_pool(pool.clone()));
    let token = token_for(admin, UserRole::Admin);

    let attempts = [
        request(
            "POST",
            "/api/auth/reset-password",
            Some(&token),
            Some(json!({ "phone": "0100000045", "new_password": "hijacked" })),
        ),
        request(
            "PUT",
            &format!("/api/admin/users/{}/approve", super_admin),
            Some(&token),
            Some(json!({ "role": "driver" })),
        ),
        request(
            "PUT",
            &format!("/api/admin/users/{}/disable", super_admin),
            Some(&token),
            Some(json!({ "is_active": false })),
        ),
        request("DELETE", &format!("/api/admin/users/{}", super_admin), Some(&token), None),
    ];

    for attempt in attempts {
        let response = router.clone().oneshot(attempt).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["success"], false);
    }

    let (role, active): (UserRole, bool) =
        sqlx::query_as("SELECT role, is_active FROM users WHERE id = $1")
            .bind(super_admin)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((role, active), (UserRole::SuperAdmin, true));

    let login = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "phone": "0100000045", "password": "hijacked" })),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    // o super admin continua podendo gerir admins
    let by_super = router
        .oneshot(request(
            "PUT",
            &format!("/api/admin/users/{}/disable", admin),
            Some(&token_for(super_admin, UserRole::SuperAdmin)),
            Some(json!({ "is_active": false })),
        ))
        .await
        .unwrap();
    assert_eq!(by_super.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn notification_read_is_owner_only(pool: PgPool) {
    let owner = insert_user(&pool, "0100000046", UserRole::Driver, true, true).await;
    let other = insert_user(&pool, "0100000047", UserRole::Driver, true, true).await;
    let notification: Uuid = sqlx::query_scalar(
        "INSERT INTO notifications (user_id, title, message) VALUES ($1, 't', 'm') RETURNING id",
    )
    .bind(owner)
    .fetch_one(&pool)
    .await
    .unwrap();
    let router = app(state_with_pool(pool.clone()));
    let uri = format!("/api/notifications/{}/read", notification);

    let foreign = router
        .clone()
        .oneshot(request("PUT", &uri, Some(&token_for(other, UserRole::Driver)), None))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let unread: bool = sqlx::query_scalar("SELECT is_read FROM notifications WHERE id = $1")
        .bind(notification)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!unread);

    let own = router
        .oneshot(request("PUT", &uri, Some(&token_for(owner, UserRole::Driver)), None))
        .await
        .unwrap();
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body_json(own).await["notification"]["is_read"], true);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn scan_must_match_shipment_label(pool: PgPool) {
    let state = state_with_pool(pool.clone());
    let admin = insert_user(&pool, "0100000048", UserRole::Admin, true, true).await;
    let client = insert_user(&pool, "0100000049", UserRole::Client, true, true).await;
    let driver = insert_user(&pool, "0100000050", UserRole::Driver, true, true).await;

    let shipment = state
        .shipment_service
        .create(admin, UserRole::Admin, &shipment_payload(client, Some(driver)))
        .await
        .unwrap();

    let mut forged = scan_payload(&shipment, "pickup", true);
    forged.qr_data = "printed-elsewhere".into();
    let err = state.qr_service.scan(driver, forged).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput("qr_mismatch")));
    let scans = count(&pool, "SELECT COUNT(*) FROM qr_scans WHERE shipment_id = $1", shipment.id).await;
    assert_eq!(scans, 0);

    // sem id, a remessa é achada pelo próprio token
    let mut by_token = scan_payload(&shipment, "pickup", true);
    by_token.shipment_id = None;
    let outcome = state.qr_service.scan(driver, by_token).await.unwrap();
    assert_eq!(outcome.shipment.status, ShipmentStatus::PickedUp);
}
