// src/db/dashboard_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::dashboard::DashboardStats};

/// Janela (minutos) que define "motorista ativo" no painel.
pub const ACTIVE_DRIVER_WINDOW_MINUTES: i32 = 10;

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // Os cinco contadores numa única ida ao banco
    pub async fn get_stats<'e, E>(&self, executor: E) -> Result<DashboardStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (active_drivers, total_clients, active_shipments, open_complaints, pending_approvals) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM driver_locations
                      WHERE is_gps_active = TRUE
                        AND updated_at >= NOW() - make_interval(mins => $1)),
                    (SELECT COUNT(*) FROM users WHERE role = 'client'),
                    (SELECT COUNT(*) FROM shipments
                      WHERE status NOT IN ('delivered', 'cancelled')),
                    (SELECT COUNT(*) FROM complaints
                      WHERE status IN ('open', 'in_progress')),
                    (SELECT COUNT(*) FROM users
                      WHERE is_approved = FALSE AND role IN ('driver', 'admin'))
                "#,
            )
            .bind(ACTIVE_DRIVER_WINDOW_MINUTES)
            .fetch_one(executor)
            .await?;

        Ok(DashboardStats {
            active_drivers,
            total_clients,
            active_shipments,
            open_complaints,
            pending_approvals,
        })
    }
}
