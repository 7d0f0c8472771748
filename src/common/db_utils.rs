// src/common/db_utils.rs

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Settings;

/// Abre a pool e tenta `SELECT 1` até o banco responder.
/// Espera fixa entre tentativas; desiste após `db_connect_retries`.
pub async fn connect_with_retry(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy(&settings.database_url)?;

    let delay = Duration::from_secs(settings.db_retry_delay_secs);
    let mut attempt = 1;

    loop {
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida (tentativa {})", attempt);
                return Ok(pool);
            }
            Err(e) if attempt < settings.db_connect_retries => {
                tracing::warn!(
                    "⏳ Banco indisponível (tentativa {}/{}): {}",
                    attempt,
                    settings.db_connect_retries,
                    e
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                return Err(e.into());
            }
        }
    }
}

/// Converte erro de violação de chave única
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
