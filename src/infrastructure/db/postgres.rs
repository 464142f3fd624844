use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::{
    repositories::{memory::InMemoryProjectRepo, project::ProjectRepository, sqlx_repo::SqlxProjectRepo},
    settings::AppConfig,
};

const MAX_CONNECT_RETRIES: u32 = 5;

/// Connects with retries. Every session gets `statement_timeout` so the server
/// aborts a stalled statement instead of leaving it running after the caller gives up.
pub async fn create_pool(database_url: &str, store_timeout: Duration) -> Result<PgPool, sqlx::Error> {
    let connect_options = database_url
        .parse::<PgConnectOptions>()?
        .options([("statement_timeout", statement_timeout_setting(store_timeout))]);

    let mut retry_count = 0;
    let mut wait_seconds = 2;

    loop {
        match PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(store_timeout)
            .connect_with(connect_options.clone())
            .await
        {
            Ok(pool) => {
                info!("Database connection established.");
                return Ok(pool);
            }
            Err(e) if retry_count < MAX_CONNECT_RETRIES => {
                retry_count += 1;
                warn!(
                    "Failed to connect to database (attempt {}/{}): {}. Retrying in {}s...",
                    retry_count, MAX_CONNECT_RETRIES, e, wait_seconds);

                tokio::time::sleep(Duration::from_secs(wait_seconds)).await;

                wait_seconds *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Opens the project store selected by `database_url`, applying migrations for Postgres.
pub async fn open_project_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProjectRepository>> {
    if config.uses_in_memory_store() {
        warn!("Using the in-memory project store; data is lost on restart");
        return Ok(Arc::new(InMemoryProjectRepo::new()));
    }

    let pool = create_pool(&config.database_url, Duration::from_secs(config.store_timeout_secs))
        .await
        .context("Failed to create database connection pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(SqlxProjectRepo::new(pool)))
}

fn statement_timeout_setting(store_timeout: Duration) -> String {
    format!("{}ms", store_timeout.as_millis())
}
