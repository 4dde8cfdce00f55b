use anyhow::{Context, Result};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::AppConfig;

/// Schema migrations embedded from `./migrations`; applied versions are
/// tracked in `_sqlx_migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn connect(config: &AppConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    info!(count = MIGRATOR.iter().count(), "database migrations up to date");
    Ok(())
}
