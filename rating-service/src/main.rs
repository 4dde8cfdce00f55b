use std::sync::Arc;

use anyhow::Context;
use common_auth::JwtConfig;
use rating_service::config::load_config;
use rating_service::repository::PgRepository;
use rating_service::{build_router, cors_layer, db, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;

    let pool = db::connect(&config).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let jwt = JwtConfig::new(config.jwt_secret.clone(), config.jwt_issuer.clone());
    let state = AppState::new(Arc::new(PgRepository::new(pool)), jwt)?;
    let app = build_router(state, cors_layer(&config)?);

    let addr = config.socket_addr()?;
    info!(%addr, "starting rating-service");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
