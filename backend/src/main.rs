//! Backend entry-point: loads configuration, prepares storage, and serves the
//! REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use anilink::inbound::http::health::HealthState;
use anilink::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppSettings, BuildMode, ServerConfig, create_server, key_fingerprint, session_settings};

fn init_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}

async fn connect_database(settings: &AppSettings, url: &str) -> color_eyre::Result<DbPool> {
    if settings.migrations_enabled() {
        run_pending_migrations(url)
            .await
            .wrap_err("apply database migrations")?;
    }
    let pool = DbPool::new(PoolConfig::new(url))
        .await
        .wrap_err("build database pool")?;
    pool.ping().await.wrap_err("reach database")?;
    Ok(pool)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings =
        AppSettings::load().map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_reset_policy(settings.reset_policy());

    if let Some(url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect_database(&settings, url).await?);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::default_metrics());

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("start HTTP server")?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("HTTP server failed")
}
