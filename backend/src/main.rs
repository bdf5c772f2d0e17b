//! Backend entry-point: loads configuration, seeds the admin account and
//! serves the REST API with OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use biblioteka::inbound::http::health::HealthState;
use biblioteka::inbound::http::session_config::fingerprint::key_fingerprint;
use biblioteka::inbound::http::session_config::{BuildMode, session_settings_from_env};

use server::{ServerConfig, ServerSettings, Services, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let mode = BuildMode::from_debug_assertions();
    let session = session_settings_from_env(&DefaultEnv::new(), mode)
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        ttl_secs = session.ttl.as_secs(),
        "session key loaded"
    );

    let services = Services::in_memory(&settings)?;
    services.bootstrap_admin(&settings, mode).await?;

    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(session, bind_addr),
        services.http_state(),
    )
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated")?;
    Ok(())
}
