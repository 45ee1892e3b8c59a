//! Bistro server entry-point: loads settings, migrates the database and
//! serves the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bistro::inbound::http::health::HealthState;
use bistro::inbound::http::session_config::{BuildMode, session_settings_from_env};
use bistro::outbound::persistence::{DbPool, run_pending_migrations};
use bistro::settings::AppSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let settings = AppSettings::load().map_err(|err| startup_error("invalid settings", err))?;
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(|err| startup_error("invalid session settings", err))?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let database_url = settings
        .database_url(&env)
        .map_err(|err| startup_error("invalid settings", err))?;
    let applied = run_pending_migrations(&database_url)
        .await
        .map_err(|err| startup_error("database migration failed", err))?;
    info!(applied, "database schema up to date");
    let db_pool = DbPool::new(settings.pool_config(database_url))
        .await
        .map_err(|err| startup_error("database pool setup failed", err))?;
    let pool = db_pool.status();
    info!(
        connections = pool.connections,
        idle = pool.idle_connections,
        "database pool ready"
    );

    let config = ServerConfig::from_settings(&settings, session, db_pool)
        .map_err(|err| startup_error("invalid settings", err))?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
