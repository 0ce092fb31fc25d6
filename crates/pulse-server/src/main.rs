//! Urban Pulse server binary.
//!
//! Wires the event store, map service clients and risk settings into the
//! HTTP API and serves it until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pulse-config.yaml` (or `PULSE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the event store, migrating and seeding as configured
//! 4. Build the route provider and geocoder
//! 5. Serve the API
//! 6. Close the database pool

mod config;
mod error;
mod wiring;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pulse_api::{AppState, RiskSettings, ServerConfig, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingSection, PulseConfig};
use crate::error::StartupError;

/// Config file read when `PULSE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "pulse-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a dependency cannot be
/// reached at startup, or the listener fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so the outcome is
    //    reported after step 2.
    let (config, loaded_from) = load_config().context("failed to load configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("pulse-server starting");
    match &loaded_from {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    run(config).await.context("pulse-server failed")
}

async fn run(config: PulseConfig) -> Result<(), StartupError> {
    // 3. Event store.
    let (store, pool) = wiring::build_store(&config.store).await?;

    // 4. Map services.
    let routes = wiring::build_route_provider(&config.providers)?;
    let geocoder = wiring::build_geocoder(&config.providers)?;

    let risk = RiskSettings {
        radius_meters: config.risk.radius_meters,
        default_since_hours: config.risk.default_since_hours,
    };
    info!(
        radius_meters = risk.radius_meters,
        default_since_hours = risk.default_since_hours,
        "Risk settings"
    );
    let state = Arc::new(AppState::new(store, routes, geocoder).with_risk(risk));

    // 5. Serve.
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    let served = start_server(&server_config, state).await;

    // 6. Release database connections whether or not serving failed.
    if let Some(pool) = pool {
        pool.close().await;
    }
    served?;

    info!("pulse-server stopped");
    Ok(())
}

/// Load configuration from `PULSE_CONFIG` or the default path.
///
/// A missing file at the default path means defaults plus environment
/// overrides. An explicitly named file must exist.
fn load_config() -> Result<(PulseConfig, Option<PathBuf>), ConfigError> {
    let (path, explicit) = std::env::var("PULSE_CONFIG").map_or_else(
        |_| (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        |p| (PathBuf::from(p), true),
    );

    if explicit || path.exists() {
        let config = PulseConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((PulseConfig::from_env()?, None))
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
