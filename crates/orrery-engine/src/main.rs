//! Simulator binary for the Orrery observatory.
//!
//! Wires the telescope and dome engines to the Alpaca server and runs
//! until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ORRERY_CONFIG` (default `orrery-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Merge saved device settings over the configured defaults
//! 4. Build the registry and the two devices
//! 5. Spawn one tick task per device
//! 6. Bind the discovery socket and start the HTTP server
//! 7. Wait for Ctrl-C, then abort every task

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use orrery_alpaca::{AppState, bind_discovery, spawn_discovery, spawn_server};
use orrery_core::{
    Device, LogFormat, Registry, SettingsStore, SimulatorConfig, YamlSettingsStore, merge_settings,
    spawn_ticker,
};
use orrery_dome::Dome;
use orrery_telescope::Telescope;
use orrery_types::{DeviceKey, DeviceType};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the configuration file.
const ENV_CONFIG_PATH: &str = "ORRERY_CONFIG";

/// Configuration file used when `ORRERY_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "orrery-config.yaml";

/// Both devices are hosted as device number 0.
const DEVICE_NUMBER: u32 = 0;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, device construction, or binding a
/// socket fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let config_path = std::env::var_os(ENV_CONFIG_PATH)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = SimulatorConfig::load(&config_path).map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging.level, config.logging.format);

    info!(
        path = %config_path.display(),
        port = config.server.port,
        discovery_port = config.server.discovery_port,
        "orrery-engine starting"
    );

    // 3. Apply saved settings.
    let store = YamlSettingsStore::new(config.settings.directory.clone());
    let telescope_config = with_saved(
        &store,
        DeviceKey::new(DeviceType::Telescope, DEVICE_NUMBER),
        &config.telescope,
    )?;
    let dome_config = with_saved(
        &store,
        DeviceKey::new(DeviceType::Dome, DEVICE_NUMBER),
        &config.dome,
    )?;

    // 4. Build devices.
    let registry = Arc::new(Registry::new());
    let telescope = Device::new(
        DEVICE_NUMBER,
        Telescope::new(telescope_config).map_err(EngineError::from)?,
        &registry,
    );
    let dome = Device::new(
        DEVICE_NUMBER,
        Dome::new(dome_config).map_err(EngineError::from)?,
        &registry,
    );
    info!(
        telescope = %telescope.info().name,
        dome = %dome.info().name,
        "Devices created"
    );

    // 5. Tick tasks.
    let tickers = [
        spawn_ticker(
            telescope.key().to_string(),
            telescope.engine(),
            telescope.with(|t| t.tick_interval()),
        ),
        spawn_ticker(
            dome.key().to_string(),
            dome.engine(),
            dome.with(|d| d.tick_interval()),
        ),
    ];

    let settings: Arc<dyn SettingsStore> = Arc::new(store);
    let state = Arc::new(
        AppState::new(Arc::clone(&registry), config.server.clone(), settings)
            .with_telescope(telescope)
            .with_dome(dome),
    );

    // 6. Network endpoints. Discovery binds first so a port clash on
    //    either socket stops start-up before anything is served.
    let discovery_socket = bind_discovery(&config.server.host, config.server.discovery_port)
        .await
        .map_err(EngineError::from)?;
    let server = spawn_server(&config.server.host, config.server.port, Arc::clone(&state))
        .await
        .map_err(EngineError::from)?;
    let discovery = spawn_discovery(
        discovery_socket,
        server.addr.port(),
        config.server.allow_remote,
    );
    info!(addr = %server.addr, "Alpaca simulator ready");

    // 7. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|source| EngineError::Signal { source })?;
    info!("Shutdown requested");

    server.task.abort();
    discovery.abort();
    for ticker in &tickers {
        ticker.abort();
    }

    info!("orrery-engine stopped");
    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// The configured defaults with any saved settings laid over them.
fn with_saved<C>(store: &dyn SettingsStore, device: DeviceKey, defaults: &C) -> Result<C, EngineError>
where
    C: Serialize + DeserializeOwned + Clone,
{
    match store.load(device)? {
        Some(saved) => {
            info!(%device, keys = saved.len(), "Applying saved settings");
            Ok(merge_settings(defaults, &saved)?)
        }
        None => Ok(defaults.clone()),
    }
}
