//! Configuration loading and typed config structures for the simulator.
//!
//! The canonical configuration lives in `orrery-config.yaml`. Each section
//! mirrors one concern: the Alpaca server, logging, the two devices, and
//! the settings store. Every field has a default, so an empty file (or no
//! file at all) yields a working simulator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use orrery_dome::DomeConfig;
use orrery_telescope::TelescopeConfig;
use orrery_types::InvalidConfig;

/// Environment variable overriding `server.port`.
pub const ENV_HTTP_PORT: &str = "ORRERY_HTTP_PORT";

/// Environment variable overriding `server.discovery_port`.
pub const ENV_DISCOVERY_PORT: &str = "ORRERY_DISCOVERY_PORT";

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "ORRERY_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("{source}")]
    Invalid {
        /// What failed validation.
        #[from]
        source: InvalidConfig,
    },

    /// An environment override could not be parsed.
    #[error("environment variable {name} has invalid value {value:?}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Alpaca HTTP server and discovery settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The simulated telescope.
    #[serde(default)]
    pub telescope: TelescopeConfig,

    /// The simulated dome.
    #[serde(default)]
    pub dome: DomeConfig,

    /// Where saved device settings live.
    #[serde(default)]
    pub settings: SettingsConfig,
}

impl SimulatorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ORRERY_HTTP_PORT` overrides `server.port`
    /// - `ORRERY_DISCOVERY_PORT` overrides `server.discovery_port`
    /// - `ORRERY_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, and
    /// [`ConfigError::Env`] or [`ConfigError::Invalid`] if the result is
    /// unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load `path` if it exists, otherwise start from the defaults.
    ///
    /// Environment overrides and validation apply either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty string is a valid, all-default configuration.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `ORRERY_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_HTTP_PORT) {
            self.server.port = parse_port(ENV_HTTP_PORT, value)?;
        }
        if let Some(value) = lookup(ENV_DISCOVERY_PORT) {
            self.server.discovery_port = parse_port(ENV_DISCOVERY_PORT, value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = value;
        }
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        self.telescope.validate()?;
        self.dome.validate()?;
        if self.server.port != 0 && self.server.port == self.server.discovery_port {
            return Err(InvalidConfig::new(
                "server.port and server.discovery_port must differ",
            ));
        }
        Ok(())
    }
}

fn parse_port(name: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_parse_error| ConfigError::Env { name, value })
}

/// Alpaca server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port. Alpaca's customary port is 32323.
    #[serde(default = "default_port")]
    pub port: u16,

    /// UDP discovery port. Fixed at 32227 by the Alpaca standard.
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,

    /// Answer discovery probes from other hosts. `false` answers loopback only.
    #[serde(default = "default_allow_remote")]
    pub allow_remote: bool,

    /// `ServerName` in the management description.
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// `Manufacturer` in the management description.
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// `Location` in the management description.
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            discovery_port: default_discovery_port(),
            allow_remote: default_allow_remote(),
            server_name: default_server_name(),
            manufacturer: default_manufacturer(),
            location: default_location(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

/// Settings store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Directory holding one YAML file per device.
    #[serde(default = "default_settings_directory")]
    pub directory: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            directory: default_settings_directory(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    32323
}

const fn default_discovery_port() -> u16 {
    32227
}

const fn default_allow_remote() -> bool {
    true
}

fn default_server_name() -> String {
    "Orrery Alpaca Simulator".to_owned()
}

fn default_manufacturer() -> String {
    "Orrery".to_owned()
}

fn default_location() -> String {
    "Simulated Observatory".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_settings_directory() -> PathBuf {
    PathBuf::from("orrery-settings")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use orrery_types::AlignmentMode;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 32323);
        assert_eq!(config.server.discovery_port, 32227);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 11111
  allow_remote: false
  location: "Backyard"

logging:
  level: debug
  format: json

telescope:
  alignment: alt_az
  latitude: -33.9
  slew_rates:
    fast: 10.0
    medium: 1.0
    slow: 0.25

dome:
  azimuth_rate: 6.0
  latch_mode: fragile

settings:
  directory: /tmp/orrery
"#;
        let config: SimulatorConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 11111);
        assert!(!config.server.allow_remote);
        assert_eq!(config.server.manufacturer, "Orrery");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.telescope.alignment, AlignmentMode::AltAz);
        assert!((config.telescope.slew_rates.slow - 0.25).abs() < f64::EPSILON);
        assert!((config.dome.azimuth_rate - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.settings.directory, PathBuf::from("/tmp/orrery"));
    }

    #[test]
    fn parse_empty_yaml() {
        let config: SimulatorConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_HTTP_PORT, "4000"),
            (ENV_DISCOVERY_PORT, " 4001 "),
            (ENV_LOG_LEVEL, "trace"),
        ]
        .into_iter()
        .collect();

        let mut config = SimulatorConfig::default();
        config
            .apply_overrides_from(|name| env.get(name).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.discovery_port, 4001);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn bad_env_port_is_reported() {
        let mut config = SimulatorConfig::default();
        let err = config
            .apply_overrides_from(|name| (name == ENV_HTTP_PORT).then(|| "http".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: ENV_HTTP_PORT, .. }));
    }

    #[test]
    fn invalid_sections_are_rejected() {
        let yaml = "dome:\n  min_altitude: 50\n  max_altitude: 10\n";
        let config: SimulatorConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(SimulatorConfig::load(&path).is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("orrery-config.yaml");
        if path.exists() {
            let config = SimulatorConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
