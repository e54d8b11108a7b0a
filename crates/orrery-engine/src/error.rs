//! Error types for the simulator binary.
//!
//! [`EngineError`] wraps every failure mode of start-up so `main` can
//! propagate with `?`.

/// Top-level error for the simulator binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: orrery_core::ConfigError,
    },

    /// Saved device settings could not be read or applied.
    #[error("settings error: {source}")]
    Settings {
        /// The underlying settings error.
        #[from]
        source: orrery_core::SettingsError,
    },

    /// A device rejected its configuration.
    #[error("device error: {source}")]
    Device {
        /// What failed validation.
        #[from]
        source: orrery_types::InvalidConfig,
    },

    /// The Alpaca HTTP server failed to start.
    #[error("server error: {source}")]
    Server {
        /// The underlying startup error.
        #[from]
        source: orrery_alpaca::StartupError,
    },

    /// The discovery responder failed to start.
    #[error("discovery error: {source}")]
    Discovery {
        /// The underlying discovery error.
        #[from]
        source: orrery_alpaca::DiscoveryError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
