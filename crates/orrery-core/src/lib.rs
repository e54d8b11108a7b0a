//! Shared server plumbing for the Orrery simulator.
//!
//! Everything between the HTTP routing layer and the motion engines lives
//! here.
//!
//! # Modules
//!
//! - [`registry`] -- Transaction numbering and per-device connection sets.
//! - [`dispatch`] -- The command envelope that turns engine results into
//!   Alpaca responses.
//! - [`device`] -- [`Device`] wrapper pairing an engine with its identity.
//! - [`runner`] -- Per-engine tick tasks.
//! - [`config`] -- Loading `orrery-config.yaml` into [`SimulatorConfig`].
//! - [`settings`] -- The [`SettingsStore`] trait and its implementations.
//!
//! [`Device`]: device::Device
//! [`SimulatorConfig`]: config::SimulatorConfig
//! [`SettingsStore`]: settings::SettingsStore

pub mod config;
pub mod device;
pub mod dispatch;
pub mod registry;
pub mod runner;
pub mod settings;

pub use config::{ConfigError, LogFormat, ServerConfig, SimulatorConfig};
pub use device::{Device, DeviceInfo, Simulated};
pub use dispatch::{AlpacaResponse, Command, RequestContext, dispatch};
pub use registry::Registry;
pub use runner::spawn_ticker;
pub use settings::{
    MemorySettingsStore, Settings, SettingsError, SettingsStore, YamlSettingsStore,
    merge_settings, to_settings,
};
