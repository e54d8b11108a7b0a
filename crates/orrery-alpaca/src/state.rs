//! Shared application state for the Alpaca server.
//!
//! [`AppState`] is built once at start-up and never changes shape: the set
//! of devices is fixed for the life of the process. Each device carries its
//! own engine lock, so handlers for different devices never contend.

use std::collections::BTreeMap;
use std::sync::Arc;

use orrery_core::{Device, Registry, ServerConfig, SettingsStore};
use orrery_dome::Dome;
use orrery_telescope::Telescope;
use orrery_types::DeviceType;

use crate::error::RequestError;

/// Everything a request handler needs.
pub struct AppState {
    /// Transaction numbers and connection sets.
    pub registry: Arc<Registry>,
    /// Management API strings and discovery settings.
    pub server: ServerConfig,
    /// Where `SaveConfig` and `ResetSettings` write.
    pub settings: Arc<dyn SettingsStore>,
    telescopes: BTreeMap<u32, Device<Telescope>>,
    domes: BTreeMap<u32, Device<Dome>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("server", &self.server)
            .field("telescopes", &self.telescopes.keys().collect::<Vec<_>>())
            .field("domes", &self.domes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Empty state with no devices.
    pub fn new(registry: Arc<Registry>, server: ServerConfig, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            registry,
            server,
            settings,
            telescopes: BTreeMap::new(),
            domes: BTreeMap::new(),
        }
    }

    /// Host a telescope under its device number.
    #[must_use]
    pub fn with_telescope(mut self, device: Device<Telescope>) -> Self {
        self.telescopes.insert(device.key().number, device);
        self
    }

    /// Host a dome under its device number.
    #[must_use]
    pub fn with_dome(mut self, device: Device<Dome>) -> Self {
        self.domes.insert(device.key().number, device);
        self
    }

    /// The telescope numbered `number`.
    pub fn telescope(&self, number: &str) -> Result<&Device<Telescope>, RequestError> {
        lookup(&self.telescopes, DeviceType::Telescope, number)
    }

    /// The dome numbered `number`.
    pub fn dome(&self, number: &str) -> Result<&Device<Dome>, RequestError> {
        lookup(&self.domes, DeviceType::Dome, number)
    }

    /// All configured telescopes.
    pub fn telescopes(&self) -> impl Iterator<Item = &Device<Telescope>> {
        self.telescopes.values()
    }

    /// All configured domes.
    pub fn domes(&self) -> impl Iterator<Item = &Device<Dome>> {
        self.domes.values()
    }
}

fn lookup<'a, E>(
    devices: &'a BTreeMap<u32, Device<E>>,
    device_type: DeviceType,
    number: &str,
) -> Result<&'a Device<E>, RequestError> {
    number
        .parse::<u32>()
        .ok()
        .and_then(|n| devices.get(&n))
        .ok_or_else(|| RequestError::UnknownDevice {
            device_type: device_type.path_segment().to_owned(),
            number: number.to_owned(),
        })
}
