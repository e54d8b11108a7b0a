//! Device wrapper shared by the tick runner and the routing layer.
//!
//! A [`Device`] owns one engine behind a single [`parking_lot::Mutex`]. The
//! tick task and every command take that same lock, so each sees a
//! consistent snapshot and a tick is never interleaved with a command. The
//! connection set lives in the [`Registry`] and is locked separately.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use orrery_dome::Dome;
use orrery_telescope::Telescope;
use orrery_types::{ClientId, DeviceKey, DeviceType};

use crate::registry::{ConnectionSet, Registry};

/// Driver version reported by every device.
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// An engine the simulator can host.
pub trait Simulated: Send + 'static {
    /// The device class.
    const DEVICE_TYPE: DeviceType;

    /// The ASCOM interface version implemented.
    const INTERFACE_VERSION: i32;

    /// The engine's persisted configuration.
    type Config: Serialize + DeserializeOwned + Clone + Send;

    /// Advance the simulation by `elapsed`.
    fn advance(&mut self, elapsed: Duration);

    /// How often the runner should call [`Simulated::advance`].
    fn tick_interval(&self) -> Duration;

    /// Display name.
    fn name(&self) -> &str;

    /// Longer description.
    fn description(&self) -> &str;

    /// The configuration as it stands now, including runtime changes.
    fn current_config(&self) -> Self::Config;
}

impl Simulated for Telescope {
    const DEVICE_TYPE: DeviceType = DeviceType::Telescope;
    const INTERFACE_VERSION: i32 = orrery_telescope::INTERFACE_VERSION;
    type Config = orrery_telescope::TelescopeConfig;

    fn advance(&mut self, elapsed: Duration) {
        Self::advance(self, elapsed);
    }

    fn tick_interval(&self) -> Duration {
        Self::tick_interval(self)
    }

    fn name(&self) -> &str {
        &self.config().name
    }

    fn description(&self) -> &str {
        &self.config().description
    }

    fn current_config(&self) -> Self::Config {
        self.config().clone()
    }
}

impl Simulated for Dome {
    const DEVICE_TYPE: DeviceType = DeviceType::Dome;
    const INTERFACE_VERSION: i32 = orrery_dome::INTERFACE_VERSION;
    type Config = orrery_dome::DomeConfig;

    fn advance(&mut self, elapsed: Duration) {
        Self::advance(self, elapsed);
    }

    fn tick_interval(&self) -> Duration {
        Self::tick_interval(self)
    }

    fn name(&self) -> &str {
        &self.config().name
    }

    fn description(&self) -> &str {
        &self.config().description
    }

    fn current_config(&self) -> Self::Config {
        self.config().clone()
    }
}

/// Static description of a hosted device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Device class and number.
    pub key: DeviceKey,
    /// Stable identifier for the lifetime of the process.
    pub unique_id: Uuid,
    /// Display name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Driver description.
    pub driver_info: String,
    /// Driver version string.
    pub driver_version: String,
    /// ASCOM interface version.
    pub interface_version: i32,
}

/// A hosted engine plus its identity and connections.
#[derive(Debug)]
pub struct Device<E> {
    key: DeviceKey,
    unique_id: Uuid,
    engine: Arc<Mutex<E>>,
    connections: Arc<ConnectionSet>,
}

impl<E> Clone for Device<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            unique_id: self.unique_id,
            engine: Arc::clone(&self.engine),
            connections: Arc::clone(&self.connections),
        }
    }
}

impl<E: Simulated> Device<E> {
    /// Host `engine` as device `number` of its class.
    pub fn new(number: u32, engine: E, registry: &Registry) -> Self {
        let key = DeviceKey::new(E::DEVICE_TYPE, number);
        Self {
            key,
            unique_id: Uuid::new_v4(),
            engine: Arc::new(Mutex::new(engine)),
            connections: registry.connections(key),
        }
    }

    /// Device class and number.
    pub const fn key(&self) -> DeviceKey {
        self.key
    }

    /// The shared engine handle, for the tick runner.
    pub fn engine(&self) -> Arc<Mutex<E>> {
        Arc::clone(&self.engine)
    }

    /// Run `f` with the engine locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.engine.lock())
    }

    /// Add a client connection.
    pub fn connect(&self, client: ClientId) {
        if self.connections.add(client) {
            tracing::info!(device = %self.key, %client, "device connected");
        }
    }

    /// Remove a client connection.
    pub fn disconnect(&self, client: ClientId) {
        if self.connections.remove(client) {
            tracing::info!(device = %self.key, %client, "device disconnected");
        }
    }

    /// Whether any client is connected.
    pub fn connected(&self) -> bool {
        self.connections.is_connected()
    }

    /// Identity and version strings.
    pub fn info(&self) -> DeviceInfo {
        let engine = self.engine.lock();
        DeviceInfo {
            key: self.key,
            unique_id: self.unique_id,
            name: engine.name().to_owned(),
            description: engine.description().to_owned(),
            driver_info: format!("Orrery {} simulator", E::DEVICE_TYPE.display_name()),
            driver_version: DRIVER_VERSION.to_owned(),
            interface_version: E::INTERFACE_VERSION,
        }
    }

    /// Snapshot of the engine's configuration.
    pub fn current_config(&self) -> E::Config {
        self.engine.lock().current_config()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orrery_dome::DomeConfig;
    use orrery_telescope::TelescopeConfig;

    use super::*;

    #[test]
    fn devices_share_registry_connections() {
        let registry = Registry::new();
        let telescope = Device::new(0, Telescope::new(TelescopeConfig::default()).unwrap(), &registry);

        telescope.connect(ClientId(1));
        assert!(registry.is_connected(telescope.key()));
        telescope.clone().connect(ClientId(2));
        telescope.disconnect(ClientId(1));
        assert!(telescope.connected());
        telescope.disconnect(ClientId(2));
        assert!(!registry.is_connected(telescope.key()));
    }

    #[test]
    fn info_reports_interface_versions() {
        let registry = Registry::new();
        let dome = Device::new(3, Dome::new(DomeConfig::default()).unwrap(), &registry);
        let info = dome.info();
        assert_eq!(info.key, DeviceKey::new(DeviceType::Dome, 3));
        assert_eq!(info.interface_version, 3);
        assert_eq!(info.name, "Orrery Dome");
        assert_eq!(info.driver_version, DRIVER_VERSION);
    }

    #[test]
    fn commands_and_ticks_share_the_engine() {
        let registry = Registry::new();
        let dome = Device::new(0, Dome::new(DomeConfig::default()).unwrap(), &registry);
        dome.with(|d| d.slew_to_azimuth(190.0)).unwrap();
        dome.engine().lock().advance(Duration::from_secs(1));
        assert!((dome.with(|d| d.azimuth()) - 184.0).abs() < 1e-9);
    }
}
