//! Saved device settings.
//!
//! A device's settings are its configuration serialized to a flat JSON
//! object. `SaveConfig` writes the current values, `ResetSettings` removes
//! them, and at start-up stored values are laid over the configured
//! defaults with [`merge_settings`]. Unknown keys in a stored file are
//! ignored, so an old file keeps loading after the configuration grows.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use orrery_types::DeviceKey;

/// Stored settings for one device.
pub type Settings = Map<String, Value>;

/// Errors raised by a settings store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the backing file failed.
    #[error("settings I/O error at {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The stored YAML could not be read or written.
    #[error("settings YAML error: {source}")]
    Yaml {
        /// The underlying YAML error.
        #[from]
        source: serde_yml::Error,
    },

    /// A configuration could not be converted to or from settings.
    #[error("settings conversion error: {source}")]
    Convert {
        /// The underlying JSON value error.
        #[from]
        source: serde_json::Error,
    },

    /// The configuration did not serialize to a key/value object.
    #[error("settings for {device} are not a key/value map")]
    NotAMap {
        /// The device whose settings were rejected.
        device: DeviceKey,
    },
}

/// Persistence for per-device settings.
pub trait SettingsStore: Send + Sync {
    /// Stored settings for `device`, or `None` if nothing has been saved.
    fn load(&self, device: DeviceKey) -> Result<Option<Settings>, SettingsError>;

    /// Replace the stored settings for `device`.
    fn save(&self, device: DeviceKey, settings: &Settings) -> Result<(), SettingsError>;

    /// Forget the stored settings for `device`. Resetting twice is harmless.
    fn reset(&self, device: DeviceKey) -> Result<(), SettingsError>;
}

/// Serialize a configuration into storable settings.
pub fn to_settings<C: Serialize>(device: DeviceKey, config: &C) -> Result<Settings, SettingsError> {
    match serde_json::to_value(config)? {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::NotAMap { device }),
    }
}

/// Lay `stored` over `defaults`.
///
/// Nested objects merge key by key; any other stored value replaces the
/// default outright. Keys absent from the defaults are dropped.
pub fn merge_settings<C>(defaults: &C, stored: &Settings) -> Result<C, SettingsError>
where
    C: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(defaults)?;
    if let Value::Object(target) = &mut merged {
        merge_into(target, stored);
    }
    Ok(serde_json::from_value(merged)?)
}

fn merge_into(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (target.get_mut(key), value) {
            (Some(Value::Object(inner)), Value::Object(nested)) => merge_into(inner, nested),
            (Some(slot), _) => *slot = value.clone(),
            (None, _) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// YAML files
// ---------------------------------------------------------------------------

/// One YAML file per device under a directory, named `{type}-{number}.yaml`.
#[derive(Debug, Clone)]
pub struct YamlSettingsStore {
    directory: PathBuf,
}

impl YamlSettingsStore {
    /// A store rooted at `directory`. The directory is created on first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory holding the settings files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, device: DeviceKey) -> PathBuf {
        self.directory.join(format!(
            "{}-{}.yaml",
            device.device_type.path_segment(),
            device.number
        ))
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self, device: DeviceKey) -> Result<Option<Settings>, SettingsError> {
        let path = self.path_for(device);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        let settings: Settings = serde_yml::from_str(&contents)?;
        tracing::debug!(%device, path = %path.display(), keys = settings.len(), "settings loaded");
        Ok(Some(settings))
    }

    fn save(&self, device: DeviceKey, settings: &Settings) -> Result<(), SettingsError> {
        std::fs::create_dir_all(&self.directory).map_err(|source| SettingsError::Io {
            path: self.directory.clone(),
            source,
        })?;
        let path = self.path_for(device);
        let yaml = serde_yml::to_string(settings)?;
        std::fs::write(&path, yaml).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(%device, path = %path.display(), "settings saved");
        Ok(())
    }

    fn reset(&self, device: DeviceKey) -> Result<(), SettingsError> {
        let path = self.path_for(device);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(%device, path = %path.display(), "settings reset");
                Ok(())
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SettingsError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Settings held in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<BTreeMap<DeviceKey, Settings>>,
}

impl MemorySettingsStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, device: DeviceKey) -> Result<Option<Settings>, SettingsError> {
        Ok(self.entries.lock().get(&device).cloned())
    }

    fn save(&self, device: DeviceKey, settings: &Settings) -> Result<(), SettingsError> {
        self.entries.lock().insert(device, settings.clone());
        Ok(())
    }

    fn reset(&self, device: DeviceKey) -> Result<(), SettingsError> {
        self.entries.lock().remove(&device);
        Ok(())
    }
}
