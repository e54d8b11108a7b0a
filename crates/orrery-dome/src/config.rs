//! Dome configuration (the `dome:` section of `orrery-config.yaml`).

use serde::{Deserialize, Serialize};

use orrery_types::InvalidConfig;

/// How `AtPark` and `AtHome` are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatchMode {
    /// Set when a park or home slew completes, cleared by the next command.
    Fragile,
    /// True whenever the azimuth is within tolerance of the position.
    Positional,
}

/// Settings for the simulated dome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomeConfig {
    /// Short display name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Longer description returned by `Description`.
    #[serde(default = "default_description")]
    pub description: String,

    /// Which optional members the dome supports.
    #[serde(default)]
    pub capabilities: DomeCapabilities,

    /// Rotation speed in degrees per second.
    #[serde(default = "default_azimuth_rate")]
    pub azimuth_rate: f64,

    /// Shutter altitude speed in degrees per second.
    #[serde(default = "default_altitude_rate")]
    pub altitude_rate: f64,

    /// Lowest shutter altitude in degrees.
    #[serde(default)]
    pub min_altitude: f64,

    /// Highest shutter altitude in degrees.
    #[serde(default = "default_max_altitude")]
    pub max_altitude: f64,

    /// Time the shutter takes to open or close, in milliseconds.
    #[serde(default = "default_shutter_delay_ms")]
    pub shutter_delay_ms: u64,

    /// Park azimuth in degrees.
    #[serde(default = "default_park_azimuth")]
    pub park_azimuth: f64,

    /// Home azimuth in degrees.
    #[serde(default)]
    pub home_azimuth: f64,

    /// Positional match tolerance in degrees.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// How park and home are reported.
    #[serde(default = "default_latch_mode")]
    pub latch_mode: LatchMode,

    /// Simulation tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            capabilities: DomeCapabilities::default(),
            azimuth_rate: default_azimuth_rate(),
            altitude_rate: default_altitude_rate(),
            min_altitude: 0.0,
            max_altitude: default_max_altitude(),
            shutter_delay_ms: default_shutter_delay_ms(),
            park_azimuth: default_park_azimuth(),
            home_azimuth: 0.0,
            tolerance: default_tolerance(),
            latch_mode: default_latch_mode(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl DomeConfig {
    /// Check the configuration as a whole.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.azimuth_rate <= 0.0 || self.altitude_rate <= 0.0 {
            return Err(InvalidConfig::new("dome rates must be positive"));
        }
        if self.min_altitude > self.max_altitude {
            return Err(InvalidConfig::new(format!(
                "min_altitude {} exceeds max_altitude {}",
                self.min_altitude, self.max_altitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.min_altitude) || !(-90.0..=90.0).contains(&self.max_altitude) {
            return Err(InvalidConfig::new("dome altitude limits must be within [-90, 90]"));
        }
        for (label, azimuth) in [("park", self.park_azimuth), ("home", self.home_azimuth)] {
            if !(0.0..360.0).contains(&azimuth) {
                return Err(InvalidConfig::new(format!(
                    "{label} azimuth {azimuth} is outside [0, 360)"
                )));
            }
        }
        if self.tolerance <= 0.0 {
            return Err(InvalidConfig::new("dome tolerance must be positive"));
        }
        if self.tick_interval_ms < 10 {
            return Err(InvalidConfig::new("dome tick_interval_ms must be at least 10"));
        }
        Ok(())
    }
}

/// Optional IDome members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DomeCapabilities {
    /// `FindHome`.
    pub can_find_home: bool,
    /// `Park`.
    pub can_park: bool,
    /// `SlewToAltitude`.
    pub can_set_altitude: bool,
    /// `SlewToAzimuth` and continuous rotation.
    pub can_set_azimuth: bool,
    /// `SetPark`.
    pub can_set_park: bool,
    /// `OpenShutter` and `CloseShutter`.
    pub can_set_shutter: bool,
    /// Writing `Slaved = true`.
    pub can_slave: bool,
    /// `SyncToAzimuth`.
    pub can_sync_azimuth: bool,
}

impl Default for DomeCapabilities {
    fn default() -> Self {
        Self {
            can_find_home: true,
            can_park: true,
            can_set_altitude: true,
            can_set_azimuth: true,
            can_set_park: true,
            can_set_shutter: true,
            can_slave: false,
            can_sync_azimuth: true,
        }
    }
}

fn default_name() -> String {
    "Orrery Dome".to_owned()
}

fn default_description() -> String {
    "Simulated observatory dome".to_owned()
}

const fn default_azimuth_rate() -> f64 {
    4.0
}

const fn default_altitude_rate() -> f64 {
    2.0
}

const fn default_max_altitude() -> f64 {
    90.0
}

const fn default_shutter_delay_ms() -> u64 {
    5_000
}

const fn default_park_azimuth() -> f64 {
    180.0
}

const fn default_tolerance() -> f64 {
    1.0
}

const fn default_latch_mode() -> LatchMode {
    LatchMode::Positional
}

const fn default_tick_interval_ms() -> u64 {
    100
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DomeConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_latch_mode() {
        let config: DomeConfig = serde_yml::from_str("latch_mode: fragile\nshutter_delay_ms: 250\n").unwrap();
        assert_eq!(config.latch_mode, LatchMode::Fragile);
        assert_eq!(config.shutter_delay_ms, 250);
        assert!((config.park_azimuth - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_inverted_altitude_limits() {
        let config = DomeConfig {
            min_altitude: 60.0,
            max_altitude: 30.0,
            ..DomeConfig::default()
        };
        assert!(config.validate().unwrap_err().reason.contains("min_altitude"));
    }
}
