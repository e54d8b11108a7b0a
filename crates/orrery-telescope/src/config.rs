//! Telescope configuration.
//!
//! A [`TelescopeConfig`] is the `telescope:` section of
//! `orrery-config.yaml`. Every field has a default, so an empty section
//! yields a working German equatorial mount near Greenwich. The same
//! structure is what `SaveConfig` persists, which is why it serializes as
//! well as deserializes.

use serde::{Deserialize, Serialize};

use orrery_types::{AlignmentMode, DriveRate, InvalidConfig};

/// Static and runtime-adjustable settings for the simulated mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelescopeConfig {
    /// Short display name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Longer description returned by `Description`.
    #[serde(default = "default_description")]
    pub description: String,

    /// Mechanical configuration of the mount.
    #[serde(default = "default_alignment")]
    pub alignment: AlignmentMode,

    /// Site latitude in degrees, north positive.
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Site longitude in degrees, east positive.
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Site elevation in metres above sea level.
    #[serde(default = "default_elevation")]
    pub elevation: f64,

    /// Aperture diameter in metres.
    #[serde(default = "default_aperture_diameter")]
    pub aperture_diameter: f64,

    /// Clear aperture area in square metres.
    #[serde(default = "default_aperture_area")]
    pub aperture_area: f64,

    /// Focal length in metres.
    #[serde(default = "default_focal_length")]
    pub focal_length: f64,

    /// Which optional members the mount supports.
    #[serde(default)]
    pub capabilities: TelescopeCapabilities,

    /// Three-tier slew speed profile.
    #[serde(default)]
    pub slew_rates: SlewRates,

    /// Fastest `MoveAxis` rate in degrees per second.
    #[serde(default = "default_max_move_rate")]
    pub max_move_rate: f64,

    /// Right ascension guide rate in degrees per second.
    #[serde(default = "default_guide_rate")]
    pub guide_rate_right_ascension: f64,

    /// Declination guide rate in degrees per second.
    #[serde(default = "default_guide_rate")]
    pub guide_rate_declination: f64,

    /// How far a German mount may track past the meridian, in degrees.
    #[serde(default = "default_hour_angle_limit")]
    pub hour_angle_limit: f64,

    /// Seconds to wait after a coordinate slew before reporting completion.
    #[serde(default = "default_settle_time_secs")]
    pub settle_time_secs: u32,

    /// Park position azimuth in degrees.
    #[serde(default = "default_park_azimuth")]
    pub park_azimuth: f64,

    /// Park position altitude in degrees.
    #[serde(default)]
    pub park_altitude: f64,

    /// Home position azimuth in degrees.
    #[serde(default = "default_home_azimuth")]
    pub home_azimuth: f64,

    /// Home position altitude in degrees.
    #[serde(default)]
    pub home_altitude: f64,

    /// Whether the mount starts parked.
    #[serde(default)]
    pub start_parked: bool,

    /// Simulation tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Whether the mount applies atmospheric refraction.
    #[serde(default)]
    pub does_refraction: bool,

    /// Drive rate selected at start-up.
    #[serde(default = "default_tracking_rate")]
    pub tracking_rate: DriveRate,
}

impl Default for TelescopeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            alignment: default_alignment(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            elevation: default_elevation(),
            aperture_diameter: default_aperture_diameter(),
            aperture_area: default_aperture_area(),
            focal_length: default_focal_length(),
            capabilities: TelescopeCapabilities::default(),
            slew_rates: SlewRates::default(),
            max_move_rate: default_max_move_rate(),
            guide_rate_right_ascension: default_guide_rate(),
            guide_rate_declination: default_guide_rate(),
            hour_angle_limit: default_hour_angle_limit(),
            settle_time_secs: default_settle_time_secs(),
            park_azimuth: default_park_azimuth(),
            park_altitude: 0.0,
            home_azimuth: default_home_azimuth(),
            home_altitude: 0.0,
            start_parked: false,
            tick_interval_ms: default_tick_interval_ms(),
            does_refraction: false,
            tracking_rate: default_tracking_rate(),
        }
    }
}

impl TelescopeConfig {
    /// Check the configuration as a whole.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InvalidConfig::new(format!(
                "telescope latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InvalidConfig::new(format!(
                "telescope longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        if !(0.0..=90.0).contains(&self.hour_angle_limit) {
            return Err(InvalidConfig::new(format!(
                "hour_angle_limit {} is outside [0, 90]",
                self.hour_angle_limit
            )));
        }
        self.slew_rates.validate()?;
        if self.max_move_rate <= 0.0 {
            return Err(InvalidConfig::new("max_move_rate must be positive"));
        }
        if self.guide_rate_right_ascension <= 0.0 || self.guide_rate_declination <= 0.0 {
            return Err(InvalidConfig::new("guide rates must be positive"));
        }
        if self.tick_interval_ms < 10 {
            return Err(InvalidConfig::new(
                "telescope tick_interval_ms must be at least 10",
            ));
        }
        for (label, altitude) in [("park", self.park_altitude), ("home", self.home_altitude)] {
            if !(-90.0..=90.0).contains(&altitude) {
                return Err(InvalidConfig::new(format!(
                    "{label} altitude {altitude} is outside [-90, 90]"
                )));
            }
        }
        Ok(())
    }
}

/// Optional ITelescope members, one flag each.
///
/// A member whose flag is off answers `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TelescopeCapabilities {
    /// `FindHome`.
    pub can_find_home: bool,
    /// `Park`.
    pub can_park: bool,
    /// `PulseGuide`.
    pub can_pulse_guide: bool,
    /// Guiding both axes at once.
    pub can_dual_axis_pulse_guide: bool,
    /// Writing `DeclinationRate`.
    pub can_set_declination_rate: bool,
    /// Writing the guide rates.
    pub can_set_guide_rates: bool,
    /// `SetPark`.
    pub can_set_park: bool,
    /// Writing `SideOfPier`.
    pub can_set_pier_side: bool,
    /// Writing `RightAscensionRate`.
    pub can_set_right_ascension_rate: bool,
    /// Writing `Tracking`.
    pub can_set_tracking: bool,
    /// Synchronous equatorial slews.
    pub can_slew: bool,
    /// Asynchronous equatorial slews.
    pub can_slew_async: bool,
    /// Synchronous Alt/Az slews.
    pub can_slew_alt_az: bool,
    /// Asynchronous Alt/Az slews.
    pub can_slew_alt_az_async: bool,
    /// `SyncToCoordinates` and `SyncToTarget`.
    pub can_sync: bool,
    /// `SyncToAltAz`.
    pub can_sync_alt_az: bool,
    /// `Unpark`.
    pub can_unpark: bool,
    /// `MoveAxis` on the primary axis.
    pub can_move_primary_axis: bool,
    /// `MoveAxis` on the secondary axis.
    pub can_move_secondary_axis: bool,
}

impl Default for TelescopeCapabilities {
    fn default() -> Self {
        Self {
            can_find_home: true,
            can_park: true,
            can_pulse_guide: true,
            can_dual_axis_pulse_guide: true,
            can_set_declination_rate: true,
            can_set_guide_rates: true,
            can_set_park: true,
            can_set_pier_side: true,
            can_set_right_ascension_rate: true,
            can_set_tracking: true,
            can_slew: true,
            can_slew_async: true,
            can_slew_alt_az: true,
            can_slew_alt_az_async: true,
            can_sync: true,
            can_sync_alt_az: true,
            can_unpark: true,
            can_move_primary_axis: true,
            can_move_secondary_axis: true,
        }
    }
}

/// Slew speeds in degrees per second.
///
/// Far from the target the mount moves at `fast`, dropping to `medium`
/// and then `slow` as the remaining distance shrinks below one tick's
/// worth of the faster rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlewRates {
    /// Long-distance rate.
    pub fast: f64,
    /// Approach rate.
    pub medium: f64,
    /// Final approach rate; also the completion threshold per tick.
    pub slow: f64,
}

impl Default for SlewRates {
    fn default() -> Self {
        Self {
            fast: 20.0,
            medium: 2.0,
            slow: 0.5,
        }
    }
}

impl SlewRates {
    fn validate(&self) -> Result<(), InvalidConfig> {
        if self.slow > 0.0 && self.medium >= self.slow && self.fast >= self.medium {
            Ok(())
        } else {
            Err(InvalidConfig::new(format!(
                "slew rates must satisfy fast >= medium >= slow > 0 (got {}, {}, {})",
                self.fast, self.medium, self.slow
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "Orrery Telescope".to_owned()
}

fn default_description() -> String {
    "Simulated telescope mount".to_owned()
}

const fn default_alignment() -> AlignmentMode {
    AlignmentMode::GermanPolar
}

const fn default_latitude() -> f64 {
    51.4769
}

const fn default_longitude() -> f64 {
    -0.0005
}

const fn default_elevation() -> f64 {
    46.0
}

const fn default_aperture_diameter() -> f64 {
    0.2
}

const fn default_aperture_area() -> f64 {
    0.0269
}

const fn default_focal_length() -> f64 {
    1.26
}

const fn default_max_move_rate() -> f64 {
    5.0
}

/// Half the sidereal rate.
const fn default_guide_rate() -> f64 {
    0.002_089
}

const fn default_hour_angle_limit() -> f64 {
    20.0
}

const fn default_settle_time_secs() -> u32 {
    2
}

const fn default_park_azimuth() -> f64 {
    270.0
}

const fn default_home_azimuth() -> f64 {
    90.0
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_tracking_rate() -> DriveRate {
    DriveRate::Sidereal
}
