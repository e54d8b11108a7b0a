//! Enumeration types shared across the simulator.
//!
//! Every enumeration that crosses the Alpaca wire carries a fixed integer
//! value defined by the ASCOM interface standards. The [`AlpacaEnum`] trait
//! converts between the typed variant and that integer; configuration files
//! use the `snake_case` variant names instead.

use serde::{Deserialize, Serialize};

/// Conversion between a typed enumeration and its Alpaca integer value.
pub trait AlpacaEnum: Sized + Copy {
    /// The integer value sent over the wire.
    fn to_alpaca(self) -> i32;

    /// Parse a wire integer, returning `None` for unknown values.
    fn from_alpaca(value: i32) -> Option<Self>;
}

/// Generates an enum with fixed Alpaca integer values and its
/// [`AlpacaEnum`] implementation.
macro_rules! alpaca_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl AlpacaEnum for $name {
            fn to_alpaca(self) -> i32 {
                match self {
                    $( Self::$variant => $value, )+
                }
            }

            fn from_alpaca(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Telescope
// ---------------------------------------------------------------------------

alpaca_enum! {
    /// Mechanical configuration of a telescope mount.
    ///
    /// Determines how the two mount axes map onto the sky and which wrap or
    /// clamp rule applies to the primary axis.
    #[serde(rename_all = "snake_case")]
    AlignmentMode {
        /// Altitude-azimuth mount; primary axis is azimuth.
        AltAz = 0,
        /// Fork or yoke equatorial mount; primary axis is hour angle.
        Polar = 1,
        /// German equatorial mount with a meridian limit on the primary axis.
        GermanPolar = 2,
    }
}

alpaca_enum! {
    /// Pointing state of an equatorial mount.
    PierSide {
        /// Normal pointing state: mount on the east side of the pier, looking west.
        East = 0,
        /// Through-the-pole pointing state: mount on the west side, looking east.
        West = 1,
        /// Pointing state is unknown or not meaningful (alt-az mounts).
        Unknown = -1,
    }
}

alpaca_enum! {
    /// Standard drive rates for sidereal tracking.
    #[serde(rename_all = "snake_case")]
    DriveRate {
        /// Sidereal rate (15.041 arcseconds per SI second).
        Sidereal = 0,
        /// Lunar rate (14.685 arcseconds per SI second).
        Lunar = 1,
        /// Solar rate (15.0 arcseconds per SI second).
        Solar = 2,
        /// King rate (15.0369 arcseconds per SI second).
        King = 3,
    }
}

impl DriveRate {
    /// All drive rates in Alpaca order.
    pub const ALL: [Self; 4] = [Self::Sidereal, Self::Lunar, Self::Solar, Self::King];

    /// The hour-angle advance of this rate in arcseconds per SI second.
    pub const fn arcseconds_per_second(self) -> f64 {
        match self {
            Self::Sidereal => 15.041_068_6,
            Self::Lunar => 14.685,
            Self::Solar => 15.0,
            Self::King => 15.0369,
        }
    }

    /// The hour-angle advance of this rate in degrees per SI second.
    pub fn degrees_per_second(self) -> f64 {
        self.arcseconds_per_second() / 3600.0
    }
}

alpaca_enum! {
    /// Direction of a pulse-guide correction.
    GuideDirection {
        /// Towards increasing declination.
        North = 0,
        /// Towards decreasing declination.
        South = 1,
        /// Towards increasing right ascension.
        East = 2,
        /// Towards decreasing right ascension.
        West = 3,
    }
}

impl GuideDirection {
    /// Whether this direction moves the right ascension axis.
    pub const fn is_right_ascension(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

alpaca_enum! {
    /// A mechanical axis of the telescope mount.
    TelescopeAxis {
        /// Right ascension or azimuth axis.
        Primary = 0,
        /// Declination or altitude axis.
        Secondary = 1,
        /// Imager rotator or de-rotator axis.
        Tertiary = 2,
    }
}

alpaca_enum! {
    /// Coordinate epoch reported by the mount.
    EquatorialSystem {
        /// Custom or unknown equinox.
        Other = 0,
        /// Topocentric coordinates (of date).
        Topocentric = 1,
        /// J2000 equinox.
        J2000 = 2,
        /// J2050 equinox.
        J2050 = 3,
        /// B1950 equinox.
        B1950 = 4,
    }
}

// ---------------------------------------------------------------------------
// Dome
// ---------------------------------------------------------------------------

alpaca_enum! {
    /// Status of the dome shutter.
    ShutterState {
        /// Fully open.
        Open = 0,
        /// Fully closed.
        Closed = 1,
        /// Opening, waiting for the open delay to elapse.
        Opening = 2,
        /// Closing, waiting for the close delay to elapse.
        Closing = 3,
        /// Jammed by an interrupted operation.
        Error = 4,
    }
}

impl ShutterState {
    /// Whether the shutter is mid-flight between terminal states.
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// The device classes this simulator exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// A telescope mount.
    Telescope,
    /// An observatory dome.
    Dome,
}

impl DeviceType {
    /// The lowercase path segment used in Alpaca URLs.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Telescope => "telescope",
            Self::Dome => "dome",
        }
    }

    /// The capitalized name used by the management API.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Telescope => "Telescope",
            Self::Dome => "Dome",
        }
    }

    /// Parse an Alpaca URL path segment (case-sensitive, lowercase).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "telescope" => Some(Self::Telescope),
            "dome" => Some(Self::Dome),
            _ => None,
        }
    }
}

impl core::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn alpaca_values_round_trip() {
        for mode in [AlignmentMode::AltAz, AlignmentMode::Polar, AlignmentMode::GermanPolar] {
            assert_eq!(AlignmentMode::from_alpaca(mode.to_alpaca()), Some(mode));
        }
        assert_eq!(PierSide::Unknown.to_alpaca(), -1);
        assert_eq!(ShutterState::Error.to_alpaca(), 4);
        assert_eq!(GuideDirection::from_alpaca(3), Some(GuideDirection::West));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(DriveRate::from_alpaca(4), None);
        assert_eq!(TelescopeAxis::from_alpaca(-1), None);
    }

    #[test]
    fn config_names_are_snake_case() {
        let mode: AlignmentMode = serde_json::from_str("\"german_polar\"").unwrap();
        assert_eq!(mode, AlignmentMode::GermanPolar);
        let rate: DriveRate = serde_json::from_str("\"king\"").unwrap();
        assert_eq!(rate, DriveRate::King);
    }

    #[test]
    fn sidereal_rate_in_degrees() {
        let rate = DriveRate::Sidereal.degrees_per_second();
        assert!((rate - 0.004_178_074).abs() < 1e-8);
    }

    #[test]
    fn device_type_paths() {
        assert_eq!(DeviceType::from_path_segment("dome"), Some(DeviceType::Dome));
        assert_eq!(DeviceType::from_path_segment("Dome"), None);
        assert_eq!(DeviceType::Telescope.display_name(), "Telescope");
    }
}
