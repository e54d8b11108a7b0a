//! Motion primitives used by the telescope tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use orrery_astro::angle::shortest_delta;
use orrery_types::{AlignmentMode, AlpacaError, GuideDirection, Vector};

use crate::config::SlewRates;

/// What the mount is slewing towards, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlewState {
    /// Not slewing.
    None,
    /// Slewing to an equatorial target; the target tracks the sky.
    RaDec,
    /// Slewing to a fixed Alt/Az target.
    AltAz,
    /// Slewing to the park position.
    Park,
    /// Slewing to the home position.
    Home,
    /// Arrived, waiting for the settle time to elapse.
    Settle,
}

impl SlewState {
    /// Whether the axes are being driven towards a target.
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::RaDec | Self::AltAz | Self::Park | Self::Home)
    }
}

/// The sidereal drive currently applied to the axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingMode {
    /// Not tracking.
    Off,
    /// Alt-az mount following the sky on both axes.
    AltAz,
    /// Equatorial mount in the northern hemisphere.
    EqN,
    /// Equatorial mount in the southern hemisphere.
    EqS,
}

impl TrackingMode {
    /// The mode for a mount with tracking switched on.
    pub fn derive(tracking: bool, alignment: AlignmentMode, latitude: f64) -> Self {
        match (tracking, alignment) {
            (false, _) => Self::Off,
            (true, AlignmentMode::AltAz) => Self::AltAz,
            (true, _) if latitude >= 0.0 => Self::EqN,
            (true, _) => Self::EqS,
        }
    }
}

/// Hand-control speed selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSpeed {
    /// The slow slew rate.
    Slow,
    /// The medium slew rate.
    Medium,
    /// The fast slew rate.
    Fast,
}

impl HandSpeed {
    /// Degrees per second for this speed.
    pub const fn rate(self, rates: &SlewRates) -> f64 {
        match self {
            Self::Slow => rates.slow,
            Self::Medium => rates.medium,
            Self::Fast => rates.fast,
        }
    }
}

impl std::str::FromStr for HandSpeed {
    type Err = AlpacaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "medium" => Ok(Self::Medium),
            "fast" => Ok(Self::Fast),
            other => Err(AlpacaError::invalid_value(format!(
                "unknown hand control speed {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Slewing
// ---------------------------------------------------------------------------

/// Signed axis distance from `from` to `to`.
///
/// Wrapping axes take the short way round; the German primary axis never
/// wraps, so its distance is the plain difference.
pub fn axis_remaining(alignment: AlignmentMode, from: Vector, to: Vector) -> Vector {
    let primary = match alignment {
        AlignmentMode::AltAz | AlignmentMode::Polar => shortest_delta(from.primary, to.primary),
        AlignmentMode::GermanPolar => to.primary - from.primary,
    };
    Vector::new(primary, to.secondary - from.secondary)
}

/// One tick of slew motion along a single axis.
///
/// Picks the fastest tier whose step does not overshoot, and snaps onto the
/// target once even the slow step would reach it.
pub fn slew_step(remaining: f64, rates: &SlewRates, dt: f64) -> f64 {
    let distance = remaining.abs();
    let step = [rates.fast, rates.medium, rates.slow]
        .into_iter()
        .map(|rate| rate * dt)
        .find(|&step| distance > step)
        .unwrap_or(distance);
    step.copysign(remaining)
}

/// Whether a remaining distance is inside the completion threshold.
pub fn arrived(remaining: Vector, rates: &SlewRates, dt: f64) -> bool {
    let threshold = rates.slow * dt + 1e-9;
    remaining.primary.abs() <= threshold && remaining.secondary.abs() <= threshold
}

// ---------------------------------------------------------------------------
// Pulse guiding
// ---------------------------------------------------------------------------

/// An in-flight pulse-guide correction on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// `+1` towards increasing right ascension or declination, `-1` away.
    pub sign: i8,
    /// Guiding time still owed.
    pub remaining: Duration,
}

impl Pulse {
    /// A pulse in `direction` lasting `duration`.
    pub const fn new(direction: GuideDirection, duration: Duration) -> Self {
        let sign = match direction {
            GuideDirection::North | GuideDirection::East => 1,
            GuideDirection::South | GuideDirection::West => -1,
        };
        Self {
            sign,
            remaining: duration,
        }
    }

    /// Consume up to `elapsed` of guiding and return the displacement in
    /// degrees at `rate`. The pulse is finished once `remaining` is zero.
    pub fn consume(&mut self, elapsed: Duration, rate: f64) -> f64 {
        let active = self.remaining.min(elapsed);
        self.remaining = self.remaining.saturating_sub(active);
        f64::from(self.sign) * rate * active.as_secs_f64()
    }

    /// Whether all guiding time has been applied.
    pub const fn is_finished(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rates() -> SlewRates {
        SlewRates::default()
    }

    #[test]
    fn slew_step_uses_three_tiers() {
        let dt = 0.1;
        assert!((slew_step(50.0, &rates(), dt) - 2.0).abs() < 1e-12);
        assert!((slew_step(-1.5, &rates(), dt) + 0.2).abs() < 1e-12);
        assert!((slew_step(0.15, &rates(), dt) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn slew_step_snaps_without_overshoot() {
        let step = slew_step(0.03, &rates(), 0.1);
        assert!((step - 0.03).abs() < 1e-15);
        let step = slew_step(-0.03, &rates(), 0.1);
        assert!((step + 0.03).abs() < 1e-15);
    }

    #[test]
    fn german_remaining_never_wraps() {
        let from = Vector::new(-15.0, 0.0);
        let to = Vector::new(195.0, 0.0);
        let german = axis_remaining(AlignmentMode::GermanPolar, from, to);
        assert!((german.primary - 210.0).abs() < 1e-12);
        let polar = axis_remaining(AlignmentMode::Polar, from, to);
        assert!((polar.primary + 150.0).abs() < 1e-12);
    }

    #[test]
    fn pulse_consumes_exact_duration() {
        let mut pulse = Pulse::new(GuideDirection::West, Duration::from_millis(250));
        let tick = Duration::from_millis(100);
        let mut total = 0.0;
        total += pulse.consume(tick, 1.0);
        total += pulse.consume(tick, 1.0);
        assert!(!pulse.is_finished());
        total += pulse.consume(tick, 1.0);
        assert!(pulse.is_finished());
        assert!((total + 0.25).abs() < 1e-12);
    }

    #[test]
    fn hand_speed_parses_case_insensitively() {
        assert_eq!("Fast".parse::<HandSpeed>().unwrap(), HandSpeed::Fast);
        assert!("warp".parse::<HandSpeed>().is_err());
    }

    #[test]
    fn tracking_mode_follows_hemisphere() {
        assert_eq!(TrackingMode::derive(false, AlignmentMode::Polar, 10.0), TrackingMode::Off);
        assert_eq!(TrackingMode::derive(true, AlignmentMode::AltAz, 10.0), TrackingMode::AltAz);
        assert_eq!(TrackingMode::derive(true, AlignmentMode::GermanPolar, -10.0), TrackingMode::EqS);
    }
}
