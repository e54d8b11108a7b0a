//! The dome motion engine.
//!
//! Azimuth, shutter altitude and the shutter state machine advance on the
//! dome's own tick. An interrupted shutter (a second shutter command or a
//! halt while it is opening or closing) jams into [`ShutterState::Error`];
//! it stays there, ignoring open and close, until reset.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use orrery_astro::angle::{angular_distance, range_360, shortest_delta};
use orrery_types::{AlpacaError, AlpacaResult, InvalidConfig, ShutterState};

use crate::config::{DomeCapabilities, DomeConfig, LatchMode};

/// IDome interface version implemented by this engine.
pub const INTERFACE_VERSION: i32 = 3;

/// What the azimuth drive is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlewDirection {
    /// Stationary.
    None,
    /// Rotating clockwise (increasing azimuth) until halted.
    Clockwise,
    /// Rotating counter-clockwise until halted.
    CounterClockwise,
    /// Seeking a commanded azimuth.
    ToTarget,
    /// Seeking the park azimuth.
    ToPark,
    /// Seeking the home azimuth.
    ToHome,
}

/// Simulated observatory dome.
#[derive(Debug, Clone)]
pub struct Dome {
    config: DomeConfig,
    azimuth: f64,
    target_azimuth: f64,
    slew: SlewDirection,
    altitude: f64,
    target_altitude: f64,
    shutter: ShutterState,
    shutter_remaining: Duration,
    slaved: bool,
    parked_latch: bool,
    home_latch: bool,
}

impl Dome {
    /// Build a dome at its park azimuth with the shutter closed.
    pub fn new(config: DomeConfig) -> Result<Self, InvalidConfig> {
        config.validate()?;
        let azimuth = config.park_azimuth;
        let altitude = config.min_altitude;
        Ok(Self {
            config,
            azimuth,
            target_azimuth: azimuth,
            slew: SlewDirection::None,
            altitude,
            target_altitude: altitude,
            shutter: ShutterState::Closed,
            shutter_remaining: Duration::ZERO,
            slaved: false,
            parked_latch: true,
            home_latch: false,
        })
    }

    /// Advance the simulation by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f64();
        self.advance_shutter(elapsed);
        self.advance_azimuth(dt);
        self.advance_altitude(dt);
    }

    fn advance_shutter(&mut self, elapsed: Duration) {
        if !self.shutter.is_moving() {
            return;
        }
        self.shutter_remaining = self.shutter_remaining.saturating_sub(elapsed);
        if self.shutter_remaining.is_zero() {
            self.shutter = match self.shutter {
                ShutterState::Opening => ShutterState::Open,
                _ => ShutterState::Closed,
            };
            debug!(shutter = ?self.shutter, "shutter movement complete");
        }
    }

    fn advance_azimuth(&mut self, dt: f64) {
        let step = self.config.azimuth_rate * dt;
        match self.slew {
            SlewDirection::None => {}
            SlewDirection::Clockwise => self.azimuth = range_360(self.azimuth + step),
            SlewDirection::CounterClockwise => self.azimuth = range_360(self.azimuth - step),
            seeking => {
                let remaining = shortest_delta(self.azimuth, self.target_azimuth);
                if remaining.abs() <= step {
                    self.azimuth = self.target_azimuth;
                    self.slew = SlewDirection::None;
                    match seeking {
                        SlewDirection::ToPark => self.parked_latch = true,
                        SlewDirection::ToHome => self.home_latch = true,
                        _ => {}
                    }
                    debug!(azimuth = self.azimuth, ?seeking, "dome slew complete");
                } else {
                    self.azimuth = range_360(self.azimuth + step.copysign(remaining));
                }
            }
        }
    }

    fn advance_altitude(&mut self, dt: f64) {
        if self.shutter != ShutterState::Open {
            return;
        }
        let remaining = self.target_altitude - self.altitude;
        let step = self.config.altitude_rate * dt;
        if remaining.abs() <= step {
            self.altitude = self.target_altitude;
        } else {
            self.altitude += step.copysign(remaining);
        }
    }

    fn require(flag: bool, member: &str) -> AlpacaResult<()> {
        if flag {
            Ok(())
        } else {
            Err(AlpacaError::not_implemented(member))
        }
    }

    fn clear_latches(&mut self) {
        self.parked_latch = false;
        self.home_latch = false;
    }

    fn check_azimuth(azimuth: f64) -> AlpacaResult<()> {
        if (0.0..360.0).contains(&azimuth) {
            Ok(())
        } else {
            Err(AlpacaError::invalid_value(format!(
                "azimuth {azimuth} is outside [0, 360)"
            )))
        }
    }

    fn jam(&mut self, cause: &str) {
        warn!(shutter = ?self.shutter, cause, "shutter jammed");
        self.shutter = ShutterState::Error;
        self.shutter_remaining = Duration::ZERO;
    }

    // -----------------------------------------------------------------------
    // Shutter
    // -----------------------------------------------------------------------

    /// Start opening the shutter.
    ///
    /// A jammed shutter ignores the command. Reversing a closing shutter
    /// jams it.
    pub fn open_shutter(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_shutter, "OpenShutter")?;
        self.clear_latches();
        match self.shutter {
            ShutterState::Error | ShutterState::Opening => Ok(()),
            ShutterState::Open => Err(AlpacaError::invalid_operation("the shutter is already open")),
            ShutterState::Closing => {
                self.jam("OpenShutter while closing");
                Ok(())
            }
            ShutterState::Closed => {
                self.shutter = ShutterState::Opening;
                self.shutter_remaining = Duration::from_millis(self.config.shutter_delay_ms);
                self.target_altitude = self
                    .altitude
                    .clamp(self.config.min_altitude, self.config.max_altitude);
                debug!("shutter opening");
                Ok(())
            }
        }
    }

    /// Start closing the shutter.
    pub fn close_shutter(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_shutter, "CloseShutter")?;
        self.clear_latches();
        match self.shutter {
            ShutterState::Error | ShutterState::Closing => Ok(()),
            ShutterState::Closed => Err(AlpacaError::invalid_operation("the shutter is already closed")),
            ShutterState::Opening => {
                self.jam("CloseShutter while opening");
                Ok(())
            }
            ShutterState::Open => {
                self.shutter = ShutterState::Closing;
                self.shutter_remaining = Duration::from_millis(self.config.shutter_delay_ms);
                debug!("shutter closing");
                Ok(())
            }
        }
    }

    /// Move the shutter opening to `altitude` degrees (`SlewToAltitude`).
    ///
    /// Moving a shutter that is still opening or closing jams it.
    pub fn move_shutter(&mut self, altitude: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_altitude, "SlewToAltitude")?;
        if !(self.config.min_altitude..=self.config.max_altitude).contains(&altitude) {
            return Err(AlpacaError::invalid_value(format!(
                "altitude {altitude} is outside [{}, {}]",
                self.config.min_altitude, self.config.max_altitude
            )));
        }
        self.clear_latches();
        if self.shutter.is_moving() {
            self.jam("SlewToAltitude while the shutter is moving");
            return Ok(());
        }
        if self.shutter != ShutterState::Open {
            warn!(shutter = ?self.shutter, altitude, "shutter not open");
            return Err(AlpacaError::invalid_operation("the shutter is not open"));
        }
        self.target_altitude = altitude;
        debug!(altitude, "shutter altitude move");
        Ok(())
    }

    /// Clear a jammed shutter back to `Closed`. Other states are unchanged.
    pub fn reset_shutter(&mut self) {
        if self.shutter == ShutterState::Error {
            self.shutter = ShutterState::Closed;
            debug!("shutter reset");
        }
    }

    // -----------------------------------------------------------------------
    // Azimuth
    // -----------------------------------------------------------------------

    /// Stop rotation and jam a shutter that is mid-flight (`AbortSlew`).
    pub fn halt(&mut self) {
        self.slew = SlewDirection::None;
        self.target_altitude = self.altitude;
        self.clear_latches();
        if self.shutter.is_moving() {
            self.jam("halt while the shutter is moving");
        }
    }

    /// Rotate to `azimuth` degrees by the shortest path.
    pub fn slew_to_azimuth(&mut self, azimuth: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_azimuth, "SlewToAzimuth")?;
        Self::check_azimuth(azimuth)?;
        self.clear_latches();
        self.target_azimuth = azimuth;
        self.slew = SlewDirection::ToTarget;
        debug!(azimuth, "dome slew started");
        Ok(())
    }

    /// Rotate continuously until halted.
    pub fn rotate(&mut self, clockwise: bool) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_azimuth, "Rotate")?;
        self.clear_latches();
        self.slew = if clockwise {
            SlewDirection::Clockwise
        } else {
            SlewDirection::CounterClockwise
        };
        debug!(clockwise, "dome rotating");
        Ok(())
    }

    /// Declare the current azimuth.
    pub fn sync_to_azimuth(&mut self, azimuth: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_sync_azimuth, "SyncToAzimuth")?;
        Self::check_azimuth(azimuth)?;
        self.clear_latches();
        self.azimuth = azimuth;
        Ok(())
    }

    /// Rotate to the park azimuth.
    pub fn park(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_park, "Park")?;
        self.clear_latches();
        self.target_azimuth = self.config.park_azimuth;
        self.slew = SlewDirection::ToPark;
        debug!(azimuth = self.target_azimuth, "dome parking");
        Ok(())
    }

    /// Make the current azimuth the park azimuth.
    pub fn set_park(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_park, "SetPark")?;
        self.config.park_azimuth = self.azimuth;
        Ok(())
    }

    /// Rotate to the home azimuth.
    pub fn find_home(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_find_home, "FindHome")?;
        self.clear_latches();
        self.target_azimuth = self.config.home_azimuth;
        self.slew = SlewDirection::ToHome;
        debug!(azimuth = self.target_azimuth, "dome homing");
        Ok(())
    }

    /// Whether the dome follows the telescope.
    pub const fn slaved(&self) -> bool {
        self.slaved
    }

    /// Enable or disable slaving. Enabling requires `CanSlave`.
    pub fn set_slaved(&mut self, slaved: bool) -> AlpacaResult<()> {
        if slaved {
            Self::require(self.config.capabilities.can_slave, "Slaved")?;
        }
        self.slaved = slaved;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Current azimuth in degrees.
    pub const fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Current shutter altitude in degrees.
    pub const fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Shutter state.
    pub const fn shutter_status(&self) -> ShutterState {
        self.shutter
    }

    /// Azimuth drive state.
    pub const fn slew_direction(&self) -> SlewDirection {
        self.slew
    }

    /// Whether the azimuth or the shutter altitude is moving.
    pub fn slewing(&self) -> bool {
        let altitude_moving = self.shutter == ShutterState::Open
            && (self.target_altitude - self.altitude).abs() > f64::EPSILON;
        self.slew != SlewDirection::None || altitude_moving
    }

    /// Whether the dome is parked, per the configured latch mode.
    pub fn at_park(&self) -> bool {
        match self.config.latch_mode {
            LatchMode::Fragile => self.parked_latch,
            LatchMode::Positional => {
                angular_distance(self.azimuth, self.config.park_azimuth) < self.config.tolerance
            }
        }
    }

    /// Whether the dome is at home, per the configured latch mode.
    pub fn at_home(&self) -> bool {
        match self.config.latch_mode {
            LatchMode::Fragile => self.home_latch,
            LatchMode::Positional => {
                angular_distance(self.azimuth, self.config.home_azimuth) < self.config.tolerance
            }
        }
    }

    /// Current configuration, including runtime changes.
    pub const fn config(&self) -> &DomeConfig {
        &self.config
    }

    /// Capability flags.
    pub const fn capabilities(&self) -> &DomeCapabilities {
        &self.config.capabilities
    }

    /// Tick interval the runner should use.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn dome(config: DomeConfig) -> Dome {
        Dome::new(config).unwrap()
    }

    fn ticks(dome: &mut Dome, count: usize) {
        for _ in 0..count {
            dome.advance(TICK);
        }
    }

    fn quick_shutter() -> DomeConfig {
        DomeConfig {
            shutter_delay_ms: 1_000,
            ..DomeConfig::default()
        }
    }

    #[test]
    fn shutter_opens_after_delay() {
        let mut dome = dome(quick_shutter());
        dome.open_shutter().unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Opening);
        ticks(&mut dome, 9);
        assert_eq!(dome.shutter_status(), ShutterState::Opening);
        ticks(&mut dome, 1);
        assert_eq!(dome.shutter_status(), ShutterState::Open);

        dome.close_shutter().unwrap();
        ticks(&mut dome, 10);
        assert_eq!(dome.shutter_status(), ShutterState::Closed);
    }

    #[test]
    fn opening_twice_in_terminal_state_is_invalid() {
        let mut dome = dome(quick_shutter());
        assert!(matches!(dome.close_shutter(), Err(AlpacaError::InvalidOperation(_))));
        dome.open_shutter().unwrap();
        // Same direction while moving is a no-op.
        dome.open_shutter().unwrap();
        ticks(&mut dome, 10);
        assert!(matches!(dome.open_shutter(), Err(AlpacaError::InvalidOperation(_))));
    }

    #[test]
    fn interrupted_shutter_jams_and_stays_jammed() {
        let mut dome = dome(quick_shutter());
        dome.open_shutter().unwrap();
        ticks(&mut dome, 3);
        dome.move_shutter(45.0).unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Error);

        dome.open_shutter().unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Error);
        dome.close_shutter().unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Error);
        ticks(&mut dome, 20);
        assert_eq!(dome.shutter_status(), ShutterState::Error);

        dome.reset_shutter();
        assert_eq!(dome.shutter_status(), ShutterState::Closed);
        dome.open_shutter().unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Opening);
    }

    #[test]
    fn halt_and_reversal_jam_a_moving_shutter() {
        let mut dome = dome(quick_shutter());
        dome.open_shutter().unwrap();
        dome.halt();
        assert_eq!(dome.shutter_status(), ShutterState::Error);

        dome.reset_shutter();
        dome.open_shutter().unwrap();
        dome.close_shutter().unwrap();
        assert_eq!(dome.shutter_status(), ShutterState::Error);
    }

    #[test]
    fn move_shutter_requires_open() {
        let mut dome = dome(quick_shutter());
        assert!(matches!(dome.move_shutter(30.0), Err(AlpacaError::InvalidOperation(_))));
        assert!(matches!(dome.move_shutter(95.0), Err(AlpacaError::InvalidValue(_))));

        dome.open_shutter().unwrap();
        ticks(&mut dome, 10);
        dome.move_shutter(30.0).unwrap();
        assert!(dome.slewing());
        ticks(&mut dome, 149);
        assert!(dome.altitude() < 30.0);
        ticks(&mut dome, 2);
        assert!((dome.altitude() - 30.0).abs() < 1e-9);
        assert!(!dome.slewing());
    }

    #[test]
    fn slews_take_the_short_way() {
        let mut dome = dome(DomeConfig {
            park_azimuth: 350.0,
            ..DomeConfig::default()
        });
        dome.slew_to_azimuth(10.0).unwrap();
        dome.advance(TICK);
        assert!((dome.azimuth() - 350.4).abs() < 1e-9);
        ticks(&mut dome, 50);
        assert!((dome.azimuth() - 10.0).abs() < 1e-9);
        assert_eq!(dome.slew_direction(), SlewDirection::None);
        assert!(!dome.slewing());
    }

    #[test]
    fn continuous_rotation_runs_until_halted() {
        let mut dome = dome(DomeConfig::default());
        dome.rotate(false).unwrap();
        ticks(&mut dome, 10);
        assert!((dome.azimuth() - 176.0).abs() < 1e-9);
        assert!(dome.slewing());
        dome.halt();
        ticks(&mut dome, 10);
        assert!((dome.azimuth() - 176.0).abs() < 1e-9);
    }

    #[test]
    fn positional_park_uses_tolerance() {
        let mut dome = dome(DomeConfig::default());
        dome.sync_to_azimuth(180.5).unwrap();
        assert!(dome.at_park());
        dome.sync_to_azimuth(182.0).unwrap();
        assert!(!dome.at_park());
    }

    #[test]
    fn fragile_latch_clears_on_next_command() {
        let mut dome = dome(DomeConfig {
            latch_mode: LatchMode::Fragile,
            ..DomeConfig::default()
        });
        dome.find_home().unwrap();
        assert!(!dome.at_home());
        ticks(&mut dome, 500);
        assert!(dome.at_home());
        assert!(!dome.at_park());

        dome.open_shutter().unwrap();
        assert!(!dome.at_home());
    }

    #[test]
    fn slaving_requires_capability() {
        let mut dome = dome(DomeConfig::default());
        assert!(matches!(dome.set_slaved(true), Err(AlpacaError::NotImplemented(_))));
        dome.set_slaved(false).unwrap();
        assert!(!dome.slaved());
    }

    #[test]
    fn set_park_moves_the_park_position() {
        let mut dome = dome(DomeConfig::default());
        dome.sync_to_azimuth(90.0).unwrap();
        dome.set_park().unwrap();
        assert!(dome.at_park());
        assert!((dome.config().park_azimuth - 90.0).abs() < f64::EPSILON);
    }
}
