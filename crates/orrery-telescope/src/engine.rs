//! The telescope motion engine.
//!
//! [`Telescope`] is a plain state machine. It never reads a clock: the tick
//! runner calls [`Telescope::advance`] with the measured elapsed time, and
//! the simulated UTC clock moves forward by exactly that amount. Commands
//! and ticks both take `&mut self`; the caller provides the mutual
//! exclusion.
//!
//! The mount axes are the source of truth. Alt/Az, RA/Dec and pier side are
//! derived from them on every read.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use orrery_astro::{FrameContext, local_sidereal_time};
use orrery_types::{
    AlignmentMode, AlpacaError, AlpacaResult, DriveRate, EquatorialSystem, GuideDirection,
    InvalidConfig, PierSide, TelescopeAxis, Vector,
};

use crate::config::{TelescopeCapabilities, TelescopeConfig};
use crate::motion::{
    HandSpeed, Pulse, SlewState, TrackingMode, arrived, axis_remaining, slew_step,
};

/// ITelescope interface version implemented by this engine.
pub const INTERFACE_VERSION: i32 = 4;

/// Axis drift, in degrees, that clears the `AtHome` and `AtPark` latches.
const LATCH_TOLERANCE: f64 = 0.01;

/// Sidereal seconds per SI second.
const SIDEREAL_RATIO: f64 = 1.002_737_909_35;

/// Whether a slew call waits for completion or returns immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlewMode {
    /// `SlewToCoordinates`, `SlewToTarget`, `SlewToAltAz`.
    Synchronous,
    /// The `...Async` variants.
    Asynchronous,
}

/// One entry of `AxisRates`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AxisRate {
    /// Slowest rate in degrees per second.
    pub minimum: f64,
    /// Fastest rate in degrees per second.
    pub maximum: f64,
}

/// Simulated telescope mount.
#[derive(Debug, Clone)]
pub struct Telescope {
    config: TelescopeConfig,
    utc: DateTime<Utc>,
    axes: Vector,
    target_axes: Vector,
    slew: SlewState,
    settle_remaining: Duration,
    tracking: bool,
    /// Equatorial rate offset: RA and Dec in degrees per SI second.
    rate_offset: Vector,
    move_rate: Vector,
    hand_rate: Vector,
    guide_ra: Option<Pulse>,
    guide_dec: Option<Pulse>,
    at_park: bool,
    at_home: bool,
    target_ra: Option<f64>,
    target_dec: Option<f64>,
}

impl Telescope {
    /// Build a mount from configuration with the simulated clock at now.
    pub fn new(config: TelescopeConfig) -> Result<Self, InvalidConfig> {
        Self::with_clock(config, Utc::now())
    }

    /// Build a mount whose simulated clock starts at `utc`.
    ///
    /// The mount starts at its park position if `start_parked` is set and at
    /// its home position otherwise, with the matching latch set.
    pub fn with_clock(config: TelescopeConfig, utc: DateTime<Utc>) -> Result<Self, InvalidConfig> {
        config.validate()?;
        let parked = config.start_parked;
        let mut telescope = Self {
            config,
            utc,
            axes: Vector::ZERO,
            target_axes: Vector::ZERO,
            slew: SlewState::None,
            settle_remaining: Duration::ZERO,
            tracking: false,
            rate_offset: Vector::ZERO,
            move_rate: Vector::ZERO,
            hand_rate: Vector::ZERO,
            guide_ra: None,
            guide_dec: None,
            at_park: parked,
            at_home: !parked,
            target_ra: None,
            target_dec: None,
        };
        telescope.axes = if parked {
            telescope.park_axes()
        } else {
            telescope.home_axes()
        };
        telescope.target_axes = telescope.axes;
        Ok(telescope)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by `elapsed`.
    ///
    /// Every contribution is computed from the same pre-tick position and
    /// applied once: tracking, rate offset, `MoveAxis`, slewing, hand
    /// control, and pulse guiding, in that order.
    pub fn advance(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f64();
        let ctx = self.frame();
        let snapshot = self.axes;
        let alignment = self.config.alignment;
        let rates = self.config.slew_rates;

        let mut tracking_delta = Vector::ZERO;
        let mut target_delta = Vector::ZERO;
        if self.tracking && self.move_rate.primary.abs() < f64::EPSILON {
            let hour_angle_step =
                Vector::new(self.config.tracking_rate.degrees_per_second() * dt, 0.0);
            tracking_delta = ctx.equatorial_delta(snapshot, hour_angle_step);
            if self.slew == SlewState::RaDec {
                target_delta = ctx.equatorial_delta(self.target_axes, hour_angle_step);
            }
        }

        let mut delta = tracking_delta;
        if self.tracking && !self.rate_offset.is_zero() {
            // Increasing right ascension means decreasing hour angle.
            let offset = Vector::new(-self.rate_offset.primary, self.rate_offset.secondary);
            delta += ctx.equatorial_delta(snapshot, offset.scale(dt));
        }

        delta += self.move_rate.scale(dt);

        if self.slew.is_moving() {
            let remaining = axis_remaining(
                alignment,
                snapshot + tracking_delta,
                self.target_axes + target_delta,
            );
            delta += Vector::new(
                slew_step(remaining.primary, &rates, dt),
                slew_step(remaining.secondary, &rates, dt),
            );
        }

        delta += self.hand_rate.scale(dt);

        let guide = self.consume_guiding(elapsed);
        if !guide.is_zero() {
            delta += ctx.equatorial_delta(snapshot, guide);
        }

        self.axes = ctx.normalize(snapshot + delta);
        if !target_delta.is_zero() {
            self.target_axes = ctx.normalize(self.target_axes + target_delta);
        }
        self.utc += TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero());

        self.update_slew(elapsed, dt);
        self.update_latches();
    }

    /// Apply owed pulse-guide time and return the hour angle / declination
    /// displacement it produced.
    fn consume_guiding(&mut self, elapsed: Duration) -> Vector {
        let mut hadec = Vector::ZERO;
        if let Some(pulse) = self.guide_ra.as_mut() {
            hadec.primary = -pulse.consume(elapsed, self.config.guide_rate_right_ascension);
            if pulse.is_finished() {
                self.guide_ra = None;
                debug!("right ascension pulse complete");
            }
        }
        if let Some(pulse) = self.guide_dec.as_mut() {
            hadec.secondary = pulse.consume(elapsed, self.config.guide_rate_declination);
            if pulse.is_finished() {
                self.guide_dec = None;
                debug!("declination pulse complete");
            }
        }
        hadec
    }

    fn update_slew(&mut self, elapsed: Duration, dt: f64) {
        match self.slew {
            SlewState::None => {}
            SlewState::Settle => {
                self.settle_remaining = self.settle_remaining.saturating_sub(elapsed);
                if self.settle_remaining.is_zero() {
                    self.slew = SlewState::None;
                    debug!("slew settled");
                }
            }
            state => {
                let remaining = axis_remaining(self.config.alignment, self.axes, self.target_axes);
                if arrived(remaining, &self.config.slew_rates, dt) {
                    self.axes = self.target_axes;
                    self.complete_slew(state);
                }
            }
        }
    }

    fn complete_slew(&mut self, state: SlewState) {
        match state {
            SlewState::Park => {
                self.slew = SlewState::None;
                self.tracking = false;
                self.at_park = true;
                debug!("park complete");
            }
            SlewState::Home => {
                self.slew = SlewState::None;
                self.at_home = true;
                debug!("home complete");
            }
            _ => {
                self.slew = SlewState::Settle;
                self.settle_remaining = Duration::from_secs(u64::from(self.config.settle_time_secs));
                debug!(?state, settle_secs = self.config.settle_time_secs, "slew arrived");
            }
        }
    }

    fn update_latches(&mut self) {
        let alignment = self.config.alignment;
        if self.at_home {
            let drift = axis_remaining(alignment, self.axes, self.home_axes());
            if drift.primary.abs() > LATCH_TOLERANCE || drift.secondary.abs() > LATCH_TOLERANCE {
                self.at_home = false;
            }
        }
        if self.at_park {
            let drift = axis_remaining(alignment, self.axes, self.park_axes());
            if drift.primary.abs() > LATCH_TOLERANCE || drift.secondary.abs() > LATCH_TOLERANCE {
                self.at_park = false;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Frames and guards
    // -----------------------------------------------------------------------

    /// Conversion context for the current instant.
    pub fn frame(&self) -> FrameContext {
        FrameContext {
            alignment: self.config.alignment,
            latitude: self.config.latitude,
            sidereal_hours: self.sidereal_time(),
            hour_angle_limit: self.config.hour_angle_limit,
        }
    }

    fn park_axes(&self) -> Vector {
        let ctx = self.frame();
        ctx.normalize(ctx.axes_from_altaz(Vector::new(
            self.config.park_azimuth,
            self.config.park_altitude,
        )))
    }

    fn home_axes(&self) -> Vector {
        let ctx = self.frame();
        ctx.normalize(ctx.axes_from_altaz(Vector::new(
            self.config.home_azimuth,
            self.config.home_altitude,
        )))
    }

    fn require(flag: bool, member: &str) -> AlpacaResult<()> {
        if flag {
            Ok(())
        } else {
            Err(AlpacaError::not_implemented(member))
        }
    }

    fn ensure_unparked(&self, operation: &str) -> AlpacaResult<()> {
        if self.at_park {
            Err(AlpacaError::parked(operation))
        } else {
            Ok(())
        }
    }

    fn require_slew(flag_sync: bool, flag_async: bool, mode: SlewMode, member: &str) -> AlpacaResult<()> {
        match mode {
            SlewMode::Synchronous => Self::require(flag_sync, member),
            SlewMode::Asynchronous => Self::require(flag_async, &format!("{member}Async")),
        }
    }

    fn check_radec(right_ascension: f64, declination: f64) -> AlpacaResult<()> {
        if !(0.0..=24.0).contains(&right_ascension) {
            return Err(AlpacaError::invalid_value(format!(
                "right ascension {right_ascension} is outside [0, 24]"
            )));
        }
        if !(-90.0..=90.0).contains(&declination) {
            return Err(AlpacaError::invalid_value(format!(
                "declination {declination} is outside [-90, 90]"
            )));
        }
        Ok(())
    }

    fn check_altaz(azimuth: f64, altitude: f64) -> AlpacaResult<()> {
        if !(0.0..=360.0).contains(&azimuth) {
            return Err(AlpacaError::invalid_value(format!(
                "azimuth {azimuth} is outside [0, 360]"
            )));
        }
        if !(-90.0..=90.0).contains(&altitude) {
            return Err(AlpacaError::invalid_value(format!(
                "altitude {altitude} is outside [-90, 90]"
            )));
        }
        Ok(())
    }

    /// Point the slew machine at `target`, normalized into axis range.
    ///
    /// `MoveAxis` and hand-control rates are dropped.
    fn begin_slew(&mut self, state: SlewState, target: Vector) {
        let target = self.frame().normalize(target);
        self.target_axes = target;
        self.slew = state;
        self.settle_remaining = Duration::ZERO;
        self.move_rate = Vector::ZERO;
        self.hand_rate = Vector::ZERO;
        self.at_home = false;
        debug!(
            ?state,
            target_primary = target.primary,
            target_secondary = target.secondary,
            "slew started"
        );
    }

    // -----------------------------------------------------------------------
    // Slewing and syncing
    // -----------------------------------------------------------------------

    /// Stop any slew, `MoveAxis` motion, and hand control.
    pub fn abort_slew(&mut self) -> AlpacaResult<()> {
        self.ensure_unparked("AbortSlew")?;
        if self.slew != SlewState::None {
            debug!(state = ?self.slew, "slew aborted");
        }
        self.slew = SlewState::None;
        self.settle_remaining = Duration::ZERO;
        self.move_rate = Vector::ZERO;
        self.hand_rate = Vector::ZERO;
        Ok(())
    }

    /// Start slewing to right ascension (hours) and declination (degrees).
    ///
    /// The coordinates also become the target. Tracking must be on.
    pub fn start_slew_radec(
        &mut self,
        right_ascension: f64,
        declination: f64,
        mode: SlewMode,
    ) -> AlpacaResult<()> {
        let caps = self.config.capabilities;
        Self::require_slew(caps.can_slew, caps.can_slew_async, mode, "SlewToCoordinates")?;
        Self::check_radec(right_ascension, declination)?;
        self.ensure_unparked("SlewToCoordinates")?;
        if !self.tracking {
            return Err(AlpacaError::invalid_operation(
                "equatorial slews require tracking to be on",
            ));
        }
        self.target_ra = Some(right_ascension);
        self.target_dec = Some(declination);
        let target = self.frame().axes_from_radec(Vector::new(right_ascension, declination));
        self.begin_slew(SlewState::RaDec, target);
        Ok(())
    }

    /// Start slewing to the current target coordinates.
    pub fn slew_to_target(&mut self, mode: SlewMode) -> AlpacaResult<()> {
        let (ra, dec) = self.target()?;
        let caps = self.config.capabilities;
        Self::require_slew(caps.can_slew, caps.can_slew_async, mode, "SlewToTarget")?;
        self.start_slew_radec(ra, dec, mode)
    }

    /// Start slewing to azimuth and altitude (degrees). Tracking must be off.
    pub fn start_slew_altaz(&mut self, azimuth: f64, altitude: f64, mode: SlewMode) -> AlpacaResult<()> {
        let caps = self.config.capabilities;
        Self::require_slew(caps.can_slew_alt_az, caps.can_slew_alt_az_async, mode, "SlewToAltAz")?;
        Self::check_altaz(azimuth, altitude)?;
        self.ensure_unparked("SlewToAltAz")?;
        if self.tracking {
            return Err(AlpacaError::invalid_operation(
                "Alt/Az slews require tracking to be off",
            ));
        }
        let target = self.frame().axes_from_altaz(Vector::new(azimuth, altitude));
        self.begin_slew(SlewState::AltAz, target);
        Ok(())
    }

    /// Stop tracking and slew to the park position. Already parked is a no-op.
    pub fn park(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_park, "Park")?;
        if self.at_park {
            return Ok(());
        }
        self.tracking = false;
        let target = self.park_axes();
        self.begin_slew(SlewState::Park, target);
        Ok(())
    }

    /// Release the park latch.
    pub fn unpark(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_unpark, "Unpark")?;
        self.at_park = false;
        Ok(())
    }

    /// Make the current Alt/Az position the park position.
    pub fn set_park(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_park, "SetPark")?;
        let altaz = self.altaz();
        self.config.park_azimuth = altaz.primary;
        self.config.park_altitude = altaz.secondary;
        debug!(azimuth = altaz.primary, altitude = altaz.secondary, "park position set");
        Ok(())
    }

    /// Stop tracking and slew to the home position.
    pub fn find_home(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_find_home, "FindHome")?;
        self.ensure_unparked("FindHome")?;
        self.tracking = false;
        let target = self.home_axes();
        self.begin_slew(SlewState::Home, target);
        Ok(())
    }

    /// Declare that the mount points at the given coordinates.
    pub fn sync_to_coordinates(&mut self, right_ascension: f64, declination: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_sync, "SyncToCoordinates")?;
        Self::check_radec(right_ascension, declination)?;
        self.ensure_unparked("SyncToCoordinates")?;
        if !self.tracking {
            return Err(AlpacaError::invalid_operation(
                "equatorial syncs require tracking to be on",
            ));
        }
        self.target_ra = Some(right_ascension);
        self.target_dec = Some(declination);
        let ctx = self.frame();
        self.axes = ctx.normalize(ctx.axes_from_radec(Vector::new(right_ascension, declination)));
        self.at_home = false;
        debug!(right_ascension, declination, "synced to coordinates");
        Ok(())
    }

    /// Declare that the mount points at the target coordinates.
    pub fn sync_to_target(&mut self) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_sync, "SyncToTarget")?;
        let (ra, dec) = self.target()?;
        self.sync_to_coordinates(ra, dec)
    }

    /// Declare that the mount points at the given azimuth and altitude.
    pub fn sync_to_altaz(&mut self, azimuth: f64, altitude: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_sync_alt_az, "SyncToAltAz")?;
        Self::check_altaz(azimuth, altitude)?;
        self.ensure_unparked("SyncToAltAz")?;
        if self.tracking {
            return Err(AlpacaError::invalid_operation(
                "Alt/Az syncs require tracking to be off",
            ));
        }
        let ctx = self.frame();
        self.axes = ctx.normalize(ctx.axes_from_altaz(Vector::new(azimuth, altitude)));
        self.at_home = false;
        debug!(azimuth, altitude, "synced to Alt/Az");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Manual motion
    // -----------------------------------------------------------------------

    /// Start a pulse-guide correction of `duration_ms` milliseconds.
    pub fn pulse_guide(&mut self, direction: GuideDirection, duration_ms: i32) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_pulse_guide, "PulseGuide")?;
        if duration_ms < 0 {
            return Err(AlpacaError::invalid_value(format!(
                "pulse guide duration {duration_ms} ms is negative"
            )));
        }
        self.ensure_unparked("PulseGuide")?;
        let other_axis_busy = if direction.is_right_ascension() {
            self.guide_dec.is_some()
        } else {
            self.guide_ra.is_some()
        };
        if other_axis_busy && !self.config.capabilities.can_dual_axis_pulse_guide {
            return Err(AlpacaError::invalid_operation(
                "the mount cannot pulse guide both axes at once",
            ));
        }
        let duration = Duration::from_millis(u64::from(duration_ms.unsigned_abs()));
        let pulse = (!duration.is_zero()).then(|| Pulse::new(direction, duration));
        if direction.is_right_ascension() {
            self.guide_ra = pulse;
        } else {
            self.guide_dec = pulse;
        }
        debug!(?direction, duration_ms, "pulse guide started");
        Ok(())
    }

    /// Drive one axis at `rate` degrees per second until stopped with zero.
    ///
    /// A nonzero primary rate suspends sidereal tracking on that axis.
    pub fn move_axis(&mut self, axis: TelescopeAxis, rate: f64) -> AlpacaResult<()> {
        let caps = self.config.capabilities;
        match axis {
            TelescopeAxis::Primary => Self::require(caps.can_move_primary_axis, "MoveAxis(Primary)")?,
            TelescopeAxis::Secondary => {
                Self::require(caps.can_move_secondary_axis, "MoveAxis(Secondary)")?;
            }
            TelescopeAxis::Tertiary => {
                return Err(AlpacaError::not_implemented("MoveAxis(Tertiary)"));
            }
        }
        if !rate.is_finite() || rate.abs() > self.config.max_move_rate {
            return Err(AlpacaError::invalid_value(format!(
                "rate {rate} exceeds the maximum of {} deg/s",
                self.config.max_move_rate
            )));
        }
        let moving = rate.abs() > 0.0;
        if moving {
            self.ensure_unparked("MoveAxis")?;
            if self.slew.is_moving() {
                self.slew = SlewState::None;
            }
            self.at_home = false;
        }
        match axis {
            TelescopeAxis::Primary => self.move_rate.primary = rate,
            _ => self.move_rate.secondary = rate,
        }
        debug!(?axis, rate, "move axis");
        Ok(())
    }

    /// Rates accepted by [`Telescope::move_axis`] for `axis`.
    pub fn axis_rates(&self, axis: TelescopeAxis) -> Vec<AxisRate> {
        if self.can_move_axis(axis) {
            vec![AxisRate {
                minimum: 0.0,
                maximum: self.config.max_move_rate,
            }]
        } else {
            Vec::new()
        }
    }

    /// Whether `MoveAxis` is supported on `axis`.
    pub const fn can_move_axis(&self, axis: TelescopeAxis) -> bool {
        match axis {
            TelescopeAxis::Primary => self.config.capabilities.can_move_primary_axis,
            TelescopeAxis::Secondary => self.config.capabilities.can_move_secondary_axis,
            TelescopeAxis::Tertiary => false,
        }
    }

    /// Drive the axes in a fixed direction at a slew speed.
    ///
    /// Only the sign of `primary` and `secondary` matters; zero stops that
    /// axis.
    pub fn set_hand_control(&mut self, primary: f64, secondary: f64, speed: HandSpeed) -> AlpacaResult<()> {
        self.ensure_unparked("HandControl")?;
        let rate = speed.rate(&self.config.slew_rates);
        self.hand_rate = Vector::new(direction_of(primary) * rate, direction_of(secondary) * rate);
        if !self.hand_rate.is_zero() {
            self.at_home = false;
        }
        debug!(primary, secondary, ?speed, "hand control");
        Ok(())
    }

    /// Stop hand-control motion.
    pub fn stop_hand_control(&mut self) {
        self.hand_rate = Vector::ZERO;
    }

    /// Slew to the other pointing state for the current position.
    pub fn set_side_of_pier(&mut self, side: PierSide) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_pier_side, "SideOfPier")?;
        if self.config.alignment != AlignmentMode::GermanPolar {
            return Err(AlpacaError::not_implemented("SideOfPier on a non-German mount"));
        }
        if side == PierSide::Unknown {
            return Err(AlpacaError::invalid_value("pier side must be East or West"));
        }
        self.ensure_unparked("SideOfPier")?;
        let ctx = self.frame();
        if ctx.side_of_pier(self.axes) == side {
            return Ok(());
        }
        let alternate = ctx.alternate_axes(self.axes).ok_or_else(|| {
            AlpacaError::invalid_operation("the other side of the pier is beyond the hour angle limit")
        })?;
        self.begin_slew(SlewState::RaDec, alternate);
        Ok(())
    }

    /// The pier side a slew to the given coordinates would end on.
    pub fn destination_side_of_pier(&self, right_ascension: f64, declination: f64) -> AlpacaResult<PierSide> {
        Self::check_radec(right_ascension, declination)?;
        let ctx = self.frame();
        Ok(ctx.side_of_pier(ctx.axes_from_radec(Vector::new(right_ascension, declination))))
    }

    // -----------------------------------------------------------------------
    // Tracking and rates
    // -----------------------------------------------------------------------

    /// Whether sidereal tracking is on.
    pub const fn tracking(&self) -> bool {
        self.tracking
    }

    /// Switch sidereal tracking.
    pub fn set_tracking(&mut self, on: bool) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_tracking, "Tracking")?;
        if on {
            self.ensure_unparked("Tracking")?;
        }
        if self.tracking != on {
            debug!(tracking = on, "tracking changed");
        }
        self.tracking = on;
        Ok(())
    }

    /// The tracking mode derived from tracking, alignment and hemisphere.
    pub fn tracking_mode(&self) -> TrackingMode {
        TrackingMode::derive(self.tracking, self.config.alignment, self.config.latitude)
    }

    /// The selected drive rate.
    pub const fn tracking_rate(&self) -> DriveRate {
        self.config.tracking_rate
    }

    /// Select a drive rate.
    pub fn set_tracking_rate(&mut self, rate: DriveRate) {
        self.config.tracking_rate = rate;
    }

    /// All supported drive rates.
    pub const fn tracking_rates(&self) -> &'static [DriveRate] {
        &DriveRate::ALL
    }

    /// Right ascension rate offset in seconds of RA per sidereal second.
    pub fn right_ascension_rate(&self) -> f64 {
        self.rate_offset.primary / SIDEREAL_RATIO * 3600.0 / 15.0
    }

    /// Set the right ascension rate offset (seconds of RA per sidereal second).
    pub fn set_right_ascension_rate(&mut self, rate: f64) -> AlpacaResult<()> {
        Self::require(
            self.config.capabilities.can_set_right_ascension_rate,
            "RightAscensionRate",
        )?;
        if !rate.is_finite() {
            return Err(AlpacaError::invalid_value("right ascension rate must be finite"));
        }
        self.rate_offset.primary = rate * 15.0 / 3600.0 * SIDEREAL_RATIO;
        Ok(())
    }

    /// Declination rate offset in arcseconds per SI second.
    pub fn declination_rate(&self) -> f64 {
        self.rate_offset.secondary * 3600.0
    }

    /// Set the declination rate offset (arcseconds per SI second).
    pub fn set_declination_rate(&mut self, rate: f64) -> AlpacaResult<()> {
        Self::require(
            self.config.capabilities.can_set_declination_rate,
            "DeclinationRate",
        )?;
        if !rate.is_finite() {
            return Err(AlpacaError::invalid_value("declination rate must be finite"));
        }
        self.rate_offset.secondary = rate / 3600.0;
        Ok(())
    }

    /// Right ascension guide rate in degrees per second.
    pub const fn guide_rate_right_ascension(&self) -> f64 {
        self.config.guide_rate_right_ascension
    }

    /// Declination guide rate in degrees per second.
    pub const fn guide_rate_declination(&self) -> f64 {
        self.config.guide_rate_declination
    }

    fn check_guide_rate(&self, rate: f64) -> AlpacaResult<()> {
        Self::require(self.config.capabilities.can_set_guide_rates, "GuideRate")?;
        if rate.is_finite() && rate > 0.0 && rate <= self.config.max_move_rate {
            Ok(())
        } else {
            Err(AlpacaError::invalid_value(format!(
                "guide rate {rate} must be positive and at most {} deg/s",
                self.config.max_move_rate
            )))
        }
    }

    /// Set the right ascension guide rate (degrees per second).
    pub fn set_guide_rate_right_ascension(&mut self, rate: f64) -> AlpacaResult<()> {
        self.check_guide_rate(rate)?;
        self.config.guide_rate_right_ascension = rate;
        Ok(())
    }

    /// Set the declination guide rate (degrees per second).
    pub fn set_guide_rate_declination(&mut self, rate: f64) -> AlpacaResult<()> {
        self.check_guide_rate(rate)?;
        self.config.guide_rate_declination = rate;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Targets
    // -----------------------------------------------------------------------

    fn target(&self) -> AlpacaResult<(f64, f64)> {
        Ok((self.target_right_ascension()?, self.target_declination()?))
    }

    /// Target right ascension in hours.
    pub fn target_right_ascension(&self) -> AlpacaResult<f64> {
        self.target_ra
            .ok_or_else(|| AlpacaError::ValueNotSet("TargetRightAscension".to_owned()))
    }

    /// Set the target right ascension (hours).
    pub fn set_target_right_ascension(&mut self, hours: f64) -> AlpacaResult<()> {
        if !(0.0..=24.0).contains(&hours) {
            return Err(AlpacaError::invalid_value(format!(
                "target right ascension {hours} is outside [0, 24]"
            )));
        }
        self.target_ra = Some(hours);
        Ok(())
    }

    /// Target declination in degrees.
    pub fn target_declination(&self) -> AlpacaResult<f64> {
        self.target_dec
            .ok_or_else(|| AlpacaError::ValueNotSet("TargetDeclination".to_owned()))
    }

    /// Set the target declination (degrees).
    pub fn set_target_declination(&mut self, degrees: f64) -> AlpacaResult<()> {
        if !(-90.0..=90.0).contains(&degrees) {
            return Err(AlpacaError::invalid_value(format!(
                "target declination {degrees} is outside [-90, 90]"
            )));
        }
        self.target_dec = Some(degrees);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Site and clock
    // -----------------------------------------------------------------------

    /// Site latitude in degrees.
    pub const fn site_latitude(&self) -> f64 {
        self.config.latitude
    }

    /// Set the site latitude (degrees).
    pub fn set_site_latitude(&mut self, degrees: f64) -> AlpacaResult<()> {
        if !(-90.0..=90.0).contains(&degrees) {
            return Err(AlpacaError::invalid_value(format!(
                "latitude {degrees} is outside [-90, 90]"
            )));
        }
        self.config.latitude = degrees;
        Ok(())
    }

    /// Site longitude in degrees, east positive.
    pub const fn site_longitude(&self) -> f64 {
        self.config.longitude
    }

    /// Set the site longitude (degrees, east positive).
    pub fn set_site_longitude(&mut self, degrees: f64) -> AlpacaResult<()> {
        if !(-180.0..=180.0).contains(&degrees) {
            return Err(AlpacaError::invalid_value(format!(
                "longitude {degrees} is outside [-180, 180]"
            )));
        }
        self.config.longitude = degrees;
        Ok(())
    }

    /// Site elevation in metres.
    pub const fn site_elevation(&self) -> f64 {
        self.config.elevation
    }

    /// Set the site elevation (metres).
    pub fn set_site_elevation(&mut self, metres: f64) -> AlpacaResult<()> {
        if !(-300.0..=10_000.0).contains(&metres) {
            return Err(AlpacaError::invalid_value(format!(
                "elevation {metres} is outside [-300, 10000]"
            )));
        }
        self.config.elevation = metres;
        Ok(())
    }

    /// The simulated UTC clock.
    pub const fn utc_date(&self) -> DateTime<Utc> {
        self.utc
    }

    /// Move the simulated UTC clock.
    pub fn set_utc_date(&mut self, utc: DateTime<Utc>) {
        debug!(%utc, "clock set");
        self.utc = utc;
    }

    /// Local sidereal time in hours.
    pub fn sidereal_time(&self) -> f64 {
        local_sidereal_time(self.utc, self.config.longitude)
    }

    /// Post-slew settle time in seconds.
    pub const fn slew_settle_time(&self) -> u32 {
        self.config.settle_time_secs
    }

    /// Set the post-slew settle time in seconds.
    pub fn set_slew_settle_time(&mut self, seconds: i32) -> AlpacaResult<()> {
        let seconds = u32::try_from(seconds).map_err(|_e| {
            AlpacaError::invalid_value(format!("settle time {seconds} s is negative"))
        })?;
        self.config.settle_time_secs = seconds;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Position and status
    // -----------------------------------------------------------------------

    /// Raw mount axes.
    pub const fn axes(&self) -> Vector {
        self.axes
    }

    /// Current azimuth and altitude.
    pub fn altaz(&self) -> Vector {
        self.frame().altaz_from_axes(self.axes)
    }

    /// Current right ascension (hours) and declination (degrees).
    pub fn radec(&self) -> Vector {
        self.frame().radec_from_axes(self.axes)
    }

    /// Current altitude in degrees.
    pub fn altitude(&self) -> f64 {
        self.altaz().secondary
    }

    /// Current azimuth in degrees.
    pub fn azimuth(&self) -> f64 {
        self.altaz().primary
    }

    /// Current right ascension in hours.
    pub fn right_ascension(&self) -> f64 {
        self.radec().primary
    }

    /// Current declination in degrees.
    pub fn declination(&self) -> f64 {
        self.radec().secondary
    }

    /// Pointing state of the mount.
    pub fn side_of_pier(&self) -> PierSide {
        self.frame().side_of_pier(self.axes)
    }

    /// Slew state machine position.
    pub const fn slew_state(&self) -> SlewState {
        self.slew
    }

    /// Whether anything is moving the axes other than tracking and guiding.
    pub fn slewing(&self) -> bool {
        self.slew != SlewState::None || !self.move_rate.is_zero() || !self.hand_rate.is_zero()
    }

    /// Whether a pulse-guide correction is in progress on either axis.
    pub const fn is_pulse_guiding(&self) -> bool {
        self.guide_ra.is_some() || self.guide_dec.is_some()
    }

    /// Whether the mount finished a park and has not moved since.
    pub const fn at_park(&self) -> bool {
        self.at_park
    }

    /// Whether the mount finished a home and has not moved since.
    pub const fn at_home(&self) -> bool {
        self.at_home
    }

    // -----------------------------------------------------------------------
    // Static description
    // -----------------------------------------------------------------------

    /// Current configuration, including runtime changes.
    pub const fn config(&self) -> &TelescopeConfig {
        &self.config
    }

    /// Capability flags.
    pub const fn capabilities(&self) -> &TelescopeCapabilities {
        &self.config.capabilities
    }

    /// Mechanical configuration.
    pub const fn alignment_mode(&self) -> AlignmentMode {
        self.config.alignment
    }

    /// Coordinate epoch of reported positions.
    pub const fn equatorial_system(&self) -> EquatorialSystem {
        EquatorialSystem::Topocentric
    }

    /// Aperture area in square metres.
    pub const fn aperture_area(&self) -> f64 {
        self.config.aperture_area
    }

    /// Aperture diameter in metres.
    pub const fn aperture_diameter(&self) -> f64 {
        self.config.aperture_diameter
    }

    /// Focal length in metres.
    pub const fn focal_length(&self) -> f64 {
        self.config.focal_length
    }

    /// Whether refraction is applied.
    pub const fn does_refraction(&self) -> bool {
        self.config.does_refraction
    }

    /// Switch refraction.
    pub fn set_does_refraction(&mut self, on: bool) {
        self.config.does_refraction = on;
    }

    /// Tick interval the runner should use.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }
}

/// `1`, `-1`, or `0` for positive, negative, or zero input.
fn direction_of(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 21, 0, 0).unwrap()
    }

    fn telescope(config: TelescopeConfig) -> Telescope {
        Telescope::with_clock(config, clock()).unwrap()
    }

    fn run_until_idle(telescope: &mut Telescope, max_ticks: usize) -> Vec<SlewState> {
        let mut states = Vec::new();
        for _ in 0..max_ticks {
            telescope.advance(TICK);
            if states.last() != Some(&telescope.slew_state()) {
                states.push(telescope.slew_state());
            }
            if telescope.slew_state() == SlewState::None {
                break;
            }
        }
        states
    }

    #[test]
    fn starts_at_home() {
        let scope = telescope(TelescopeConfig::default());
        assert!(scope.at_home());
        assert!(!scope.at_park());
        assert!((scope.azimuth() - 90.0).abs() < 1e-6);
        assert!(scope.altitude().abs() < 1e-6);
    }

    #[test]
    fn german_primary_clamps_under_tracking() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.axes = Vector::new(199.0, 150.0);
        scope.tracking = true;
        // Two degrees of sidereal motion takes about 479 seconds.
        for _ in 0..4800 {
            scope.advance(TICK);
            assert!(scope.axes().primary <= 200.0);
            assert!(scope.axes().primary >= 199.0);
        }
        assert!((scope.axes().primary - 200.0).abs() < 1e-9);
        assert!((scope.axes().secondary - 150.0).abs() < 1e-9);
    }

    #[test]
    fn radec_slew_converges_through_settle() {
        let config = TelescopeConfig {
            settle_time_secs: 1,
            ..TelescopeConfig::default()
        };
        let mut scope = telescope(config);
        scope.set_tracking(true).unwrap();
        let ra = (scope.sidereal_time() + 1.5).rem_euclid(24.0);
        scope.start_slew_radec(ra, 35.0, SlewMode::Asynchronous).unwrap();
        assert!(scope.slewing());
        assert!(!scope.at_home());

        let states = run_until_idle(&mut scope, 2_000);
        assert_eq!(states.last(), Some(&SlewState::None));
        assert!(states.contains(&SlewState::Settle));
        assert!(!scope.slewing());
        assert!((scope.right_ascension() - ra).abs() < 1e-6);
        assert!((scope.declination() - 35.0).abs() < 1e-6);
        assert_eq!(scope.side_of_pier(), PierSide::West);
    }

    #[test]
    fn altaz_slew_requires_tracking_off() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_tracking(true).unwrap();
        let err = scope.start_slew_altaz(180.0, 45.0, SlewMode::Synchronous).unwrap_err();
        assert!(matches!(err, AlpacaError::InvalidOperation(_)));

        scope.set_tracking(false).unwrap();
        scope.start_slew_altaz(180.0, 45.0, SlewMode::Synchronous).unwrap();
        run_until_idle(&mut scope, 2_000);
        assert!((scope.azimuth() - 180.0).abs() < 1e-6);
        assert!((scope.altitude() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn radec_slew_requires_tracking() {
        let mut scope = telescope(TelescopeConfig::default());
        let err = scope.start_slew_radec(1.0, 10.0, SlewMode::Asynchronous).unwrap_err();
        assert!(matches!(err, AlpacaError::InvalidOperation(_)));
    }

    #[test]
    fn slew_to_unset_target_fails() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_tracking(true).unwrap();
        let err = scope.slew_to_target(SlewMode::Asynchronous).unwrap_err();
        assert!(matches!(err, AlpacaError::ValueNotSet(_)));
        assert!(matches!(scope.target_declination(), Err(AlpacaError::ValueNotSet(_))));
    }

    #[test]
    fn coordinate_range_checks() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_tracking(true).unwrap();
        assert!(matches!(
            scope.start_slew_radec(25.0, 0.0, SlewMode::Asynchronous),
            Err(AlpacaError::InvalidValue(_))
        ));
        assert!(matches!(
            scope.set_target_declination(-91.0),
            Err(AlpacaError::InvalidValue(_))
        ));
        assert!(matches!(
            scope.set_site_latitude(90.5),
            Err(AlpacaError::InvalidValue(_))
        ));
    }

    #[test]
    fn pulse_guide_moves_exact_duration() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.axes = Vector::new(60.0, 20.0);
        let rate = scope.guide_rate_right_ascension();
        scope.pulse_guide(GuideDirection::East, 2000).unwrap();

        for _ in 0..19 {
            scope.advance(TICK);
            assert!(scope.is_pulse_guiding());
        }
        scope.advance(TICK);
        assert!(!scope.is_pulse_guiding());

        // Guiding east raises right ascension, which lowers the hour angle.
        let moved = 60.0 - scope.axes().primary;
        assert!((moved - 2.0 * rate).abs() < 1e-12);
        assert!((scope.axes().secondary - 20.0).abs() < 1e-12);

        scope.advance(TICK);
        assert!((60.0 - scope.axes().primary - 2.0 * rate).abs() < 1e-12);
    }

    #[test]
    fn pulse_guide_rejects_negative_and_dual_axis() {
        let config = TelescopeConfig {
            capabilities: TelescopeCapabilities {
                can_dual_axis_pulse_guide: false,
                ..TelescopeCapabilities::default()
            },
            ..TelescopeConfig::default()
        };
        let mut scope = telescope(config);
        assert!(matches!(
            scope.pulse_guide(GuideDirection::North, -5),
            Err(AlpacaError::InvalidValue(_))
        ));
        scope.pulse_guide(GuideDirection::North, 500).unwrap();
        assert!(matches!(
            scope.pulse_guide(GuideDirection::West, 500),
            Err(AlpacaError::InvalidOperation(_))
        ));
        // Re-pulsing the same axis replaces the running pulse.
        scope.pulse_guide(GuideDirection::South, 200).unwrap();
    }

    #[test]
    fn disabled_capability_is_not_implemented() {
        let config = TelescopeConfig {
            capabilities: TelescopeCapabilities {
                can_park: false,
                can_slew_async: false,
                ..TelescopeCapabilities::default()
            },
            ..TelescopeConfig::default()
        };
        let mut scope = telescope(config);
        assert!(matches!(scope.park(), Err(AlpacaError::NotImplemented(_))));
        scope.set_tracking(true).unwrap();
        let err = scope.start_slew_radec(1.0, 1.0, SlewMode::Asynchronous).unwrap_err();
        assert_eq!(err, AlpacaError::NotImplemented("SlewToCoordinatesAsync".to_owned()));
        assert!(scope.start_slew_radec(1.0, 1.0, SlewMode::Synchronous).is_ok());
    }

    #[test]
    fn park_latches_and_blocks_motion() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_tracking(true).unwrap();
        scope.park().unwrap();
        assert!(!scope.tracking());
        run_until_idle(&mut scope, 2_000);
        assert!(scope.at_park());
        assert!(!scope.slewing());
        assert!((scope.azimuth() - 270.0).abs() < 1e-6);

        assert!(matches!(scope.find_home(), Err(AlpacaError::Parked(_))));
        assert!(matches!(
            scope.move_axis(TelescopeAxis::Primary, 1.0),
            Err(AlpacaError::Parked(_))
        ));
        assert!(matches!(scope.set_tracking(true), Err(AlpacaError::Parked(_))));

        scope.unpark().unwrap();
        scope.find_home().unwrap();
        run_until_idle(&mut scope, 2_000);
        assert!(scope.at_home());
    }

    #[test]
    fn set_park_uses_current_position() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.sync_to_altaz(123.0, 40.0).unwrap();
        scope.set_park().unwrap();
        assert!((scope.config().park_azimuth - 123.0).abs() < 1e-6);
        assert!((scope.config().park_altitude - 40.0).abs() < 1e-6);
    }

    #[test]
    fn tracking_drift_clears_home() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_tracking(true).unwrap();
        for _ in 0..30 {
            scope.advance(TICK);
        }
        assert!(!scope.at_home());
    }

    #[test]
    fn move_axis_limits_and_suppresses_tracking() {
        let mut scope = telescope(TelescopeConfig::default());
        assert!(matches!(
            scope.move_axis(TelescopeAxis::Primary, 6.0),
            Err(AlpacaError::InvalidValue(_))
        ));
        assert!(matches!(
            scope.move_axis(TelescopeAxis::Tertiary, 1.0),
            Err(AlpacaError::NotImplemented(_))
        ));
        assert_eq!(scope.axis_rates(TelescopeAxis::Tertiary), Vec::new());

        scope.set_tracking(true).unwrap();
        let start = scope.axes();
        scope.move_axis(TelescopeAxis::Primary, -1.0).unwrap();
        assert!(scope.slewing());
        scope.advance(Duration::from_secs(1));
        // Only the commanded rate applies; sidereal drive is suspended.
        assert!((start.primary - scope.axes().primary - 1.0).abs() < 1e-9);

        scope.move_axis(TelescopeAxis::Primary, 0.0).unwrap();
        assert!(!scope.slewing());
    }

    #[test]
    fn secondary_axis_wraps() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.axes = Vector::new(90.0, 268.0);
        scope.move_axis(TelescopeAxis::Secondary, 4.0).unwrap();
        scope.advance(Duration::from_secs(1));
        assert!((scope.axes().secondary + 88.0).abs() < 1e-9);
    }

    #[test]
    fn side_of_pier_flip_respects_limits() {
        let mut scope = telescope(TelescopeConfig::default());
        // Ten degrees west of the meridian: the flip is reachable.
        scope.axes = Vector::new(10.0, 30.0);
        assert_eq!(scope.side_of_pier(), PierSide::East);
        scope.set_side_of_pier(PierSide::West).unwrap();
        run_until_idle(&mut scope, 2_000);
        assert_eq!(scope.side_of_pier(), PierSide::West);

        // Ninety degrees away it is not.
        scope.axes = Vector::new(90.0, 30.0);
        assert!(matches!(
            scope.set_side_of_pier(PierSide::West),
            Err(AlpacaError::InvalidOperation(_))
        ));
        // Asking for the current side is a no-op.
        scope.set_side_of_pier(PierSide::East).unwrap();
    }

    #[test]
    fn destination_side_follows_hour_angle() {
        let scope = telescope(TelescopeConfig::default());
        let lst = scope.sidereal_time();
        let west_of_meridian = (lst - 2.0).rem_euclid(24.0);
        let east_of_meridian = (lst + 2.0).rem_euclid(24.0);
        assert_eq!(scope.destination_side_of_pier(west_of_meridian, 10.0).unwrap(), PierSide::East);
        assert_eq!(scope.destination_side_of_pier(east_of_meridian, 10.0).unwrap(), PierSide::West);
    }

    #[test]
    fn altaz_mount_tracks_the_sky() {
        let config = TelescopeConfig {
            alignment: AlignmentMode::AltAz,
            ..TelescopeConfig::default()
        };
        let mut scope = telescope(config);
        scope.sync_to_altaz(200.0, 40.0).unwrap();
        let before = scope.radec();
        scope.set_tracking(true).unwrap();
        for _ in 0..600 {
            scope.advance(TICK);
        }
        let after = scope.radec();
        assert!((after.primary - before.primary).abs() < 1e-5);
        assert!((after.secondary - before.secondary).abs() < 1e-5);
        assert_eq!(scope.side_of_pier(), PierSide::Unknown);
        assert_eq!(scope.tracking_mode(), TrackingMode::AltAz);
    }

    #[test]
    fn rate_offsets_round_trip_units() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_right_ascension_rate(0.5).unwrap();
        scope.set_declination_rate(-2.0).unwrap();
        assert!((scope.right_ascension_rate() - 0.5).abs() < 1e-12);
        assert!((scope.declination_rate() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn declination_rate_moves_only_while_tracking() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.axes = Vector::new(30.0, 20.0);
        scope.set_declination_rate(36.0).unwrap();
        scope.advance(Duration::from_secs(10));
        assert!((scope.axes().secondary - 20.0).abs() < 1e-12);

        scope.set_tracking(true).unwrap();
        scope.advance(Duration::from_secs(10));
        assert!((scope.axes().secondary - 20.1).abs() < 1e-9);
    }

    #[test]
    fn clock_advances_with_ticks() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.advance(Duration::from_millis(1500));
        assert_eq!(scope.utc_date(), clock() + TimeDelta::milliseconds(1500));
        assert!(matches!(
            scope.set_slew_settle_time(-1),
            Err(AlpacaError::InvalidValue(_))
        ));
    }

    #[test]
    fn hand_control_moves_at_slew_speed() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.axes = Vector::new(60.0, 20.0);
        scope.set_hand_control(1.0, -3.0, HandSpeed::Slow).unwrap();
        assert!(scope.slewing());
        scope.advance(Duration::from_secs(2));
        assert!(scope.axes().approx_eq(Vector::new(61.0, 19.0), 1e-12));
        scope.stop_hand_control();
        assert!(!scope.slewing());
    }

    fn slew_to_pole(latitude: f64, hours_from_meridian: f64, declination: f64) -> Telescope {
        let config = TelescopeConfig {
            latitude,
            settle_time_secs: 0,
            ..TelescopeConfig::default()
        };
        let mut scope = telescope(config);
        scope.set_tracking(true).unwrap();
        let ra = (scope.sidereal_time() + hours_from_meridian).rem_euclid(24.0);
        scope
            .start_slew_radec(ra, declination, SlewMode::Asynchronous)
            .unwrap();

        let target = scope.target_axes;
        assert!((-90.0..270.0).contains(&target.secondary));

        for _ in 0..3_000 {
            scope.advance(TICK);
            let secondary = scope.axes().secondary;
            assert!((-90.0..270.0).contains(&secondary), "secondary {secondary}");
            if scope.slew_state() == SlewState::None {
                break;
            }
        }
        assert_eq!(scope.slew_state(), SlewState::None);
        scope
    }

    #[test]
    fn slews_to_the_south_pole_on_both_sides_of_the_meridian() {
        for hours in [1.0, -1.0] {
            let scope = slew_to_pole(51.4769, hours, -90.0);
            assert!(
                (scope.declination() + 90.0).abs() < 1e-6,
                "declination {} for {hours} h",
                scope.declination()
            );
        }
    }

    #[test]
    fn southern_site_slews_to_the_north_pole() {
        for hours in [1.0, -1.0] {
            let scope = slew_to_pole(-33.9, hours, 90.0);
            assert!(
                (scope.declination() - 90.0).abs() < 1e-6,
                "declination {} for {hours} h",
                scope.declination()
            );
        }
    }

    #[test]
    fn find_home_converges_while_move_axis_was_running() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.move_axis(TelescopeAxis::Primary, 1.0).unwrap();
        for _ in 0..30 {
            scope.advance(TICK);
        }
        assert!(!scope.at_home());

        scope.find_home().unwrap();
        let states = run_until_idle(&mut scope, 2_000);
        assert_eq!(states.last(), Some(&SlewState::None));
        assert!(scope.at_home());
        assert!(!scope.slewing());
        assert!(scope.move_rate.is_zero());
    }

    #[test]
    fn altaz_slew_converges_after_hand_control() {
        let mut scope = telescope(TelescopeConfig::default());
        scope.set_hand_control(1.0, 1.0, HandSpeed::Medium).unwrap();
        for _ in 0..20 {
            scope.advance(TICK);
        }

        scope.start_slew_altaz(200.0, 30.0, SlewMode::Asynchronous).unwrap();
        let states = run_until_idle(&mut scope, 2_000);
        assert_eq!(states.last(), Some(&SlewState::None));
        assert!(!scope.slewing());
        assert!((scope.azimuth() - 200.0).abs() < 1e-6);
        assert!((scope.altitude() - 30.0).abs() < 1e-6);
    }
}
