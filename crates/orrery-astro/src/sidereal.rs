//! Julian date and local sidereal time.
//!
//! Uses the IAU 1982 expression for Greenwich mean sidereal time, which is
//! accurate to well under a second over the simulator's useful range.

use chrono::{DateTime, Utc};

use crate::angle::{range_360, range_hours};

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian date of the J2000.0 epoch.
const J2000_JD: f64 = 2_451_545.0;

/// Milliseconds per day.
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian date of a UTC instant.
#[allow(clippy::cast_precision_loss)]
pub fn julian_date(utc: DateTime<Utc>) -> f64 {
    // Millisecond timestamps stay exact in f64 for the next ~285,000 years.
    UNIX_EPOCH_JD + utc.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Greenwich mean sidereal time in degrees `[0, 360)` for a Julian date.
pub fn greenwich_sidereal_degrees(jd: f64) -> f64 {
    let days = jd - J2000_JD;
    let t = days / 36_525.0;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * days + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    range_360(gmst)
}

/// Local sidereal time in hours `[0, 24)` at an east-positive longitude.
pub fn local_sidereal_time(utc: DateTime<Utc>, longitude: f64) -> f64 {
    let gmst = greenwich_sidereal_degrees(julian_date(utc));
    range_hours((gmst + longitude) / 15.0)
}
