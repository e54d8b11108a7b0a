//! Range reduction and angular distance helpers.
//!
//! All angles are in degrees unless the function name says hours.

/// Reduce an angle into `[0, 360)`.
pub fn range_360(degrees: f64) -> f64 {
    let reduced = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0.
    if reduced >= 360.0 { 0.0 } else { reduced }
}

/// Reduce an angle into `[-180, 180)`.
pub fn range_180(degrees: f64) -> f64 {
    range_360(degrees + 180.0) - 180.0
}

/// Reduce a secondary-axis angle into `[-90, 270)`.
pub fn range_secondary(degrees: f64) -> f64 {
    range_360(degrees + 90.0) - 90.0
}

/// Reduce an hour value into `[0, 24)`.
pub fn range_hours(hours: f64) -> f64 {
    let reduced = hours.rem_euclid(24.0);
    if reduced >= 24.0 { 0.0 } else { reduced }
}

/// Signed shortest rotation from `from` to `to`, in `[-180, 180)`.
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    range_180(to - from)
}

/// Unsigned angular distance between two azimuths, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    shortest_delta(a, b).abs()
}
