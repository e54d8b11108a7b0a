//! Conversions between mount axes, Alt/Az, and RA/Dec.
//!
//! Mount axes are the native frame of the simulated telescope. Their meaning
//! depends on the [`AlignmentMode`]:
//!
//! - `AltAz`: primary is azimuth `[0, 360)`, secondary is altitude.
//! - `Polar`: primary is hour angle `[-180, 180)`, secondary is declination.
//! - `GermanPolar`: primary is hour angle, or hour angle + 180 when pointing
//!   through the pole, clamped to `[-limit, 180 + limit]`; secondary is
//!   declination, mirrored to `180 - dec` when pointing through the pole.
//!
//! In the southern hemisphere the declination axis is mirrored so that the
//! secondary axis always increases towards the visible pole.
//!
//! Hour angles and axis positions are in degrees. Right ascension and
//! sidereal time are in hours.

use orrery_types::{AlignmentMode, PierSide, Vector};

use crate::angle::{range_180, range_360, range_hours, range_secondary, shortest_delta};

// ---------------------------------------------------------------------------
// Horizon <-> equatorial
// ---------------------------------------------------------------------------

/// Convert hour angle and declination (degrees) into azimuth and altitude.
///
/// Azimuth is measured from north through east and returned in `[0, 360)`.
pub fn hadec_to_altaz(hour_angle: f64, declination: f64, latitude: f64) -> Vector {
    let (h, d, phi) = (
        hour_angle.to_radians(),
        declination.to_radians(),
        latitude.to_radians(),
    );
    let sin_alt = (d.sin() * phi.sin() + d.cos() * phi.cos() * h.cos()).clamp(-1.0, 1.0);
    let y = -d.cos() * h.sin();
    let x = d.sin() * phi.cos() - d.cos() * phi.sin() * h.cos();
    Vector::new(range_360(y.atan2(x).to_degrees()), sin_alt.asin().to_degrees())
}

/// Convert azimuth and altitude (degrees) into hour angle and declination.
///
/// The hour angle is returned in `[-180, 180)`.
pub fn altaz_to_hadec(azimuth: f64, altitude: f64, latitude: f64) -> Vector {
    let (a, e, phi) = (
        azimuth.to_radians(),
        altitude.to_radians(),
        latitude.to_radians(),
    );
    let sin_dec = (e.sin() * phi.sin() + e.cos() * phi.cos() * a.cos()).clamp(-1.0, 1.0);
    let y = -e.cos() * a.sin();
    let x = e.sin() * phi.cos() - e.cos() * phi.sin() * a.cos();
    Vector::new(range_180(y.atan2(x).to_degrees()), sin_dec.asin().to_degrees())
}

// ---------------------------------------------------------------------------
// FrameContext
// ---------------------------------------------------------------------------

/// Everything needed to convert between mount axes and sky coordinates at
/// one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Mechanical configuration of the mount.
    pub alignment: AlignmentMode,
    /// Site latitude in degrees, north positive.
    pub latitude: f64,
    /// Local sidereal time in hours.
    pub sidereal_hours: f64,
    /// How far past the meridian a German mount may track, in degrees.
    pub hour_angle_limit: f64,
}

impl FrameContext {
    /// `+1` in the northern hemisphere, `-1` in the southern.
    pub fn hemisphere(&self) -> f64 {
        if self.latitude >= 0.0 { 1.0 } else { -1.0 }
    }

    /// Whether the axes are in the through-the-pole pointing state.
    fn through_pole(axes: Vector) -> bool {
        !(-90.0..=90.0).contains(&axes.secondary)
    }

    /// Mount axes for an hour angle and declination (degrees).
    ///
    /// German mounts choose the pointing state from the natural hour angle:
    /// objects west of the meridian are reached from the east side of the pier.
    pub fn axes_from_hadec(&self, hadec: Vector) -> Vector {
        let h = range_180(hadec.primary);
        let pole_dec = self.hemisphere() * hadec.secondary;
        match self.alignment {
            AlignmentMode::AltAz => {
                let altaz = hadec_to_altaz(h, hadec.secondary, self.latitude);
                self.axes_from_altaz(altaz)
            }
            AlignmentMode::Polar => Vector::new(h, pole_dec),
            AlignmentMode::GermanPolar => {
                if h >= 0.0 {
                    Vector::new(h, pole_dec)
                } else {
                    Vector::new(h + 180.0, 180.0 - pole_dec)
                }
            }
        }
    }

    /// Hour angle and declination (degrees) the axes point at.
    pub fn hadec_from_axes(&self, axes: Vector) -> Vector {
        match self.alignment {
            AlignmentMode::AltAz => {
                let altaz = self.altaz_from_axes(axes);
                altaz_to_hadec(altaz.primary, altaz.secondary, self.latitude)
            }
            AlignmentMode::Polar | AlignmentMode::GermanPolar => {
                let (h, pole_dec) = if Self::through_pole(axes) {
                    (axes.primary - 180.0, 180.0 - range_secondary(axes.secondary))
                } else {
                    (axes.primary, axes.secondary)
                };
                Vector::new(range_180(h), self.hemisphere() * pole_dec)
            }
        }
    }

    /// Mount axes for an azimuth and altitude.
    pub fn axes_from_altaz(&self, altaz: Vector) -> Vector {
        match self.alignment {
            AlignmentMode::AltAz => Vector::new(range_360(altaz.primary), altaz.secondary),
            AlignmentMode::Polar | AlignmentMode::GermanPolar => {
                let hadec = altaz_to_hadec(altaz.primary, altaz.secondary, self.latitude);
                self.axes_from_hadec(hadec)
            }
        }
    }

    /// Azimuth and altitude the axes point at.
    pub fn altaz_from_axes(&self, axes: Vector) -> Vector {
        match self.alignment {
            AlignmentMode::AltAz => {
                if Self::through_pole(axes) {
                    Vector::new(
                        range_360(axes.primary + 180.0),
                        180.0 - range_secondary(axes.secondary),
                    )
                } else {
                    Vector::new(range_360(axes.primary), axes.secondary)
                }
            }
            AlignmentMode::Polar | AlignmentMode::GermanPolar => {
                let hadec = self.hadec_from_axes(axes);
                hadec_to_altaz(hadec.primary, hadec.secondary, self.latitude)
            }
        }
    }

    /// Mount axes for a right ascension (hours) and declination (degrees).
    pub fn axes_from_radec(&self, radec: Vector) -> Vector {
        let hour_angle = range_180((self.sidereal_hours - radec.primary) * 15.0);
        self.axes_from_hadec(Vector::new(hour_angle, radec.secondary))
    }

    /// Right ascension (hours) and declination (degrees) the axes point at.
    pub fn radec_from_axes(&self, axes: Vector) -> Vector {
        let hadec = self.hadec_from_axes(axes);
        Vector::new(
            range_hours(self.sidereal_hours - hadec.primary / 15.0),
            hadec.secondary,
        )
    }

    /// Pointing state of the mount. Alt-az mounts report `Unknown`.
    pub fn side_of_pier(&self, axes: Vector) -> PierSide {
        match self.alignment {
            AlignmentMode::AltAz => PierSide::Unknown,
            AlignmentMode::Polar | AlignmentMode::GermanPolar => {
                if Self::through_pole(axes) {
                    PierSide::West
                } else {
                    PierSide::East
                }
            }
        }
    }

    /// Whether the primary axis is inside the German mount's travel.
    pub fn within_limits(&self, axes: Vector) -> bool {
        match self.alignment {
            AlignmentMode::GermanPolar => {
                (-self.hour_angle_limit..=180.0 + self.hour_angle_limit).contains(&axes.primary)
            }
            AlignmentMode::AltAz | AlignmentMode::Polar => true,
        }
    }

    /// The same sky position reached from the other side of the pier, if
    /// the primary axis can travel there.
    ///
    /// Only German mounts have a reachable alternate pointing state.
    pub fn alternate_axes(&self, axes: Vector) -> Option<Vector> {
        if self.alignment != AlignmentMode::GermanPolar {
            return None;
        }
        let secondary = range_secondary(180.0 - axes.secondary);
        [axes.primary + 180.0, axes.primary - 180.0]
            .into_iter()
            .map(|primary| Vector::new(primary, secondary))
            .find(|candidate| self.within_limits(*candidate))
    }

    /// Apply the axis range rules: the secondary wraps into `[-90, 270)`,
    /// the primary wraps (alt-az, polar) or clamps (German polar).
    pub fn normalize(&self, axes: Vector) -> Vector {
        let primary = match self.alignment {
            AlignmentMode::AltAz => range_360(axes.primary),
            AlignmentMode::Polar => range_180(axes.primary),
            AlignmentMode::GermanPolar => axes
                .primary
                .clamp(-self.hour_angle_limit, 180.0 + self.hour_angle_limit),
        };
        Vector::new(primary, range_secondary(axes.secondary))
    }

    /// Axis displacement that moves the pointing by `delta` in hour angle
    /// and declination (degrees).
    ///
    /// Equatorial mounts map this linearly; alt-az mounts go through the
    /// horizon conversion and return the shortest azimuth change.
    pub fn equatorial_delta(&self, axes: Vector, delta: Vector) -> Vector {
        match self.alignment {
            AlignmentMode::AltAz => {
                let hadec = self.hadec_from_axes(axes);
                let before = self.altaz_from_axes(axes);
                let after = hadec_to_altaz(
                    hadec.primary + delta.primary,
                    (hadec.secondary + delta.secondary).clamp(-90.0, 90.0),
                    self.latitude,
                );
                Vector::new(
                    shortest_delta(before.primary, after.primary),
                    after.secondary - before.secondary,
                )
            }
            AlignmentMode::Polar | AlignmentMode::GermanPolar => {
                let pier = if Self::through_pole(axes) { -1.0 } else { 1.0 };
                Vector::new(delta.primary, self.hemisphere() * pier * delta.secondary)
            }
        }
    }
}
