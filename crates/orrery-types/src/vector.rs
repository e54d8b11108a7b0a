//! The paired-angle [`Vector`] value type.
//!
//! A [`Vector`] is an ordered pair of angles whose meaning depends on the
//! frame it is used in: (azimuth, altitude), (right ascension, declination),
//! or (primary axis, secondary axis) in mount-native degrees. It is a plain
//! immutable value; arithmetic is componentwise.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// An ordered pair of real-valued angles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// First component (azimuth, right ascension, or primary axis).
    pub primary: f64,
    /// Second component (altitude, declination, or secondary axis).
    pub secondary: f64,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a vector from its two components.
    pub const fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }

    /// Multiply both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.primary * factor, self.secondary * factor)
    }

    /// Whether both components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.primary.abs() < f64::MIN_POSITIVE && self.secondary.abs() < f64::MIN_POSITIVE
    }

    /// Whether both components are within `tolerance` of `other`.
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.primary - other.primary).abs() <= tolerance
            && (self.secondary - other.secondary).abs() <= tolerance
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.primary + rhs.primary, self.secondary + rhs.secondary)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.primary - rhs.primary, self.secondary - rhs.secondary)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.primary, -self.secondary)
    }
}

impl core::fmt::Display for Vector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.primary, self.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_componentwise() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(0.5, -4.0);
        assert!((a + b).approx_eq(Vector::new(1.5, -2.0), 1e-12));
        assert!((a - b).approx_eq(Vector::new(0.5, 6.0), 1e-12));
        assert!((a * 3.0).approx_eq(Vector::new(3.0, 6.0), 1e-12));
        assert!((-a).approx_eq(Vector::new(-1.0, -2.0), 1e-12));
    }

    #[test]
    fn zero_detection() {
        assert!(Vector::ZERO.is_zero());
        assert!(!Vector::new(0.0, 1e-6).is_zero());
    }

    #[test]
    fn add_assign_accumulates() {
        let mut total = Vector::ZERO;
        total += Vector::new(0.25, 0.5);
        total += Vector::new(0.25, 0.5);
        assert!(total.approx_eq(Vector::new(0.5, 1.0), 1e-12));
    }
}
