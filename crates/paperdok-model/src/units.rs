//! Canonical length unit
//!
//! Every physical quantity in the layout table is stored in twips
//! (1/1440 inch). Renderers convert to their own native unit at the
//! point of emission and never store converted values.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Twips per inch
pub const TWIPS_PER_INCH: i64 = 1440;

/// Twips per typographic point
pub const TWIPS_PER_POINT: i64 = 20;

/// A length in twips (1/1440 inch)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Twips(pub i64);

impl Twips {
    /// Zero length
    pub const ZERO: Twips = Twips(0);

    /// Create from whole points
    pub const fn from_points(points: i64) -> Self {
        Twips(points * TWIPS_PER_POINT)
    }

    /// Create from fractional inches, rounding to the nearest twip
    pub fn from_inches(inches: f64) -> Self {
        Twips((inches * TWIPS_PER_INCH as f64).round() as i64)
    }

    /// Create from fractional points, rounding to the nearest twip
    pub fn from_points_f64(points: f64) -> Self {
        Twips((points * TWIPS_PER_POINT as f64).round() as i64)
    }

    /// Raw twip value
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Value in points
    pub fn as_points(self) -> f64 {
        self.0 as f64 / TWIPS_PER_POINT as f64
    }

    /// Value in inches
    pub fn as_inches(self) -> f64 {
        self.0 as f64 / TWIPS_PER_INCH as f64
    }

    /// Multiply by a rational factor, rounding to the nearest twip
    pub fn scale(self, numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            return Twips::ZERO;
        }
        let scaled = (self.0 as i128 * numerator as i128) as f64 / denominator as f64;
        Twips(scaled.round() as i64)
    }

    /// The smaller of two lengths
    pub fn min(self, other: Twips) -> Twips {
        Twips(self.0.min(other.0))
    }
}

impl Add for Twips {
    type Output = Twips;

    fn add(self, rhs: Twips) -> Twips {
        Twips(self.0 + rhs.0)
    }
}

impl Sub for Twips {
    type Output = Twips;

    fn sub(self, rhs: Twips) -> Twips {
        Twips(self.0 - rhs.0)
    }
}

impl Neg for Twips {
    type Output = Twips;

    fn neg(self) -> Twips {
        Twips(-self.0)
    }
}

impl fmt::Display for Twips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}tw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion() {
        assert_eq!(Twips::from_points(10), Twips(200));
        assert_eq!(Twips(180).as_points(), 9.0);
        assert_eq!(Twips::from_points_f64(-0.1), Twips(-2));
    }

    #[test]
    fn test_inch_conversion() {
        assert_eq!(Twips::from_inches(0.75), Twips(1080));
        assert_eq!(Twips(1080).as_inches(), 0.75);
        assert_eq!(Twips::from_inches(3.375), Twips(4860));
    }

    #[test]
    fn test_scale_rounds() {
        assert_eq!(Twips(4860).scale(9, 10), Twips(4374));
        assert_eq!(Twips(100).scale(1, 3), Twips(33));
        assert_eq!(Twips(100).scale(1, 0), Twips::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Twips(1080) + Twips(360), Twips(1440));
        assert_eq!(Twips(1080) - Twips(360), Twips(720));
        assert_eq!(-Twips(2), Twips(-2));
        assert_eq!(Twips(5).min(Twips(3)), Twips(3));
    }
}
