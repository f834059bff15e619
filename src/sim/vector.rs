//! Immutable 2-D vector value type

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A 2-D vector of `f64` components.
///
/// Compared and hashed on its components. Vectors with NaN components are
/// never produced by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Vector(DVec2);

impl Vector {
    pub const ZERO: Self = Self(DVec2::ZERO);

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.0.dot(other.0)
    }

    /// Magnitude
    #[inline]
    pub fn length(self) -> f64 {
        self.0.length()
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.0.length_squared()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit vector in the same direction, or `None` for the zero vector
    #[inline]
    pub fn normalize(self) -> Option<Self> {
        self.0.try_normalize().map(Self)
    }

    /// Both components finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total order for deterministic tie-breaking: magnitude, then x, then y.
    ///
    /// Not a geometric ordering.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.length()
            .total_cmp(&other.length())
            .then_with(|| self.x().total_cmp(&other.x()))
            .then_with(|| self.y().total_cmp(&other.y()))
    }
}

impl Eq for Vector {}

impl Hash for Vector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // +0.0 folds -0.0 into 0.0 so equal vectors hash alike
        (self.0.x + 0.0).to_bits().hash(state);
        (self.0.y + 0.0).to_bits().hash(state);
    }
}

impl From<DVec2> for Vector {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Vector> for (f64, f64) {
    fn from(v: Vector) -> Self {
        (v.x(), v.y())
    }
}

impl Add for Vector {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Vector {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_arithmetic() {
        let a = Vector::new(3.0, 4.0);
        let b = Vector::new(1.0, -2.0);
        assert_eq!(a + b, Vector::new(4.0, 2.0));
        assert_eq!(a - b, Vector::new(2.0, 6.0));
        assert_eq!(a * 2.0, Vector::new(6.0, 8.0));
        assert_eq!(-a, Vector::new(-3.0, -4.0));
        assert_eq!(a.dot(b), -5.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.distance(Vector::ZERO), 5.0);
    }

    #[test]
    fn test_normalize_zero_is_none() {
        assert!(Vector::ZERO.normalize().is_none());
        let unit = Vector::new(0.0, 7.0).normalize().unwrap();
        assert_eq!(unit, Vector::new(0.0, 1.0));
    }

    #[test]
    fn test_total_cmp_magnitude_then_components() {
        let short = Vector::new(1.0, 0.0);
        let long = Vector::new(0.0, 2.0);
        assert_eq!(short.total_cmp(&long), Ordering::Less);

        // Same magnitude: x decides
        let left = Vector::new(-100.0, 0.0);
        let right = Vector::new(100.0, 0.0);
        assert_eq!(left.total_cmp(&right), Ordering::Less);

        // Same magnitude and x: y decides
        let down = Vector::new(0.0, -1.0);
        let up = Vector::new(0.0, 1.0);
        assert_eq!(up.total_cmp(&down), Ordering::Greater);
        assert_eq!(up.total_cmp(&up), Ordering::Equal);
    }

    #[test]
    fn test_hash_matches_equality() {
        let mut set = HashSet::new();
        set.insert(Vector::new(0.0, 1.0));
        assert!(set.contains(&Vector::new(-0.0, 1.0)));
        assert!(!set.contains(&Vector::new(1.0, 0.0)));
    }

    #[test]
    fn test_serde_as_pair() {
        let json = serde_json::to_string(&Vector::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Vector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Vector::new(1.5, -2.0));
    }
}
