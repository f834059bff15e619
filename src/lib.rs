//! Asteroids Sim - continuous-time collision engine for a 2-D asteroid field
//!
//! Core modules:
//! - `sim`: Entities, worlds, collision prediction and the event-driven advance
//! - `config`: Data-driven simulation tuning
//! - `error`: Error taxonomy shared by every operation

pub mod config;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use error::{AddEntityError, ErrorKind, SimError};

use std::f64::consts::TAU;

use sim::Vector;

/// Engine constants
pub mod consts {
    /// Universal speed limit (km/s)
    pub const SPEED_LIMIT: f64 = 300_000.0;

    /// Largest allowed world dimension
    pub const MAX_WORLD_DIMENSION: f64 = f64::MAX;

    /// Two disks overlap once they interpenetrate by more than this fraction of
    /// their summed radii
    pub const OVERLAP_TOLERANCE: f64 = 0.01;
    /// Fraction of its radius a member's disk must keep inside the world on
    /// every edge
    pub const BOUNDARY_MARGIN: f64 = 0.99;

    /// Ship defaults
    pub const SHIP_MIN_RADIUS: f64 = 10.0;
    pub const SHIP_DENSITY: f64 = 1.42e20;
    /// Thruster force (kg·km/s²)
    pub const THRUSTER_FORCE: f64 = 1.1e21;

    /// Bullet defaults
    pub const BULLET_MIN_RADIUS: f64 = 1.0;
    pub const BULLET_DENSITY: f64 = 7.8e12;
    pub const BULLET_SPEED: f64 = 250.0;
    /// Boundary bounces a bullet survives; the next one destroys it
    pub const BULLET_MAX_BOUNCES: u32 = 2;

    /// Minor planet defaults
    pub const MINOR_PLANET_MIN_RADIUS: f64 = 5.0;
    pub const ASTEROID_DENSITY: f64 = 2.65e12;
    pub const PLANETOID_DENSITY: f64 = 0.917e12;
    /// Planetoids at least this large split into two asteroids when destroyed
    pub const PLANETOID_SPLIT_RADIUS: f64 = 30.0;
    /// Speed multiplier for the asteroids a planetoid splits into
    pub const PLANETOID_SPLIT_SPEEDUP: f64 = 1.5;

    /// Events closer together than this are simultaneous
    pub const EVENT_EPSILON: f64 = 1e-9;
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Unit vector pointing along `theta`
#[inline]
pub fn heading(theta: f64) -> Vector {
    Vector::new(theta.cos(), theta.sin())
}

/// Volume of a sphere with the given radius
#[inline]
pub fn sphere_volume(radius: f64) -> f64 {
    4.0 / 3.0 * std::f64::consts::PI * radius.powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_wraps_into_range() {
        let wrapped = normalize_angle(-std::f64::consts::FRAC_PI_2);
        assert!((wrapped - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!((normalize_angle(3.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!(normalize_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_heading_is_unit() {
        let h = heading(0.3);
        assert!((h.length() - 1.0).abs() < 1e-12);
    }
}
