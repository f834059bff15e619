//! Ship body: orientation, thruster and bullet cargo

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::consts::THRUSTER_FORCE;
use crate::error::{Result, SimError};
use crate::normalize_angle;

/// A ship's engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thruster {
    force: f64,
    active: bool,
}

impl Default for Thruster {
    fn default() -> Self {
        Self {
            force: THRUSTER_FORCE,
            active: false,
        }
    }
}

impl Thruster {
    /// An idle thruster with the given force
    pub fn new(force: f64) -> Result<Self> {
        if !(force.is_finite() && force >= 0.0) {
            return Err(SimError::NonFinite {
                what: "thruster force",
            });
        }
        Ok(Self {
            force,
            active: false,
        })
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Ship-specific state.
///
/// Carried bullets live in the cargo, not in any world; they share the
/// ship's center and velocity until fired.
#[derive(Debug, Clone)]
pub struct Ship {
    /// Heading in radians, [0, 2π)
    orientation: f64,
    thruster: Thruster,
    cargo: Vec<Entity>,
}

impl Ship {
    pub(crate) fn new(orientation: f64, thruster: Thruster) -> Result<Self> {
        if !orientation.is_finite() {
            return Err(SimError::NonFinite {
                what: "orientation",
            });
        }
        Ok(Self {
            orientation: normalize_angle(orientation),
            thruster,
            cargo: Vec::new(),
        })
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Rotate by `angle` radians (counter-clockwise)
    pub fn turn(&mut self, angle: f64) -> Result<()> {
        if !angle.is_finite() {
            return Err(SimError::NonFinite { what: "angle" });
        }
        self.orientation = normalize_angle(self.orientation + angle);
        Ok(())
    }

    pub fn thruster(&self) -> Thruster {
        self.thruster
    }

    pub fn is_thrusting(&self) -> bool {
        self.thruster.active
    }

    pub fn thrust_on(&mut self) {
        self.thruster.active = true;
    }

    pub fn thrust_off(&mut self) {
        self.thruster.active = false;
    }

    /// Replace the thruster force, keeping its on/off state
    pub fn set_thruster_force(&mut self, force: f64) -> Result<()> {
        let active = self.thruster.active;
        self.thruster = Thruster::new(force)?;
        self.thruster.active = active;
        Ok(())
    }

    /// Carried bullets
    pub fn cargo(&self) -> &[Entity] {
        &self.cargo
    }

    pub fn bullet_count(&self) -> usize {
        self.cargo.len()
    }

    /// Combined mass of the carried bullets
    pub fn cargo_mass(&self) -> f64 {
        self.cargo.iter().map(Entity::mass).sum()
    }

    pub(crate) fn cargo_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.cargo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_turn_wraps_orientation() {
        let mut ship = Ship::new(0.0, Thruster::default()).unwrap();
        ship.turn(-PI / 2.0).unwrap();
        assert!((ship.orientation() - 1.5 * PI).abs() < 1e-12);
        ship.turn(TAU).unwrap();
        assert!((ship.orientation() - 1.5 * PI).abs() < 1e-9);
        assert!(ship.turn(f64::NAN).is_err());
    }

    #[test]
    fn test_thruster_toggle_and_force() {
        let mut ship = Ship::new(0.0, Thruster::new(5.0).unwrap()).unwrap();
        assert!(!ship.is_thrusting());
        ship.thrust_on();
        ship.set_thruster_force(9.0).unwrap();
        assert!(ship.is_thrusting());
        assert_eq!(ship.thruster().force(), 9.0);
        ship.thrust_off();
        assert!(!ship.is_thrusting());
        assert!(ship.set_thruster_force(-1.0).is_err());
    }

    #[test]
    fn test_rejects_non_finite_orientation() {
        assert!(Ship::new(f64::INFINITY, Thruster::default()).is_err());
    }
}
