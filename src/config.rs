//! Simulation configuration
//!
//! Tunables that would otherwise be shared mutable defaults. A world takes its
//! configuration by value at construction; missing JSON keys fall back to the
//! constants in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::Thruster;

/// Per-world simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for teleport destinations and planetoid split directions
    pub seed: u64,

    // === Bullets ===
    /// Muzzle speed of fired bullets
    pub bullet_speed: f64,
    /// Boundary bounces a bullet survives
    pub bullet_max_bounces: u32,

    // === Ships ===
    /// Force of a newly built ship's thruster
    pub thruster_force: f64,

    // === Planetoids ===
    /// Destroyed planetoids at least this large split into asteroids
    pub planetoid_split_radius: f64,

    // === Event loop ===
    /// Events closer together than this are simultaneous
    pub event_epsilon: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            bullet_speed: BULLET_SPEED,
            bullet_max_bounces: BULLET_MAX_BOUNCES,

            thruster_force: THRUSTER_FORCE,

            planetoid_split_radius: PLANETOID_SPLIT_RADIUS,

            event_epsilon: EVENT_EPSILON,
        }
    }
}

impl SimConfig {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, rejecting malformed or out-of-range values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SimError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(config) => {
                log::info!("Loaded simulation config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default simulation config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Thruster for a newly built ship
    pub fn thruster(&self) -> Result<Thruster> {
        Thruster::new(self.thruster_force)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        if !(self.bullet_speed.is_finite() && self.bullet_speed >= 0.0) {
            return Err(SimError::InvalidConfig { field: "bullet_speed" });
        }
        if !(self.thruster_force.is_finite() && self.thruster_force >= 0.0) {
            return Err(SimError::InvalidConfig { field: "thruster_force" });
        }
        if !(self.planetoid_split_radius.is_finite() && self.planetoid_split_radius > 0.0) {
            return Err(SimError::InvalidConfig {
                field: "planetoid_split_radius",
            });
        }
        if !(self.event_epsilon.is_finite() && self.event_epsilon > 0.0) {
            return Err(SimError::InvalidConfig { field: "event_epsilon" });
        }
        Ok(())
    }
}
