//! Deterministic simulation module
//!
//! All physics lives here. Given the same world, config and seed, every run
//! produces the same result:
//! - Exact collision times, no fixed substeps
//! - Seeded RNG only (teleports, planetoid splits)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bullet;
pub mod collision;
pub mod entity;
pub mod event;
mod evolve;
pub mod resolution;
pub mod ship;
pub mod vector;
pub mod world;

pub use bullet::Bullet;
pub use collision::{
    BoundaryHit, Walls, boundary_collision_position, boundary_hit, collision_position, contact_time,
    reflect_velocity, time_to_boundary, time_to_collision,
};
pub use entity::{Body, Entity, EntityId, EntityKind, WorldId, clamp_speed};
pub use event::{Collision, CollisionEvent, CollisionListener, Contact};
pub use resolution::{BoundaryOutcome, PairAction, Side, bounce, pair_action};
pub use ship::{Ship, Thruster};
pub use vector::Vector;
pub use world::World;
