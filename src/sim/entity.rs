//! Circular bodies and their kinds
//!
//! An [`Entity`] is either standalone (owned by the caller) or a member of
//! exactly one [`World`](super::World), which then owns it by value.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::collision;
use super::ship::{Ship, Thruster};
use super::vector::Vector;
use crate::consts::*;
use crate::error::{Result, SimError};
use crate::{heading, sphere_volume};

/// Identifier of a world member, assigned by its world and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldId(u32);

static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(1);

impl WorldId {
    pub(crate) fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Bullet,
    Asteroid,
    Planetoid,
    /// Zero-radius marker; never a world member
    CollisionPoint,
}

impl EntityKind {
    pub fn is_minor_planet(self) -> bool {
        matches!(self, EntityKind::Asteroid | EntityKind::Planetoid)
    }

    /// Mass per unit volume
    pub fn density(self) -> f64 {
        match self {
            EntityKind::Ship => SHIP_DENSITY,
            EntityKind::Bullet => BULLET_DENSITY,
            EntityKind::Asteroid => ASTEROID_DENSITY,
            EntityKind::Planetoid => PLANETOID_DENSITY,
            EntityKind::CollisionPoint => 0.0,
        }
    }

    /// Whether `radius` is legal for this kind
    pub fn accepts_radius(self, radius: f64) -> bool {
        if !radius.is_finite() {
            return false;
        }
        match self {
            EntityKind::Ship => radius >= SHIP_MIN_RADIUS,
            EntityKind::Bullet => radius >= BULLET_MIN_RADIUS,
            EntityKind::Asteroid | EntityKind::Planetoid => radius >= MINOR_PLANET_MIN_RADIUS,
            EntityKind::CollisionPoint => radius == 0.0,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Ship => "ship",
            EntityKind::Bullet => "bullet",
            EntityKind::Asteroid => "asteroid",
            EntityKind::Planetoid => "planetoid",
            EntityKind::CollisionPoint => "collision point",
        })
    }
}

/// Kind-specific state
#[derive(Debug, Clone)]
pub enum Body {
    Ship(Ship),
    Bullet(Bullet),
    Asteroid,
    Planetoid,
    CollisionPoint,
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Ship(_) => EntityKind::Ship,
            Body::Bullet(_) => EntityKind::Bullet,
            Body::Asteroid => EntityKind::Asteroid,
            Body::Planetoid => EntityKind::Planetoid,
            Body::CollisionPoint => EntityKind::CollisionPoint,
        }
    }
}

/// Rescale `velocity` to the speed limit if it exceeds it.
///
/// Non-finite components become zero.
pub fn clamp_speed(velocity: Vector) -> Vector {
    let velocity = Vector::new(
        if velocity.x().is_finite() { velocity.x() } else { 0.0 },
        if velocity.y().is_finite() { velocity.y() } else { 0.0 },
    );
    let speed = velocity.length();
    if speed > SPEED_LIMIT {
        velocity * (SPEED_LIMIT / speed)
    } else {
        velocity
    }
}

/// A rigid circular body
#[derive(Debug)]
pub struct Entity {
    position: Vector,
    velocity: Vector,
    radius: f64,
    body: Body,
    world: Option<WorldId>,
    terminated: bool,
}

/// A copy is always standalone; membership belongs to the original only.
impl Clone for Entity {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            body: self.body.clone(),
            world: None,
            terminated: self.terminated,
        }
    }
}

impl Entity {
    fn build(position: Vector, velocity: Vector, radius: f64, body: Body) -> Result<Self> {
        if !position.is_finite() {
            return Err(SimError::NonFinite { what: "position" });
        }
        let kind = body.kind();
        if !kind.accepts_radius(radius) {
            return Err(SimError::InvalidRadius { kind, radius });
        }
        Ok(Self {
            position,
            velocity: clamp_speed(velocity),
            radius,
            body,
            world: None,
            terminated: false,
        })
    }

    pub fn ship(
        position: Vector,
        velocity: Vector,
        radius: f64,
        orientation: f64,
        thruster: Thruster,
    ) -> Result<Self> {
        let ship = Ship::new(orientation, thruster)?;
        Self::build(position, velocity, radius, Body::Ship(ship))
    }

    pub fn bullet(
        position: Vector,
        velocity: Vector,
        radius: f64,
        max_bounces: u32,
    ) -> Result<Self> {
        Self::build(position, velocity, radius, Body::Bullet(Bullet::new(max_bounces)))
    }

    pub fn asteroid(position: Vector, velocity: Vector, radius: f64) -> Result<Self> {
        Self::build(position, velocity, radius, Body::Asteroid)
    }

    pub fn planetoid(position: Vector, velocity: Vector, radius: f64) -> Result<Self> {
        Self::build(position, velocity, radius, Body::Planetoid)
    }

    /// Stationary zero-radius marker at `position`
    pub fn collision_point(position: Vector) -> Result<Self> {
        Self::build(position, Vector::ZERO, 0.0, Body::CollisionPoint)
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// World this entity belongs to
    pub fn world(&self) -> Option<WorldId> {
        self.world
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.body {
            Body::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.body {
            Body::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_bullet(&self) -> Option<&Bullet> {
        match &self.body {
            Body::Bullet(bullet) => Some(bullet),
            _ => None,
        }
    }

    pub(crate) fn as_bullet_mut(&mut self) -> Option<&mut Bullet> {
        match &mut self.body {
            Body::Bullet(bullet) => Some(bullet),
            _ => None,
        }
    }

    pub fn density(&self) -> f64 {
        self.kind().density()
    }

    /// Mass of the body itself, without cargo
    pub fn hull_mass(&self) -> f64 {
        self.density() * sphere_volume(self.radius)
    }

    /// Total mass; a ship includes its carried bullets
    pub fn mass(&self) -> f64 {
        match &self.body {
            Body::Ship(ship) => self.hull_mass() + ship.cargo_mass(),
            _ => self.hull_mass(),
        }
    }

    /// Thrust acceleration magnitude, zero unless this is a thrusting ship
    pub fn acceleration(&self) -> f64 {
        match &self.body {
            Body::Ship(ship) if ship.is_thrusting() => ship.thruster().force() / self.mass(),
            _ => 0.0,
        }
    }

    /// Set velocity, clamped to the speed limit
    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = clamp_speed(velocity);
        self.sync_cargo();
    }

    /// Free flight for `dt` time units
    pub fn move_by(&mut self, dt: f64) -> Result<()> {
        if !(dt >= 0.0) {
            return Err(SimError::InvalidDuration { dt });
        }
        self.advance(dt);
        Ok(())
    }

    /// Free flight without argument checks
    pub(crate) fn advance(&mut self, dt: f64) {
        self.position = self.position + self.velocity * dt;
        self.sync_cargo();
    }

    /// Thruster burn over `dt`
    pub(crate) fn apply_thrust(&mut self, dt: f64) {
        let acceleration = self.acceleration();
        if acceleration == 0.0 {
            return;
        }
        if let Some(ship) = self.as_ship() {
            let dv = heading(ship.orientation()) * (acceleration * dt);
            self.set_velocity(self.velocity + dv);
        }
    }

    pub(crate) fn place(&mut self, position: Vector) {
        self.position = position;
        self.sync_cargo();
    }

    fn sync_cargo(&mut self) {
        let (position, velocity) = (self.position, self.velocity);
        if let Body::Ship(ship) = &mut self.body {
            for bullet in ship.cargo_mut() {
                bullet.position = position;
                bullet.velocity = velocity;
            }
        }
    }

    /// Signed gap between the two surfaces; negative when they overlap
    pub fn distance_between(&self, other: &Entity) -> f64 {
        if std::ptr::eq(self, other) {
            return 0.0;
        }
        self.position.distance(other.position) - (self.radius + other.radius)
    }

    /// Whether the surfaces interpenetrate beyond the tolerance band
    pub fn overlaps(&self, other: &Entity) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.distance_between(other) <= -OVERLAP_TOLERANCE * (self.radius + other.radius)
    }

    /// See [`collision::time_to_collision`]
    pub fn time_to_collision(&self, other: &Entity) -> Result<f64> {
        collision::time_to_collision(self, other)
    }

    /// See [`collision::collision_position`]
    pub fn collision_position(&self, other: &Entity) -> Result<Option<Vector>> {
        collision::collision_position(self, other)
    }

    /// Whether the disk keeps at least 99% of its radius inside a
    /// `width` x `height` rectangle on every edge
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        let margin = BOUNDARY_MARGIN * self.radius;
        let (x, y) = (self.position.x(), self.position.y());
        x - margin >= 0.0 && x + margin <= width && y - margin >= 0.0 && y + margin <= height
    }

    /// Destroy a standalone entity. A ship's cargo goes with it.
    ///
    /// World members are terminated through
    /// [`World::terminate_entity`](super::World::terminate_entity).
    pub fn terminate(&mut self) -> Result<()> {
        if self.world.is_some() {
            return Err(SimError::AlreadyInWorld);
        }
        self.mark_terminated();
        Ok(())
    }

    pub(crate) fn mark_terminated(&mut self) {
        self.world = None;
        self.terminated = true;
        if let Body::Ship(ship) = &mut self.body {
            for bullet in ship.cargo_mut().iter_mut() {
                bullet.terminated = true;
            }
            ship.cargo_mut().clear();
        }
    }

    pub(crate) fn join(&mut self, world: WorldId) {
        self.world = Some(world);
    }

    pub(crate) fn leave(&mut self) {
        self.world = None;
    }

    /// Put a standalone bullet into this ship's cargo
    pub fn load_bullet(&mut self, bullet: Entity) -> Result<()> {
        self.check_loadable(&bullet)?;
        self.stow(bullet);
        Ok(())
    }

    /// Load several bullets; none are loaded if any is rejected
    pub fn load_bullets(&mut self, bullets: Vec<Entity>) -> Result<()> {
        for bullet in &bullets {
            self.check_loadable(bullet)?;
        }
        for bullet in bullets {
            self.stow(bullet);
        }
        Ok(())
    }

    /// Take a bullet out of the cargo
    pub fn unload_bullet(&mut self) -> Option<Entity> {
        self.as_ship_mut()?.cargo_mut().pop()
    }

    fn check_loadable(&self, bullet: &Entity) -> Result<()> {
        if self.kind() != EntityKind::Ship {
            return Err(SimError::WrongKind {
                expected: EntityKind::Ship,
                found: self.kind(),
            });
        }
        if bullet.kind() != EntityKind::Bullet {
            return Err(SimError::WrongKind {
                expected: EntityKind::Bullet,
                found: bullet.kind(),
            });
        }
        if self.terminated || bullet.terminated {
            return Err(SimError::Terminated);
        }
        if bullet.world.is_some() {
            return Err(SimError::AlreadyInWorld);
        }
        if bullet.radius >= self.radius {
            return Err(SimError::BulletTooLarge {
                bullet: bullet.radius,
                ship: self.radius,
            });
        }
        Ok(())
    }

    fn stow(&mut self, mut bullet: Entity) {
        bullet.position = self.position;
        bullet.velocity = self.velocity;
        if let Some(state) = bullet.as_bullet_mut() {
            state.set_source(None);
            state.reset_bounces();
        }
        if let Some(ship) = self.as_ship_mut() {
            ship.cargo_mut().push(bullet);
        }
    }
}
