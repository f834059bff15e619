//! Bounded rectangular world and its members
//!
//! The world owns its members by value, keyed by an id it assigns. An entity
//! is therefore in at most one world, and ids iterate in a stable order.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision;
use super::entity::{Entity, EntityId, EntityKind, WorldId};
use super::event::Contact;
use super::ship::Ship;
use super::vector::Vector;
use crate::config::SimConfig;
use crate::consts::MAX_WORLD_DIMENSION;
use crate::error::{AddEntityError, Result, SimError};
use crate::heading;

/// A rectangle `[0, width] x [0, height]` holding entities
#[derive(Debug)]
pub struct World {
    id: WorldId,
    width: f64,
    height: f64,
    /// Members, sorted by id for deterministic iteration
    entities: BTreeMap<EntityId, Entity>,
    /// Next member id
    next_id: u32,
    terminated: bool,
    pub(super) config: SimConfig,
    /// Teleport destinations and split directions
    pub(super) rng: Pcg32,
}

impl World {
    /// Empty world with default settings
    pub fn new(width: f64, height: f64) -> Result<Self> {
        Self::with_config(width, height, SimConfig::default())
    }

    /// Empty world with explicit settings
    pub fn with_config(width: f64, height: f64, config: SimConfig) -> Result<Self> {
        let in_range = |d: f64| d.is_finite() && (0.0..=MAX_WORLD_DIMENSION).contains(&d);
        if !in_range(width) || !in_range(height) {
            return Err(SimError::InvalidDimension { width, height });
        }
        config.validate()?;
        let rng = Pcg32::seed_from_u64(config.seed);
        Ok(Self {
            id: WorldId::next(),
            width,
            height,
            entities: BTreeMap::new(),
            next_id: 1,
            terminated: false,
            config,
            rng,
        })
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Shut the world down, releasing every member as a standalone entity
    pub fn terminate(&mut self) -> Vec<Entity> {
        self.terminated = true;
        let released: Vec<Entity> = std::mem::take(&mut self.entities)
            .into_values()
            .map(|mut entity| {
                entity.leave();
                entity
            })
            .collect();
        log::info!("World {:?} terminated, released {} entities", self.id, released.len());
        released
    }

    pub(super) fn ensure_alive(&self) -> Result<()> {
        if self.terminated {
            Err(SimError::WorldTerminated)
        } else {
            Ok(())
        }
    }

    /// Allocate a new member id
    pub(super) fn next_entity_id(&mut self) -> Result<EntityId> {
        let id = EntityId::from_raw(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(SimError::IdsExhausted)?;
        Ok(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn has_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Members in id order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Members of one kind, in id order
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities().filter(move |(_, entity)| entity.kind() == kind)
    }

    pub(super) fn member(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(SimError::NotInWorld(id))
    }

    pub(super) fn member_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(&id).ok_or(SimError::NotInWorld(id))
    }

    /// Bounds and overlap checks against every member except `entity` itself
    pub(super) fn check_spot(&self, entity: &Entity) -> Result<()> {
        if !entity.fits_within(self.width, self.height) {
            return Err(SimError::OutOfBounds);
        }
        match self.entities.iter().find(|(_, other)| other.overlaps(entity)) {
            Some((other, _)) => Err(SimError::Overlap { other: *other }),
            None => Ok(()),
        }
    }

    /// Every reason `entity` could not join this world right now
    pub fn check_placement(&self, entity: &Entity) -> Result<()> {
        self.ensure_alive()?;
        if entity.kind() == EntityKind::CollisionPoint {
            return Err(SimError::NotPlaceable);
        }
        if entity.is_terminated() {
            return Err(SimError::Terminated);
        }
        if entity.world().is_some() {
            return Err(SimError::AlreadyInWorld);
        }
        self.check_spot(entity)
    }

    /// Add a standalone entity; a rejected entity is handed back in the error
    pub fn add_entity(&mut self, entity: Entity) -> std::result::Result<EntityId, AddEntityError> {
        let id = match self.check_placement(&entity).and_then(|()| self.next_entity_id()) {
            Ok(id) => id,
            Err(reason) => {
                return Err(AddEntityError {
                    entity: Box::new(entity),
                    reason,
                });
            }
        };
        self.admit(id, entity);
        log::debug!("Added {:?} to world {:?}", id, self.id);
        Ok(id)
    }

    /// Admit under a freshly allocated id, without checks
    pub(super) fn admit(&mut self, id: EntityId, mut entity: Entity) {
        entity.join(self.id);
        self.entities.insert(id, entity);
    }

    /// Put a previously removed member back under its old id
    pub(super) fn reinsert(&mut self, id: EntityId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    /// Take a member out for exclusive mutation; it keeps its membership mark
    pub(super) fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Remove a member, returning it as a standalone entity
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity> {
        let mut entity = self.entities.remove(&id).ok_or(SimError::NotInWorld(id))?;
        entity.leave();
        Ok(entity)
    }

    /// Destroy a member; the terminated remains are returned
    pub fn terminate_entity(&mut self, id: EntityId) -> Result<Entity> {
        let mut entity = self.entities.remove(&id).ok_or(SimError::NotInWorld(id))?;
        entity.mark_terminated();
        log::debug!("Terminated {} {:?}", entity.kind(), id);
        Ok(entity)
    }

    /// Ship controls (turn, thrust) of a member ship
    pub fn ship_mut(&mut self, id: EntityId) -> Result<&mut Ship> {
        let entity = self.member_mut(id)?;
        let found = entity.kind();
        entity.as_ship_mut().ok_or(SimError::WrongKind {
            expected: EntityKind::Ship,
            found,
        })
    }

    /// Load a standalone bullet into a member ship
    pub fn load_bullet(&mut self, ship: EntityId, bullet: Entity) -> Result<()> {
        self.ensure_alive()?;
        self.member_mut(ship)?.load_bullet(bullet)
    }

    /// Fire one carried bullet along the ship's heading.
    ///
    /// Returns the bullet's member id, or `None` if the ship carried nothing or
    /// the bullet was destroyed on leaving the barrel (out of bounds, or hit
    /// something straight away).
    pub fn fire_bullet(&mut self, ship_id: EntityId) -> Result<Option<EntityId>> {
        self.ensure_alive()?;
        let speed = self.config.bullet_speed;
        let ship = self.member(ship_id)?;
        let (orientation, loaded) = match ship.as_ship() {
            Some(state) => (state.orientation(), state.bullet_count() > 0),
            None => {
                return Err(SimError::WrongKind {
                    expected: EntityKind::Ship,
                    found: ship.kind(),
                });
            }
        };
        let (center, ship_radius) = (ship.position(), ship.radius());
        if !loaded {
            return Ok(None);
        }
        let bullet_id = self.next_entity_id()?;
        let Some(mut bullet) = self.member_mut(ship_id)?.unload_bullet() else {
            return Ok(None);
        };

        let direction = heading(orientation);
        bullet.place(center + direction * (ship_radius + bullet.radius()));
        bullet.set_velocity(direction * speed);
        if let Some(state) = bullet.as_bullet_mut() {
            state.set_source(Some(ship_id));
        }

        if !bullet.fits_within(self.width, self.height) {
            bullet.mark_terminated();
            log::debug!("Bullet from {:?} left the world on firing", ship_id);
            return Ok(None);
        }

        let struck = self
            .entities
            .iter()
            .find(|(_, other)| other.overlaps(&bullet))
            .map(|(id, _)| *id);
        self.admit(bullet_id, bullet);
        match struck {
            Some(target) => {
                log::debug!("Bullet from {:?} hit {:?} on firing", ship_id, target);
                self.resolve(Contact::pair(bullet_id, target));
                Ok(None)
            }
            None => Ok(Some(bullet_id)),
        }
    }

    /// Closest member of `kind` to member `from` (surface distance)
    pub fn nearest(&self, from: EntityId, kind: EntityKind) -> Option<EntityId> {
        let origin = self.entities.get(&from)?;
        self.entities_of(kind)
            .filter(|(id, _)| *id != from)
            .min_by(|(_, a), (_, b)| {
                origin
                    .distance_between(a)
                    .total_cmp(&origin.distance_between(b))
            })
            .map(|(id, _)| id)
    }

    /// Member whose disk contains `position`, lowest id first
    pub fn entity_at(&self, position: Vector) -> Option<EntityId> {
        self.entities()
            .find(|(_, entity)| entity.position().distance(position) <= entity.radius())
            .map(|(id, _)| id)
    }

    /// Time until member `id` reaches the world edge
    pub fn time_to_boundary(&self, id: EntityId) -> Result<f64> {
        let entity = self.member(id)?;
        Ok(collision::time_to_boundary(entity, self.width, self.height))
    }

    /// Where member `id` will first touch the world edge
    pub fn boundary_collision_position(&self, id: EntityId) -> Result<Option<Vector>> {
        let entity = self.member(id)?;
        Ok(collision::boundary_collision_position(
            entity,
            self.width,
            self.height,
        ))
    }

    pub(super) fn members_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BULLET_MAX_BOUNCES;
    use crate::error::ErrorKind;
    use crate::sim::Thruster;

    fn ship(x: f64, y: f64, radius: f64) -> Entity {
        Entity::ship(Vector::new(x, y), Vector::ZERO, radius, 0.0, Thruster::default()).unwrap()
    }

    fn bullet(radius: f64) -> Entity {
        Entity::bullet(Vector::ZERO, Vector::ZERO, radius, BULLET_MAX_BOUNCES).unwrap()
    }

    fn asteroid(x: f64, y: f64, radius: f64) -> Entity {
        Entity::asteroid(Vector::new(x, y), Vector::ZERO, radius).unwrap()
    }

    #[test]
    fn test_dimensions() {
        assert!(World::new(100.0, 0.0).is_ok());
        assert!(World::new(f64::MAX, f64::MAX).is_ok());
        let err = World::new(-1.0, 10.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(World::new(10.0, f64::INFINITY).is_err());
        assert!(World::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_boundary_margin() {
        let mut world = World::new(100.0, 100.0).unwrap();
        let err = world.add_entity(ship(10.88, 10.88, 11.0)).unwrap_err();
        assert!(matches!(err.reason, SimError::OutOfBounds));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        // Entity comes back untouched
        let returned = err.into_entity();
        assert!(returned.world().is_none());

        let id = world.add_entity(ship(10.90, 10.90, 11.0)).unwrap();
        assert!(world.has_entity(id));
        assert_eq!(world.entity(id).unwrap().world(), Some(world.id()));
    }

    #[test]
    fn test_rejects_overlap() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let first = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        let err = world.add_entity(ship(120.0, 100.0, 20.0)).unwrap_err();
        assert!(matches!(err.reason, SimError::Overlap { other } if other == first));
        assert_eq!(world.entity_count(), 1);

        // Within the tolerance band is fine
        world.add_entity(ship(139.7, 100.0, 20.0)).unwrap();
    }

    #[test]
    fn test_member_copy_is_standalone() {
        let mut a = World::new(1000.0, 1000.0).unwrap();
        let mut b = World::new(1000.0, 1000.0).unwrap();
        let id = a.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        a.load_bullet(id, bullet(3.0)).unwrap();

        let copy = a.entity(id).unwrap().clone();
        assert!(copy.world().is_none());
        assert_eq!(copy.as_ship().unwrap().bullet_count(), 1);
        assert_eq!(a.entity(id).unwrap().world(), Some(a.id()));

        // The copy joins another world; the original stays where it was
        let copied = b.add_entity(copy).unwrap();
        assert_eq!(b.entity(copied).unwrap().world(), Some(b.id()));
        assert!(a.has_entity(id));

        let mut other = a.entity(id).unwrap().clone();
        other.terminate().unwrap();
        assert!(other.is_terminated());
        assert!(!a.entity(id).unwrap().is_terminated());
    }

    #[test]
    fn test_rejects_collision_points() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let point = Entity::collision_point(Vector::new(5.0, 5.0)).unwrap();
        assert!(matches!(
            world.add_entity(point).unwrap_err().reason,
            SimError::NotPlaceable
        ));
    }

    #[test]
    fn test_terminate_round_trip() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let id = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        let corpse = world.terminate_entity(id).unwrap();
        assert!(!world.has_entity(id));
        assert!(corpse.world().is_none());
        assert!(corpse.is_terminated());

        let err = world.add_entity(corpse).unwrap_err();
        assert!(matches!(err.reason, SimError::Terminated));
        assert!(matches!(
            world.terminate_entity(id),
            Err(SimError::NotInWorld(_))
        ));
    }

    #[test]
    fn test_remove_and_readd() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let id = world.add_entity(asteroid(100.0, 100.0, 20.0)).unwrap();
        let rock = world.remove_entity(id).unwrap();
        assert!(rock.world().is_none());
        assert!(!rock.is_terminated());
        assert!(matches!(world.remove_entity(id), Err(SimError::NotInWorld(_))));

        let new_id = world.add_entity(rock).unwrap();
        assert_ne!(new_id, id);
    }

    #[test]
    fn test_ids_run_out_without_panicking() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        world.next_id = u32::MAX - 1;
        let last = world.add_entity(asteroid(100.0, 100.0, 20.0)).unwrap();
        assert_eq!(last.raw(), u32::MAX - 1);

        let err = world.add_entity(asteroid(300.0, 300.0, 20.0)).unwrap_err();
        assert!(matches!(err.reason, SimError::IdsExhausted));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.into_entity().world().is_none());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_terminated_world() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        world.add_entity(asteroid(100.0, 100.0, 20.0)).unwrap();
        let released = world.terminate();
        assert_eq!(released.len(), 1);
        assert!(released[0].world().is_none());
        assert!(!released[0].is_terminated());
        assert!(world.is_terminated());
        assert_eq!(world.entity_count(), 0);

        let err = world.add_entity(asteroid(300.0, 300.0, 20.0)).unwrap_err();
        assert!(matches!(err.reason, SimError::WorldTerminated));
    }

    #[test]
    fn test_queries() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let s = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        let near = world.add_entity(asteroid(200.0, 100.0, 10.0)).unwrap();
        let far = world.add_entity(asteroid(600.0, 100.0, 10.0)).unwrap();
        let other_ship = world.add_entity(ship(100.0, 400.0, 20.0)).unwrap();

        assert_eq!(world.nearest(s, EntityKind::Asteroid), Some(near));
        assert_eq!(world.nearest(s, EntityKind::Ship), Some(other_ship));
        assert_eq!(world.nearest(s, EntityKind::Planetoid), None);
        assert_eq!(world.nearest(far, EntityKind::Asteroid), Some(near));

        assert_eq!(world.entity_at(Vector::new(105.0, 95.0)), Some(s));
        assert_eq!(world.entity_at(Vector::new(500.0, 500.0)), None);

        let asteroids: Vec<_> = world.entities_of(EntityKind::Asteroid).map(|(id, _)| id).collect();
        assert_eq!(asteroids, vec![near, far]);
    }

    #[test]
    fn test_time_to_boundary_member() {
        let mut world = World::new(100.0, 100.0).unwrap();
        let (position, velocity) = (Vector::new(50.0, 30.0), Vector::new(0.0, 1.0));
        let e = Entity::ship(position, velocity, 20.0, 0.0, Thruster::default()).unwrap();
        let id = world.add_entity(e).unwrap();
        assert!((world.time_to_boundary(id).unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(
            world.boundary_collision_position(id).unwrap(),
            Some(Vector::new(50.0, 100.0))
        );
    }

    #[test]
    fn test_ship_controls() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let s = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        let rock = world.add_entity(asteroid(300.0, 300.0, 20.0)).unwrap();
        world.ship_mut(s).unwrap().thrust_on();
        world.ship_mut(s).unwrap().turn(1.0).unwrap();
        let state = world.entity(s).unwrap().as_ship().unwrap();
        assert!(state.is_thrusting());
        assert!((state.orientation() - 1.0).abs() < 1e-12);
        assert!(matches!(world.ship_mut(rock), Err(SimError::WrongKind { .. })));
    }

    #[test]
    fn test_fire_bullet() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let s = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        assert_eq!(world.fire_bullet(s).unwrap(), None);

        world.load_bullet(s, bullet(3.0)).unwrap();
        let b = world.fire_bullet(s).unwrap().unwrap();
        let fired = world.entity(b).unwrap();
        assert!((fired.position() - Vector::new(123.0, 100.0)).length() < 1e-9);
        assert!((fired.velocity() - Vector::new(250.0, 0.0)).length() < 1e-9);
        assert!(fired.as_bullet().unwrap().fired_by(s));
        assert_eq!(world.entity(s).unwrap().as_ship().unwrap().bullet_count(), 0);
    }

    #[test]
    fn test_fire_bullet_out_of_bounds() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        // Facing the left wall, barrel right at the edge
        let facing_left = std::f64::consts::PI;
        let position = Vector::new(21.0, 500.0);
        let e =
            Entity::ship(position, Vector::ZERO, 20.0, facing_left, Thruster::default()).unwrap();
        let s = world.add_entity(e).unwrap();
        world.load_bullet(s, bullet(3.0)).unwrap();
        assert_eq!(world.fire_bullet(s).unwrap(), None);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.entity(s).unwrap().as_ship().unwrap().bullet_count(), 0);
    }

    #[test]
    fn test_fire_bullet_point_blank() {
        let mut world = World::new(1000.0, 1000.0).unwrap();
        let s = world.add_entity(ship(100.0, 100.0, 20.0)).unwrap();
        let rock = world.add_entity(asteroid(130.0, 100.0, 8.0)).unwrap();
        world.load_bullet(s, bullet(3.0)).unwrap();
        assert_eq!(world.fire_bullet(s).unwrap(), None);
        assert!(!world.has_entity(rock));
        assert!(world.has_entity(s));
        assert_eq!(world.entity_count(), 1);
    }
}
