//! Event-driven world advance
//!
//! Instead of fixed substeps, the world jumps straight to the next collision,
//! resolves it, and repeats until the requested time is used up. Positions are
//! exact at every contact, so nothing tunnels.

use std::f64::consts::TAU;

use rand::Rng;

use super::collision::{self, Walls, contact_point, contact_time};
use super::entity::{Entity, EntityId, EntityKind};
use super::event::{Collision, CollisionEvent, CollisionListener, Contact};
use super::resolution::{
    BoundaryOutcome, PairAction, Side, bounce, bounce_off_boundary, impact_destroys, pair_action,
};
use super::vector::Vector;
use super::world::World;
use crate::consts::PLANETOID_SPLIT_SPEEDUP;
use crate::error::{Result, SimError};
use crate::heading;

/// Order two values so the one on `side` comes first
fn pick<T>(side: Side, first: T, second: T) -> (T, T) {
    match side {
        Side::First => (first, second),
        Side::Second => (second, first),
    }
}

impl World {
    /// Advance the world by `dt`, resolving every collision on the way in
    /// chronological order.
    ///
    /// The optional listener hears about each resolved collision. Fails on a
    /// negative duration, on a terminated world, or if the same contact keeps
    /// recurring at zero time.
    pub fn evolve(
        &mut self,
        dt: f64,
        mut listener: Option<&mut dyn CollisionListener>,
    ) -> Result<()> {
        if !(dt >= 0.0) {
            return Err(SimError::InvalidDuration { dt });
        }
        self.ensure_alive()?;

        let epsilon = self.config.event_epsilon;
        let mut remaining = dt;
        let mut elapsed = 0.0;
        // Last contact resolved at (near) zero time
        let mut last_instant: Option<Contact> = None;

        while let Some(next) = self.next_collision().filter(|c| c.time <= remaining) {
            if next.time < epsilon {
                let participants = next.contact.participants();
                if last_instant.is_some_and(|prev| prev.participants() == participants) {
                    log::warn!("Event loop stalled on {:?} after t={}", next.contact, elapsed);
                    return Err(SimError::Stalled {
                        contact: next.contact,
                        time: elapsed,
                    });
                }
                last_instant = Some(next.contact);
            } else {
                last_instant = None;
            }

            self.advance(next.time);
            remaining -= next.time;
            elapsed += next.time;

            let event = CollisionEvent {
                contact: next.contact,
                kinds: next.kinds,
                position: next.position,
                time: elapsed,
            };
            self.resolve(next.contact);
            if let Some(listener) = listener.as_deref_mut() {
                listener.on_collision(&event);
            }
        }

        self.advance(remaining);
        Ok(())
    }

    /// Earliest upcoming collision, if any
    ///
    /// Collisions within `event_epsilon` of each other are ordered by
    /// [`Contact`] so the pick is deterministic.
    pub fn next_collision(&self) -> Option<Collision> {
        let epsilon = self.config.event_epsilon;
        let members: Vec<(EntityId, &Entity)> = self.entities().collect();
        let mut best: Option<(f64, Contact)> = None;
        let mut consider = |time: f64, contact: Contact| {
            let better = match best {
                None => true,
                Some((best_time, best_contact)) => {
                    time < best_time - epsilon
                        || ((time - best_time).abs() <= epsilon && contact < best_contact)
                }
            };
            if better {
                best = Some((time, contact));
            }
        };

        for (i, &(id, entity)) in members.iter().enumerate() {
            let hit = collision::boundary_hit(entity, self.width(), self.height(), epsilon);
            if let Some(hit) = hit {
                consider(hit.time, Contact::Boundary {
                    entity: id,
                    walls: hit.walls,
                });
            }
            for &(other_id, other) in &members[i + 1..] {
                if pair_action(entity.kind(), other.kind()).is_none() {
                    continue;
                }
                let time = contact_time(
                    other.position() - entity.position(),
                    other.velocity() - entity.velocity(),
                    entity.radius() + other.radius(),
                );
                if time.is_finite() {
                    consider(time, Contact::pair(id, other_id));
                }
            }
        }

        let (time, contact) = best?;
        let (first, second) = contact.participants();
        let first_kind = self.entity(first)?.kind();
        let second_kind = match second {
            Some(id) => Some(self.entity(id)?.kind()),
            None => None,
        };
        Some(Collision {
            time,
            contact,
            kinds: (first_kind, second_kind),
            position: self.contact_position(contact, time)?,
        })
    }

    /// Where `contact` happens if everything flies freely for `time`
    fn contact_position(&self, contact: Contact, time: f64) -> Option<Vector> {
        match contact {
            Contact::Boundary { entity, .. } => {
                let entity = self.entity(entity)?;
                let epsilon = self.config.event_epsilon;
                collision::boundary_hit(entity, self.width(), self.height(), epsilon)
                    .map(|hit| hit.point)
            }
            Contact::Pair { first, second } => {
                let (a, b) = (self.entity(first)?, self.entity(second)?);
                Some(contact_point(
                    a.position() + a.velocity() * time,
                    a.radius(),
                    b.position() + b.velocity() * time,
                    b.radius(),
                ))
            }
        }
    }


    /// Free flight plus thrust for every member
    fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for entity in self.members_mut() {
            entity.advance(dt);
            entity.apply_thrust(dt);
        }
    }

    /// Apply the resolution policy to a contact happening now
    pub(super) fn resolve(&mut self, contact: Contact) {
        match contact {
            Contact::Boundary { entity, walls } => self.resolve_boundary(entity, walls),
            Contact::Pair { first, second } => self.resolve_pair(first, second),
        }
    }

    fn resolve_boundary(&mut self, id: EntityId, walls: Walls) {
        let Ok(entity) = self.member_mut(id) else {
            return;
        };
        if bounce_off_boundary(entity, walls) == BoundaryOutcome::Spent {
            log::debug!("Bullet {:?} spent its bounces", id);
            if let Some(entity) = self.take(id) {
                self.destroy(id, entity);
            }
        }
    }

    fn resolve_pair(&mut self, first: EntityId, second: EntityId) {
        let Some(mut a) = self.take(first) else {
            return;
        };
        let Some(mut b) = self.take(second) else {
            self.reinsert(first, a);
            return;
        };
        log::debug!("{} {:?} hit {} {:?}", a.kind(), first, b.kind(), second);

        match pair_action(a.kind(), b.kind()) {
            None => {
                self.reinsert(first, a);
                self.reinsert(second, b);
            }
            Some(PairAction::Bounce) => {
                bounce(&mut a, &mut b);
                self.reinsert(first, a);
                self.reinsert(second, b);
            }
            Some(PairAction::Destroy { victim }) => {
                let ((victim_id, victim), (survivor_id, survivor)) =
                    pick(victim, (first, a), (second, b));
                self.reinsert(survivor_id, survivor);
                self.destroy(victim_id, victim);
            }
            Some(PairAction::Teleport { traveller }) => {
                let ((traveller_id, traveller), (other_id, other)) =
                    pick(traveller, (first, a), (second, b));
                self.reinsert(other_id, other);
                self.teleport(traveller_id, traveller);
            }
            Some(PairAction::Impact { bullet }) => {
                let ((bullet_id, bullet), (other_id, other)) =
                    pick(bullet, (first, a), (second, b));
                if impact_destroys(&bullet, other_id, &other) {
                    self.destroy(bullet_id, bullet);
                    self.destroy(other_id, other);
                } else {
                    self.reinsert(other_id, other);
                    self.destroy(bullet_id, bullet);
                }
            }
        }
    }

    /// Terminate an entity already taken out of the member set
    fn destroy(&mut self, id: EntityId, mut entity: Entity) {
        log::debug!("{} {:?} destroyed", entity.kind(), id);
        entity.mark_terminated();
        let splits = entity.kind() == EntityKind::Planetoid
            && entity.radius() >= self.config.planetoid_split_radius;
        if splits {
            self.split_planetoid(&entity);
        }
    }

    /// Jump a ship to a random spot, destroying it if the spot is taken
    fn teleport(&mut self, id: EntityId, mut ship: Entity) {
        let Some(destination) = self.random_position(ship.radius()) else {
            log::debug!("No room to teleport {:?}", id);
            self.destroy(id, ship);
            return;
        };
        ship.place(destination);
        match self.check_spot(&ship) {
            Ok(()) => {
                log::debug!("Teleported {:?} to {:?}", id, destination);
                self.reinsert(id, ship);
            }
            Err(reason) => {
                log::debug!("Teleport of {:?} failed: {}", id, reason);
                self.destroy(id, ship);
            }
        }
    }

    /// Uniform point keeping a disk of `radius` fully inside the world
    fn random_position(&mut self, radius: f64) -> Option<Vector> {
        let (max_x, max_y) = (self.width() - radius, self.height() - radius);
        if max_x < radius || max_y < radius {
            return None;
        }
        let x = self.rng.random_range(radius..=max_x);
        let y = self.rng.random_range(radius..=max_y);
        Some(Vector::new(x, y))
    }

    /// Two asteroids of half the radius fly apart from where the planetoid was
    fn split_planetoid(&mut self, planetoid: &Entity) {
        let direction = heading(self.rng.random_range(0.0..TAU));
        let radius = planetoid.radius() / 2.0;
        let speed = planetoid.speed() * PLANETOID_SPLIT_SPEEDUP;

        for sign in [1.0, -1.0] {
            let child = Entity::asteroid(
                planetoid.position() + direction * (sign * radius),
                direction * (sign * speed),
                radius,
            );
            let placed = child
                .and_then(|child| self.check_spot(&child).map(|()| child))
                .and_then(|child| self.next_entity_id().map(|id| (id, child)));
            match placed {
                Ok((id, child)) => {
                    self.admit(id, child);
                    log::debug!("Planetoid split spawned asteroid {:?}", id);
                }
                Err(reason) => log::warn!("Planetoid fragment not spawned: {}", reason),
            }
        }
    }
}
