//! Collision notifications for front-ends
//!
//! Observers only; nothing a listener does feeds back into the simulation.

use serde::{Deserialize, Serialize};

use super::collision::Walls;
use super::entity::{EntityId, EntityKind};
use super::vector::Vector;

/// What touched what.
///
/// Ordered so that simultaneous events resolve deterministically: boundary
/// contacts first, then by ascending entity ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Contact {
    /// A member reached the world edge
    Boundary { entity: EntityId, walls: Walls },
    /// Two members touched; `first < second`
    Pair { first: EntityId, second: EntityId },
}

impl Contact {
    /// Pair contact with ids in canonical order
    pub fn pair(a: EntityId, b: EntityId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Contact::Pair { first, second }
    }

    /// Entities involved, independent of which edges were hit
    pub fn participants(&self) -> (EntityId, Option<EntityId>) {
        match *self {
            Contact::Boundary { entity, .. } => (entity, None),
            Contact::Pair { first, second } => (first, Some(second)),
        }
    }
}

/// Predicted collision, not yet resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Time until it happens
    pub time: f64,
    pub contact: Contact,
    /// Kinds of the participants, in the same order as the contact ids
    pub kinds: (EntityKind, Option<EntityKind>),
    /// Where the bodies (or body and edge) touch
    pub position: Vector,
}

/// A resolved collision, as reported to listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub contact: Contact,
    /// Kinds of the participants, in the same order as the contact ids
    pub kinds: (EntityKind, Option<EntityKind>),
    pub position: Vector,
    /// Time since the start of the `evolve` call
    pub time: f64,
}

/// Receives one notification per resolved collision
pub trait CollisionListener {
    fn on_collision(&mut self, event: &CollisionEvent);
}

impl<F> CollisionListener for F
where
    F: FnMut(&CollisionEvent),
{
    fn on_collision(&mut self, event: &CollisionEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn test_pair_is_canonical() {
        assert_eq!(Contact::pair(id(5), id(2)), Contact::pair(id(2), id(5)));
        assert_eq!(
            Contact::pair(id(5), id(2)).participants(),
            (id(2), Some(id(5)))
        );
    }

    #[test]
    fn test_boundary_sorts_before_pairs() {
        let boundary = Contact::Boundary {
            entity: id(9),
            walls: Walls::default(),
        };
        let pair = Contact::pair(id(1), id(2));
        assert!(boundary < pair);
        assert!(Contact::pair(id(1), id(3)) < Contact::pair(id(2), id(3)));
    }

    #[test]
    fn test_closure_is_listener() {
        let mut seen = Vec::new();
        {
            let mut listener = |event: &CollisionEvent| seen.push(event.time);
            let event = CollisionEvent {
                contact: Contact::pair(id(1), id(2)),
                kinds: (EntityKind::Ship, Some(EntityKind::Asteroid)),
                position: Vector::ZERO,
                time: 1.5,
            };
            listener.on_collision(&event);
        }
        assert_eq!(seen, vec![1.5]);
    }
}
