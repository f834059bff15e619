//! Collision resolution policy
//!
//! One symmetric table maps an unordered pair of kinds to what happens when
//! they touch. A new kind needs one new row here and nothing else.

use super::collision::{Walls, reflect_velocity};
use super::entity::{Entity, EntityId, EntityKind};

/// One participant of a pair, in the order the pair was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl Side {
    fn flip(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// What happens when two entities touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairAction {
    /// Elastic bounce along the line of centers
    Bounce,
    /// `victim` is terminated, the other side is untouched
    Destroy { victim: Side },
    /// `traveller` jumps to a random spot in the world, or dies if it lands badly
    Teleport { traveller: Side },
    /// The bullet is spent; the other side dies too unless it fired the bullet
    Impact { bullet: Side },
}

impl PairAction {
    fn flip(self) -> Self {
        match self {
            PairAction::Bounce => PairAction::Bounce,
            PairAction::Destroy { victim } => PairAction::Destroy {
                victim: victim.flip(),
            },
            PairAction::Teleport { traveller } => PairAction::Teleport {
                traveller: traveller.flip(),
            },
            PairAction::Impact { bullet } => PairAction::Impact {
                bullet: bullet.flip(),
            },
        }
    }
}

/// Rows for `a <= b`
fn lookup(a: EntityKind, b: EntityKind) -> Option<PairAction> {
    use EntityKind::*;

    match (a, b) {
        (Ship, Ship) => Some(PairAction::Bounce),
        (Ship, Bullet) => Some(PairAction::Impact {
            bullet: Side::Second,
        }),
        (Ship, Asteroid) => Some(PairAction::Destroy { victim: Side::First }),
        (Ship, Planetoid) => Some(PairAction::Teleport {
            traveller: Side::First,
        }),
        (Bullet, Bullet | Asteroid | Planetoid) => Some(PairAction::Impact { bullet: Side::First }),
        (Asteroid | Planetoid, Asteroid | Planetoid) => Some(PairAction::Bounce),
        // Collision points never meet anything
        _ => None,
    }
}

/// Action for a pair of kinds, with sides relative to the given order
pub fn pair_action(a: EntityKind, b: EntityKind) -> Option<PairAction> {
    if a <= b {
        lookup(a, b)
    } else {
        lookup(b, a).map(PairAction::flip)
    }
}

/// Whether a bullet hitting `other` (member id `other_id`) also destroys it
pub fn impact_destroys(bullet: &Entity, other_id: EntityId, other: &Entity) -> bool {
    let fired_by_other = bullet
        .as_bullet()
        .is_some_and(|state| state.fired_by(other_id));
    !(other.kind() == EntityKind::Ship && fired_by_other)
}

/// Elastic two-body collision of touching disks.
///
/// Exchanges momentum along the line of centers using each body's total mass;
/// tangential components are unchanged.
pub fn bounce(a: &mut Entity, b: &mut Entity) {
    let dr = b.position() - a.position();
    let dv = b.velocity() - a.velocity();
    let (m1, m2) = (a.mass(), b.mass());
    let Some(normal) = dr.normalize() else {
        return;
    };
    if m1 + m2 <= 0.0 {
        return;
    }
    let sigma = dr.length();
    let impulse = 2.0 * m1 * m2 * dv.dot(dr) / (sigma * (m1 + m2));
    a.set_velocity(a.velocity() + normal * (impulse / m1));
    b.set_velocity(b.velocity() - normal * (impulse / m2));
}

/// Outcome of an entity reaching the world edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    Reflected,
    /// A bullet used up its bounces and must be terminated
    Spent,
}

/// Bounce off the world edge
pub fn bounce_off_boundary(entity: &mut Entity, walls: Walls) -> BoundaryOutcome {
    if let Some(bullet) = entity.as_bullet_mut() {
        if bullet.register_bounce() {
            return BoundaryOutcome::Spent;
        }
    }
    entity.set_velocity(reflect_velocity(entity.velocity(), walls));
    BoundaryOutcome::Reflected
}
