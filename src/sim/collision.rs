//! Collision prediction for circular bodies
//!
//! Exact closed-form times of impact: when two disks first touch, and when a
//! disk first touches the edge of its world. Nothing here mutates an entity.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::vector::Vector;
use crate::consts::EVENT_EPSILON;
use crate::error::{Result, SimError};

/// Which edges of the world a disk touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Walls {
    /// Left or right edge (x velocity flips)
    pub vertical: bool,
    /// Bottom or top edge (y velocity flips)
    pub horizontal: bool,
}

/// Predicted contact with the world edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit {
    /// Time until contact
    pub time: f64,
    /// Edges reached at that time
    pub walls: Walls,
    /// Point of the disk touching the edge
    pub point: Vector,
}

/// Earliest time two approaching disks touch.
///
/// `dr` and `dv` are the second body's position and velocity relative to the
/// first, `sigma` the sum of radii. Returns infinity when they separate, move
/// in parallel or miss. Pairs already interpenetrating but still approaching
/// collide at time zero.
pub fn contact_time(dr: Vector, dv: Vector, sigma: f64) -> f64 {
    let b = dv.dot(dr);
    if b >= 0.0 {
        return f64::INFINITY;
    }
    let a = dv.dot(dv);
    let d = b * b - a * (dr.dot(dr) - sigma * sigma);
    if d <= 0.0 {
        return f64::INFINITY;
    }
    (-(b + d.sqrt()) / a).max(0.0)
}

/// Time until `a` and `b` first touch, infinity if never.
///
/// Fails for entities that already overlap.
pub fn time_to_collision(a: &Entity, b: &Entity) -> Result<f64> {
    if a.overlaps(b) {
        return Err(SimError::AlreadyOverlapping);
    }
    Ok(contact_time(
        b.position() - a.position(),
        b.velocity() - a.velocity(),
        a.radius() + b.radius(),
    ))
}

/// Point where `a` and `b` first touch, `None` if they never do
pub fn collision_position(a: &Entity, b: &Entity) -> Result<Option<Vector>> {
    let t = time_to_collision(a, b)?;
    if !t.is_finite() {
        return Ok(None);
    }
    Ok(Some(contact_point(
        a.position() + a.velocity() * t,
        a.radius(),
        b.position() + b.velocity() * t,
        b.radius(),
    )))
}

/// Tangency point of two touching disks.
///
/// Measured from whichever center sorts first under [`Vector::total_cmp`].
pub(crate) fn contact_point(
    center_a: Vector,
    radius_a: f64,
    center_b: Vector,
    radius_b: f64,
) -> Vector {
    let ((near, near_radius), far) = if center_a.total_cmp(&center_b).is_le() {
        ((center_a, radius_a), center_b)
    } else {
        ((center_b, radius_b), center_a)
    };
    match (far - near).normalize() {
        Some(direction) => near + direction * near_radius,
        // Concentric: any point on the near rim is as good as another
        None => near,
    }
}

/// Time until the disk reaches one world edge along one axis
fn axis_time(position: f64, velocity: f64, radius: f64, extent: f64) -> f64 {
    let t = if velocity > 0.0 {
        (extent - radius - position) / velocity
    } else if velocity < 0.0 {
        (radius - position) / velocity
    } else {
        return f64::INFINITY;
    };
    t.max(0.0)
}

/// Next contact between `entity` and the edges of a `width` x `height` world.
///
/// Edges reached within `epsilon` of each other are reported together.
pub fn boundary_hit(entity: &Entity, width: f64, height: f64, epsilon: f64) -> Option<BoundaryHit> {
    let (p, v, r) = (entity.position(), entity.velocity(), entity.radius());
    let tx = axis_time(p.x(), v.x(), r, width);
    let ty = axis_time(p.y(), v.y(), r, height);
    let time = tx.min(ty);
    if !time.is_finite() {
        return None;
    }

    let walls = Walls {
        vertical: tx - time <= epsilon,
        horizontal: ty - time <= epsilon,
    };
    let center = p + v * time;
    let point = if walls.vertical {
        Vector::new(if v.x() > 0.0 { width } else { 0.0 }, center.y())
    } else {
        Vector::new(center.x(), if v.y() > 0.0 { height } else { 0.0 })
    };
    Some(BoundaryHit { time, walls, point })
}

/// Time until `entity` touches a world edge, infinity if never
pub fn time_to_boundary(entity: &Entity, width: f64, height: f64) -> f64 {
    boundary_hit(entity, width, height, EVENT_EPSILON).map_or(f64::INFINITY, |hit| hit.time)
}

/// Point where `entity` first touches a world edge
pub fn boundary_collision_position(entity: &Entity, width: f64, height: f64) -> Option<Vector> {
    boundary_hit(entity, width, height, EVENT_EPSILON).map(|hit| hit.point)
}

/// Reflect velocity off the given edges
///
/// Each hit edge flips the perpendicular component.
#[inline]
pub fn reflect_velocity(velocity: Vector, walls: Walls) -> Vector {
    Vector::new(
        if walls.vertical { -velocity.x() } else { velocity.x() },
        if walls.horizontal { -velocity.y() } else { velocity.y() },
    )
}
