//! Bullet body

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Bullet-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    /// Ship that fired this bullet (friendly-fire exemption)
    source: Option<EntityId>,
    /// Boundary bounces so far
    bounces: u32,
    max_bounces: u32,
}

impl Bullet {
    pub(crate) fn new(max_bounces: u32) -> Self {
        Self {
            source: None,
            bounces: 0,
            max_bounces,
        }
    }

    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }

    /// Whether `ship` fired this bullet
    pub fn fired_by(&self, ship: EntityId) -> bool {
        self.source == Some(ship)
    }

    pub(crate) fn set_source(&mut self, source: Option<EntityId>) {
        self.source = source;
    }

    pub(crate) fn reset_bounces(&mut self) {
        self.bounces = 0;
    }

    /// Count a boundary bounce; returns true once the bullet is spent
    pub(crate) fn register_bounce(&mut self) -> bool {
        self.bounces = self.bounces.saturating_add(1);
        self.bounces > self.max_bounces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spent_after_exceeding_max() {
        let mut bullet = Bullet::new(2);
        assert!(!bullet.register_bounce());
        assert!(!bullet.register_bounce());
        assert!(bullet.register_bounce());
        assert_eq!(bullet.bounces(), 3);
    }

    #[test]
    fn test_zero_bounce_bullet_dies_on_first_wall() {
        let mut bullet = Bullet::new(0);
        assert!(bullet.register_bounce());
    }

    #[test]
    fn test_source_tracking() {
        let mut bullet = Bullet::new(2);
        let ship = EntityId::from_raw(4);
        assert!(!bullet.fired_by(ship));
        bullet.set_source(Some(ship));
        assert!(bullet.fired_by(ship));
        assert!(!bullet.fired_by(EntityId::from_raw(5)));
    }
}
