//! Simulation error types.
//!
//! Every contract violation is reported synchronously at the offending call.
//! Degenerate numerics (zero relative velocity, zero-length vectors) are not
//! errors; they surface as "no collision".

use thiserror::Error;

use crate::sim::{Contact, EntityId, EntityKind};

/// Broad category of a [`SimError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed a value outside an operation's contract
    InvalidArgument,
    /// The operation would break a world or entity invariant
    InvalidState,
    /// The event loop detected an inconsistency it cannot recover from
    Simulation,
    /// Configuration could not be read or parsed
    Config,
}

/// Top-level error enum for the engine.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("duration must be a non-negative number, got {dt}")]
    InvalidDuration { dt: f64 },

    #[error("{what} must be finite")]
    NonFinite { what: &'static str },

    #[error("{kind} radius {radius} is below the minimum for its kind")]
    InvalidRadius { kind: EntityKind, radius: f64 },

    #[error("world dimensions {width} x {height} are out of range")]
    InvalidDimension { width: f64, height: f64 },

    #[error("time to collision is undefined for overlapping entities")]
    AlreadyOverlapping,

    #[error("expected a {expected}, got a {found}")]
    WrongKind {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("bullet of radius {bullet} does not fit inside a ship of radius {ship}")]
    BulletTooLarge { bullet: f64, ship: f64 },

    #[error("invalid configuration value for `{field}`")]
    InvalidConfig { field: &'static str },

    #[error("entity already belongs to a world")]
    AlreadyInWorld,

    #[error("entity has been terminated")]
    Terminated,

    #[error("entity does not lie inside the world bounds")]
    OutOfBounds,

    #[error("entity overlaps {other:?}")]
    Overlap { other: EntityId },

    #[error("collision points cannot join a world")]
    NotPlaceable,

    #[error("{0:?} is not a member of this world")]
    NotInWorld(EntityId),

    #[error("world has been terminated")]
    WorldTerminated,

    #[error("world has run out of entity ids")]
    IdsExhausted,

    #[error("event loop stalled on {contact:?} at t={time}")]
    Stalled { contact: Contact, time: f64 },

    #[error("configuration file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SimError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::InvalidDuration { .. }
            | SimError::NonFinite { .. }
            | SimError::InvalidRadius { .. }
            | SimError::InvalidDimension { .. }
            | SimError::AlreadyOverlapping
            | SimError::WrongKind { .. }
            | SimError::BulletTooLarge { .. }
            | SimError::InvalidConfig { .. } => ErrorKind::InvalidArgument,
            SimError::AlreadyInWorld
            | SimError::Terminated
            | SimError::OutOfBounds
            | SimError::Overlap { .. }
            | SimError::NotPlaceable
            | SimError::NotInWorld(_)
            | SimError::WorldTerminated
            | SimError::IdsExhausted => ErrorKind::InvalidState,
            SimError::Stalled { .. } => ErrorKind::Simulation,
            SimError::Io(_) | SimError::Parse(_) => ErrorKind::Config,
        }
    }
}

/// Rejected [`World::add_entity`](crate::sim::World::add_entity) call.
///
/// Hands the entity back untouched so the caller keeps ownership.
#[derive(Debug, Error)]
#[error("entity rejected: {reason}")]
pub struct AddEntityError {
    pub entity: Box<crate::sim::Entity>,
    #[source]
    pub reason: SimError,
}

impl AddEntityError {
    /// Category of the underlying rejection
    pub fn kind(&self) -> ErrorKind {
        self.reason.kind()
    }

    /// Recover the rejected entity
    pub fn into_entity(self) -> crate::sim::Entity {
        *self.entity
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SimError::InvalidDuration { dt: -1.0 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(SimError::AlreadyInWorld.kind(), ErrorKind::InvalidState);
        assert_eq!(
            SimError::NotInWorld(EntityId::from_raw(3)).kind(),
            ErrorKind::InvalidState
        );
        let bad_json = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(SimError::from(bad_json).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_messages_name_the_problem() {
        let err = SimError::InvalidRadius {
            kind: EntityKind::Ship,
            radius: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "ship radius 2 is below the minimum for its kind"
        );
    }
}
