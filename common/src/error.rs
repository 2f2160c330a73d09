//! Error types for the simulation core

use thiserror::Error;

use crate::arena::EntityId;

/// Errors raised at the scene-editing boundary.
///
/// Numerical trouble inside a step never surfaces here; it is handled by
/// clamps and skips (see [`Degeneracy`]).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("invalid value {value} for `{key}`: {reason}")]
    InvalidParameter {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("entity {id} is not a {expected}")]
    WrongEntityKind { id: EntityId, expected: &'static str },

    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl SimError {
    pub fn invalid(key: &str, value: impl ToString, reason: &'static str) -> Self {
        SimError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

/// A physically degenerate entity that a force law refused to divide by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Degeneracy {
    #[error("non-positive mass")]
    ZeroMass,

    #[error("non-positive moment of inertia")]
    ZeroInertia,

    #[error("coincident centres")]
    CoincidentCentres,
}

pub type Result<T> = std::result::Result<T, SimError>;
