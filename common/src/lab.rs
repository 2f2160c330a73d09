//! The surface every lab exposes to its driver
//!
//! A driver (UI tick, headless binary or test) edits the scene through
//! `add_entity`/`remove_entity`/`set_parameter`/`load_preset`, advances it
//! with `step`, and reads invariants back with `query_invariants`.

use serde::{Deserialize, Serialize};

use crate::arena::EntityId;
use crate::conservation::InvariantReport;
use crate::error::{Result, SimError};

/// What a parameter edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Global,
    Entity(EntityId),
}

/// A user-edited parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
    Choice(String),
}

impl ParamValue {
    /// Finite number, or an error naming `key`
    pub fn number(&self, key: &str) -> Result<f64> {
        match self {
            ParamValue::Number(v) if v.is_finite() => Ok(*v),
            ParamValue::Number(v) => Err(SimError::invalid(key, v, "must be finite")),
            other => Err(SimError::invalid(key, format!("{other:?}"), "expected a number")),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool> {
        match self {
            ParamValue::Flag(b) => Ok(*b),
            other => Err(SimError::invalid(key, format!("{other:?}"), "expected a flag")),
        }
    }

    pub fn choice(&self, key: &str) -> Result<&str> {
        match self {
            ParamValue::Choice(s) => Ok(s),
            other => Err(SimError::invalid(key, format!("{other:?}"), "expected a choice")),
        }
    }

    pub fn positive(&self, key: &str) -> Result<f64> {
        let v = self.number(key)?;
        if v > 0.0 {
            Ok(v)
        } else {
            Err(SimError::invalid(key, v, "must be positive"))
        }
    }

    pub fn non_negative(&self, key: &str) -> Result<f64> {
        let v = self.number(key)?;
        if v >= 0.0 {
            Ok(v)
        } else {
            Err(SimError::invalid(key, v, "must not be negative"))
        }
    }

    /// Number in the closed range `[lo, hi]`
    pub fn in_range(&self, key: &str, lo: f64, hi: f64) -> Result<f64> {
        let v = self.number(key)?;
        if (lo..=hi).contains(&v) {
            Ok(v)
        } else {
            Err(SimError::invalid(key, v, "out of range"))
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Flag(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Choice(v.to_string())
    }
}

/// Check a physical quantity at the scene-editing boundary
pub fn require_positive(key: &str, value: f64) -> Result<f64> {
    ParamValue::Number(value).positive(key)
}

/// Per-frame view of a scene handed back to the driver
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub time: f64,
    pub entities: Vec<(EntityId, T)>,
}

impl<T> Snapshot<T> {
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entities.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A simulation lab driven one frame at a time
pub trait Lab {
    /// What `add_entity` accepts
    type Spec;
    /// What snapshots carry per entity
    type Entity: Clone;

    /// Advance by one frame; `dt` is clamped before use
    fn step(&mut self, dt: f64) -> Snapshot<Self::Entity>;

    fn add_entity(&mut self, spec: Self::Spec) -> Result<EntityId>;

    fn remove_entity(&mut self, id: EntityId) -> Result<()>;

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()>;

    /// Replace the scene with a named preset and freeze the invariant baseline
    fn load_preset(&mut self, name: &str) -> Result<Snapshot<Self::Entity>>;

    fn presets(&self) -> &'static [&'static str];

    fn query_invariants(&self) -> InvariantReport;

    fn snapshot(&self) -> Snapshot<Self::Entity>;

    /// Remove every entity and clear trails and the baseline
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_validation() {
        assert_eq!(ParamValue::from(2.0).positive("k").unwrap(), 2.0);
        assert!(ParamValue::from(0.0).positive("k").is_err());
        assert!(ParamValue::from(f64::NAN).number("k").is_err());
        assert!(ParamValue::from("rk4").number("k").is_err());
        assert_eq!(ParamValue::from(0.5).in_range("e", 0.0, 1.0).unwrap(), 0.5);
        assert!(ParamValue::from(1.5).in_range("e", 0.0, 1.0).is_err());
    }

    #[test]
    fn choice_and_flag() {
        assert_eq!(ParamValue::from("elastic").choice("collision_type").unwrap(), "elastic");
        assert!(ParamValue::from(true).flag("trails").unwrap());
        assert!(ParamValue::from(1.0).flag("trails").is_err());
    }
}
