//! Runtime settings shared by every lab, loadable from YAML.
//!
//! ```yaml
//! max_dt: 0.05          # largest frame delta accepted by step()
//! time_scale: 1.0       # simulated seconds per wall-clock second
//! trail_length: 200     # positions kept per trail
//! max_substeps: 200     # cap on orbital sub-steps per frame
//! substep_dt: 0.01      # target orbital sub-step size
//! chaos_step: 0.005     # largest RK4 step in the chaos lab
//! min_separation: 1.0   # gravity floor distance
//! ```
//!
//! Missing keys fall back to their defaults. Out-of-range values are
//! rejected on load and when edited at runtime through [`SimConfig::set`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::forces::MIN_SEPARATION;
use crate::integrator::MAX_DT;
use crate::lab::ParamValue;

/// Fastest accepted playback speed
pub const MAX_TIME_SCALE: f64 = 100.0;
/// Longest accepted trail, in points
pub const MAX_TRAIL_LENGTH: usize = 100_000;
/// Ceiling on `max_substeps`
pub const MAX_SUBSTEPS: usize = 10_000;
/// Floor on `substep_dt` and `chaos_step`
pub const MIN_STEP: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub max_dt: f64,
    pub time_scale: f64,
    pub trail_length: usize,
    pub max_substeps: usize,
    pub substep_dt: f64,
    pub chaos_step: f64,
    pub min_separation: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_dt: MAX_DT,
            time_scale: 1.0,
            trail_length: 200,
            max_substeps: 200,
            substep_dt: 0.01,
            chaos_step: 0.005,
            min_separation: MIN_SEPARATION,
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: SimConfig = serde_yaml::from_str(text)?;
        cfg.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    fn validate(self) -> Result<Self> {
        positive("max_dt", self.max_dt)?;
        check_time_scale(self.time_scale)?;
        check_step("substep_dt", self.substep_dt)?;
        check_step("chaos_step", self.chaos_step)?;
        check_trail_length(self.trail_length as f64)?;
        check_max_substeps(self.max_substeps as f64)?;
        if !(self.min_separation >= 0.0 && self.min_separation.is_finite()) {
            return Err(SimError::invalid("min_separation", self.min_separation, "must be non-negative"));
        }
        Ok(self)
    }

    /// Edit one runtime setting by key, with the same bounds as a loaded file
    pub fn set(&mut self, key: &str, value: &ParamValue) -> Result<()> {
        match key {
            "time_scale" => self.time_scale = check_time_scale(value.number(key)?)?,
            "trail_length" => self.trail_length = check_trail_length(value.number(key)?)?,
            "max_substeps" => self.max_substeps = check_max_substeps(value.number(key)?)?,
            "substep_dt" => self.substep_dt = check_step(key, value.number(key)?)?,
            "chaos_step" => self.chaos_step = check_step(key, value.number(key)?)?,
            "min_separation" => self.min_separation = value.non_negative(key)?,
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

fn positive(key: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::invalid(key, value, "must be positive"))
    }
}

fn check_time_scale(value: f64) -> Result<f64> {
    let v = positive("time_scale", value)?;
    if v > MAX_TIME_SCALE {
        return Err(SimError::invalid("time_scale", v, "must not exceed 100"));
    }
    Ok(v)
}

fn check_step(key: &str, value: f64) -> Result<f64> {
    let v = positive(key, value)?;
    if v < MIN_STEP {
        return Err(SimError::invalid(key, v, "must be at least 1e-4"));
    }
    Ok(v)
}

fn check_trail_length(value: f64) -> Result<usize> {
    if !(0.0..=MAX_TRAIL_LENGTH as f64).contains(&value) {
        return Err(SimError::invalid("trail_length", value, "must lie in [0, 100000]"));
    }
    Ok(value as usize)
}

fn check_max_substeps(value: f64) -> Result<usize> {
    if !(1.0..=MAX_SUBSTEPS as f64).contains(&value) {
        return Err(SimError::invalid("max_substeps", value, "must lie in [1, 10000]"));
    }
    Ok(value as usize)
}
