//! Deterministic chaos: the double pendulum and the Lorenz system
//!
//! Both are integrated with fixed-size RK4 sub-steps. Nearby starting
//! states separate exponentially, which `ChaosLab::separation` measures.

pub mod lorenz;
pub mod pendulum;
pub mod physics;
pub mod presets;

pub use lorenz::{LorenzParams, LorenzTracer};
pub use pendulum::{DoublePendulum, EnergyAudit, PendulumParams};
pub use physics::{ChaosLab, System, SystemSpec};
