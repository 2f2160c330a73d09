//! Shared simulation core for the physics sandboxes
//!
//! Every lab crate (mechanics, oscillations, rotation, chaos, orbital) builds
//! on the pieces here instead of carrying its own copy:
//! - `vector`: 2D vector helpers over glam's `DVec2`
//! - `integrator`: semi-implicit Euler, RK4 and dt clamping
//! - `forces`: gravity, springs, damping, driving and rotational torque
//! - `collision`: disc-disc and wall contacts
//! - `conservation`: momentum / energy / angular momentum tracking
//! - `arena`, `trail`, `lab`: scene storage and the per-lab driver surface

pub mod arena;
pub mod collision;
pub mod config;
pub mod conservation;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod lab;
pub mod runtime;
pub mod trail;
pub mod vector;

pub use arena::{Arena, EntityId};
pub use collision::{Bounds, CollisionKind, CollisionResolver, Disc};
pub use config::SimConfig;
pub use conservation::{ConservationSnapshot, ConservationTracker, InvariantReport};
pub use error::{Degeneracy, Result, SimError};
pub use integrator::{clamp_dt, substeps, Kinematic, Method, StateVector};
pub use lab::{Lab, ParamValue, Snapshot, Target};
pub use runtime::{init_logging, log_report, run_frames, FrameClock};
pub use trail::Trail;
pub use vector::{Vec2, Vec3};

/// Physical constants used in simulations
pub mod constants {
    /// Standard gravity in m/s²
    pub const STANDARD_GRAVITY: f64 = 9.81;

    /// Gravitational constant scaled for the orbital sandbox
    pub const G_SCALED: f64 = 100.0;
}
