//! N-body orbital mechanics
//!
//! Bodies attract pairwise under Newtonian gravity and are advanced with
//! sub-stepped semi-implicit Euler. `kepler` derives orbital elements and
//! Lagrange points from instantaneous state; `spaceship` adds thrust.

pub mod kepler;
pub mod presets;
pub mod solar_system;
pub mod spaceship;

pub use kepler::{circular_speed, escape_speed, lagrange_points, OrbitalElements};
pub use solar_system::{BodyKind, BodySpec, CelestialBody, OrbitalLab};
pub use spaceship::Thruster;
