//! Rigid rotation: moment of inertia, torque and friction

pub mod physics;
pub mod presets;

pub use physics::{RotationLab, Rotator, RotatorSpec, Shape};
