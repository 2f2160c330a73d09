//! Ball collisions in a walled box
//!
//! Balls move under optional uniform gravity and linear drag, bounce off the
//! walls and collide with each other elastically, inelastically with a
//! coefficient of restitution, or perfectly inelastically.

pub mod physics;
pub mod presets;

pub use physics::{Ball, BallSpec, MechanicsLab};
