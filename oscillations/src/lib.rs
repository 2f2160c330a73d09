//! Springs, damping and resonance

pub mod physics;
pub mod presets;

pub use physics::{
    natural_frequency, DampingType, Drive, Element, ElementSpec, Endpoint, Mass, MassSpec, OscillationsLab, Spring,
};
