//! Named starting scenes for the rotation lab

use common::{Lab, Result, SimError, Vec2};

use crate::physics::{RotationLab, RotatorSpec, Shape};

pub const NAMES: &[&str] = &["disk", "shape_race", "spin_down", "terminal_spin"];

pub(crate) fn build(lab: &mut RotationLab, name: &str) -> Result<()> {
    match name {
        // A lone disk coasting with nothing acting on it
        "disk" => {
            lab.add_entity(RotatorSpec::new(Shape::SolidDisk, 2.0, 80.0).at(Vec2::new(400.0, 300.0)).spinning(5.0))?;
        }
        // Same mass, radius and torque on every shape, starting from rest
        "shape_race" => {
            for (i, shape) in Shape::ALL.into_iter().enumerate() {
                let position = Vec2::new(120.0 + 140.0 * i as f64, 300.0);
                lab.add_entity(RotatorSpec::new(shape, 1.0, 1.0).at(position).with_torque(1.0))?;
            }
        }
        "spin_down" => {
            lab.set_friction(0.5);
            lab.add_entity(RotatorSpec::new(Shape::SolidDisk, 2.0, 2.0).at(Vec2::new(400.0, 300.0)).spinning(10.0))?;
        }
        // Constant torque against friction settles at τ / (friction*k)
        "terminal_spin" => {
            lab.set_friction(0.5);
            lab.add_entity(RotatorSpec::new(Shape::Ring, 1.0, 1.0).at(Vec2::new(400.0, 300.0)).with_torque(2.0))?;
        }
        _ => return Err(SimError::UnknownPreset(name.to_string())),
    }
    Ok(())
}
