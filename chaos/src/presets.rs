//! Named starting scenes for the chaos lab

use common::{Lab, Result, SimError, Vec3};

use crate::pendulum::PendulumParams;
use crate::physics::{ChaosLab, SystemSpec};

pub const NAMES: &[&str] = &["double_pendulum", "twin_pendulums", "lorenz", "lorenz_pair"];

/// Classic Lorenz starting point and the nudge applied to its twin
pub const LORENZ_START: Vec3 = Vec3::new(0.0, 1.0, 1.05);
pub const LORENZ_NUDGE: f64 = 0.001;

pub(crate) fn build(lab: &mut ChaosLab, name: &str) -> Result<()> {
    let start = 2.0 * std::f64::consts::FRAC_PI_3;
    let pendulum = |theta1: f64, theta2: f64| SystemSpec::Pendulum {
        params: PendulumParams::default(),
        theta1,
        theta2,
    };

    match name {
        "double_pendulum" => {
            lab.add_entity(pendulum(start, start))?;
        }
        // Same start up to a milliradian on the lower rod
        "twin_pendulums" => {
            lab.add_entity(pendulum(start, start))?;
            lab.add_entity(pendulum(start, start + 1e-3))?;
        }
        "lorenz" => {
            lab.add_entity(SystemSpec::Lorenz(LORENZ_START))?;
        }
        "lorenz_pair" => {
            lab.add_entity(SystemSpec::Lorenz(LORENZ_START))?;
            lab.add_entity(SystemSpec::Lorenz(LORENZ_START + Vec3::X * LORENZ_NUDGE))?;
        }
        _ => return Err(SimError::UnknownPreset(name.to_string())),
    }
    Ok(())
}
