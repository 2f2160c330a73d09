//! Named starting scenes for the orbital lab
//!
//! Everything is in sandbox units with the default `G = 100`.

use std::f64::consts::{FRAC_PI_2, PI};

use common::{Lab, Result, SimError, Vec2};

use crate::kepler::lagrange_points;
use crate::solar_system::{BodyKind, BodySpec, OrbitalLab};
use crate::spaceship::Thruster;

pub const NAMES: &[&str] = &["sun_earth", "inner_planets", "binary", "trojans", "transfer"];

const SUN_MASS: f64 = 1000.0;

fn sun() -> BodySpec {
    BodySpec::new("Sun", BodyKind::Star, SUN_MASS, 20.0).fixed()
}

pub(crate) fn build(lab: &mut OrbitalLab, name: &str) -> Result<()> {
    let g = lab.g();
    let planet = |name: &str, mass: f64, radius: f64, distance: f64, angle: f64| {
        BodySpec::new(name, BodyKind::Planet, mass, radius).at_orbit(g, SUN_MASS, Vec2::ZERO, distance, angle)
    };

    match name {
        "sun_earth" => {
            lab.add_entity(sun())?;
            lab.add_entity(planet("Earth", 1.0, 5.0, 200.0, 0.0))?;
        }
        "inner_planets" => {
            lab.add_entity(sun())?;
            lab.add_entity(planet("Mercury", 0.05, 2.0, 80.0, 0.0))?;
            lab.add_entity(planet("Venus", 0.8, 4.5, 140.0, 0.5 * PI))?;
            lab.add_entity(planet("Earth", 1.0, 5.0, 200.0, PI))?;
            lab.add_entity(planet("Mars", 0.1, 3.0, 300.0, 1.5 * PI))?;
        }
        // Equal stars circling their common centre
        "binary" => {
            let (m, sep) = (500.0, 200.0);
            let v = m * (g / (2.0 * m * sep)).sqrt();
            lab.add_entity(
                BodySpec::new("Alpha", BodyKind::Star, m, 12.0)
                    .at(Vec2::new(-sep / 2.0, 0.0))
                    .moving(Vec2::new(0.0, -v)),
            )?;
            lab.add_entity(
                BodySpec::new("Beta", BodyKind::Star, m, 12.0)
                    .at(Vec2::new(sep / 2.0, 0.0))
                    .moving(Vec2::new(0.0, v)),
            )?;
        }
        // Asteroids co-rotating with Jupiter at its L4 and L5 points
        "trojans" => {
            let jupiter = planet("Jupiter", 10.0, 8.0, 250.0, 0.0);
            let omega = jupiter.velocity.length() / 250.0;
            let [_, _, _, l4, l5] = lagrange_points(SUN_MASS, Vec2::ZERO, jupiter.mass, jupiter.position)
                .ok_or_else(|| SimError::invalid("preset", name, "degenerate Lagrange geometry"))?;
            lab.add_entity(sun())?;
            lab.add_entity(jupiter)?;
            for (label, point) in [("Achilles", l4), ("Patroclus", l5)] {
                lab.add_entity(
                    BodySpec::new(label, BodyKind::Asteroid, 0.001, 1.5)
                        .at(point)
                        .moving(point.perp() * omega),
                )?;
            }
        }
        // A craft starting a burn along its initial direction of motion, with Mars further out
        "transfer" => {
            lab.add_entity(sun())?;
            lab.add_entity(planet("Earth", 1.0, 5.0, 150.0, PI))?;
            lab.add_entity(planet("Mars", 0.1, 3.0, 300.0, 0.75 * PI))?;
            let thruster = Thruster::new(10.0, 1.0, 0.002).with_throttle(1.0)?.with_heading(FRAC_PI_2);
            lab.add_entity(
                BodySpec::new("Voyager", BodyKind::Spacecraft, 0.01, 1.0)
                    .at_orbit(g, SUN_MASS, Vec2::ZERO, 160.0, 0.0)
                    .with_thruster(thruster),
            )?;
        }
        _ => return Err(SimError::UnknownPreset(name.to_string())),
    }
    Ok(())
}
