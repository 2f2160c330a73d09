//! Named starting scenes for the oscillations lab

use common::forces::{wall_anchor, WallSide};
use common::{EntityId, Lab, Result, SimError, Vec2};

use crate::physics::{natural_frequency, DampingType, Drive, ElementSpec, Endpoint, MassSpec, OscillationsLab, Spring};

pub const NAMES: &[&str] = &["single_spring", "coupled_pair", "damped", "critical", "resonance", "chain"];

const Y: f64 = 300.0;
const STIFFNESS: f64 = 20.0;
const REST: f64 = 150.0;

pub(crate) fn build(lab: &mut OscillationsLab, name: &str) -> Result<()> {
    match name {
        "single_spring" => single_spring(lab, 50.0).map(|_| ()),
        "coupled_pair" => coupled_pair(lab),
        "damped" => {
            lab.set_damping(DampingType::Light);
            single_spring(lab, 80.0).map(|_| ())
        }
        "critical" => {
            lab.set_damping(DampingType::Critical);
            single_spring(lab, 80.0).map(|_| ())
        }
        "resonance" => resonance(lab),
        "chain" => chain(lab, 5),
        _ => Err(SimError::UnknownPreset(name.to_string())),
    }
}

fn mass(lab: &mut OscillationsLab, spec: MassSpec) -> Result<EntityId> {
    lab.add_entity(ElementSpec::Mass(spec))
}

fn spring(lab: &mut OscillationsLab, a: Endpoint, b: Endpoint, k: f64, rest: f64) -> Result<EntityId> {
    lab.add_entity(ElementSpec::Spring(Spring::new(a, b, k, rest)))
}

/// One mass on a spring from the left wall, pulled `offset` past equilibrium
fn single_spring(lab: &mut OscillationsLab, offset: f64) -> Result<EntityId> {
    let equilibrium = Vec2::new(400.0, Y);
    let m = mass(lab, MassSpec::at(equilibrium + Vec2::X * offset, 1.0))?;
    let anchor = wall_anchor(equilibrium, REST, WallSide::Left);
    spring(lab, Endpoint::Wall(anchor), Endpoint::Entity(m), STIFFNESS, REST)?;
    Ok(m)
}

/// wall - m - m - wall, first mass displaced
fn coupled_pair(lab: &mut OscillationsLab) -> Result<()> {
    let eq1 = Vec2::new(300.0, Y);
    let eq2 = Vec2::new(500.0, Y);
    let rest = 200.0;
    let m1 = mass(lab, MassSpec::at(eq1 + Vec2::X * 40.0, 1.0))?;
    let m2 = mass(lab, MassSpec::at(eq2, 1.0))?;
    spring(lab, Endpoint::Wall(wall_anchor(eq1, rest, WallSide::Left)), Endpoint::Entity(m1), 15.0, rest)?;
    spring(lab, Endpoint::Entity(m1), Endpoint::Entity(m2), 15.0, rest)?;
    spring(lab, Endpoint::Entity(m2), Endpoint::Wall(wall_anchor(eq2, rest, WallSide::Right)), 15.0, rest)?;
    Ok(())
}

/// Lightly damped mass driven at its natural frequency, starting at rest
fn resonance(lab: &mut OscillationsLab) -> Result<()> {
    let m = 1.0;
    let equilibrium = Vec2::new(400.0, Y);
    let id = mass(lab, MassSpec::at(equilibrium, m).driven())?;
    spring(
        lab,
        Endpoint::Wall(wall_anchor(equilibrium, REST, WallSide::Left)),
        Endpoint::Entity(id),
        STIFFNESS,
        REST,
    )?;
    lab.set_damping(DampingType::Light);
    lab.set_drive(Drive {
        amplitude: 40.0,
        frequency: natural_frequency(STIFFNESS, m),
    });
    Ok(())
}

/// `n` masses strung between two walls, the first one displaced
fn chain(lab: &mut OscillationsLab, n: usize) -> Result<()> {
    let spacing = 100.0;
    let start = 150.0;
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let eq = Vec2::new(start + spacing * i as f64, Y);
        let offset = if i == 0 { 30.0 } else { 0.0 };
        ids.push(mass(lab, MassSpec::at(eq + Vec2::X * offset, 1.0))?);
    }

    let first_eq = Vec2::new(start, Y);
    let last_eq = Vec2::new(start + spacing * (n as f64 - 1.0), Y);
    let mut prev = Endpoint::Wall(wall_anchor(first_eq, spacing, WallSide::Left));
    for id in &ids {
        spring(lab, prev, Endpoint::Entity(*id), STIFFNESS, spacing)?;
        prev = Endpoint::Entity(*id);
    }
    spring(lab, prev, Endpoint::Wall(wall_anchor(last_eq, spacing, WallSide::Right)), STIFFNESS, spacing)?;
    Ok(())
}
