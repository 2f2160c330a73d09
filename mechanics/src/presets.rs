//! Named starting scenes for the mechanics lab

use common::{CollisionKind, Lab, Result, SimError, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::physics::{BallSpec, MechanicsLab, HEIGHT, WIDTH};

pub const NAMES: &[&str] = &["head_on", "unequal_masses", "glancing", "newtons_cradle", "gas", "bouncing"];

const GAS_SEED: u64 = 7;

pub(crate) fn build(lab: &mut MechanicsLab, name: &str) -> Result<()> {
    match name {
        "head_on" => head_on(lab),
        "unequal_masses" => unequal_masses(lab),
        "glancing" => glancing(lab),
        "newtons_cradle" => newtons_cradle(lab),
        "gas" => gas(lab),
        "bouncing" => bouncing(lab),
        _ => Err(SimError::UnknownPreset(name.to_string())),
    }
}

/// Two equal balls approaching each other along x
fn head_on(lab: &mut MechanicsLab) -> Result<()> {
    let y = HEIGHT / 2.0;
    lab.add_entity(BallSpec::new(Vec2::new(300.0, y), Vec2::new(50.0, 0.0), 1.0, 30.0))?;
    lab.add_entity(BallSpec::new(Vec2::new(500.0, y), Vec2::new(-50.0, 0.0), 1.0, 30.0))?;
    Ok(())
}

/// A light ball striking a heavy one at rest
fn unequal_masses(lab: &mut MechanicsLab) -> Result<()> {
    let y = HEIGHT / 2.0;
    lab.add_entity(BallSpec::new(Vec2::new(200.0, y), Vec2::new(120.0, 0.0), 1.0, 20.0))?;
    lab.add_entity(BallSpec::new(Vec2::new(450.0, y), Vec2::ZERO, 4.0, 40.0))?;
    Ok(())
}

/// Off-centre hit, so the balls leave at an angle
fn glancing(lab: &mut MechanicsLab) -> Result<()> {
    let y = HEIGHT / 2.0;
    lab.add_entity(BallSpec::new(Vec2::new(200.0, y + 25.0), Vec2::new(100.0, 0.0), 1.0, 25.0))?;
    lab.add_entity(BallSpec::new(Vec2::new(450.0, y), Vec2::ZERO, 1.0, 25.0))?;
    Ok(())
}

/// A row of resting balls with a small gap, struck from the left
fn newtons_cradle(lab: &mut MechanicsLab) -> Result<()> {
    let y = HEIGHT / 2.0;
    let radius = 20.0;
    let spacing = 2.0 * radius + 1.0;
    lab.add_entity(BallSpec::new(Vec2::new(150.0, y), Vec2::new(150.0, 0.0), 1.0, radius))?;
    for i in 0..5 {
        let x = 350.0 + spacing * i as f64;
        lab.add_entity(BallSpec::new(Vec2::new(x, y), Vec2::ZERO, 1.0, radius))?;
    }
    Ok(())
}

/// Many small balls on a grid with random velocities (fixed seed)
fn gas(lab: &mut MechanicsLab) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(GAS_SEED);
    let (cols, rows) = (6, 4);
    let dx = WIDTH / (cols as f64 + 1.0);
    let dy = HEIGHT / (rows as f64 + 1.0);

    for row in 0..rows {
        for col in 0..cols {
            let position = Vec2::new(dx * (col as f64 + 1.0), dy * (row as f64 + 1.0));
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let speed = rng.gen_range(40.0..160.0);
            let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
            let mass = rng.gen_range(0.5..2.0);
            lab.add_entity(BallSpec::new(position, velocity, mass, 12.0 * mass.sqrt()))?;
        }
    }
    Ok(())
}

/// Balls dropped under gravity onto a lossy floor
fn bouncing(lab: &mut MechanicsLab) -> Result<()> {
    lab.set_gravity(300.0);
    lab.set_wall_restitution(0.8);
    lab.set_collision_kind(CollisionKind::Inelastic { restitution: 0.8 });
    for i in 0..4 {
        let x = 150.0 + 150.0 * i as f64;
        let y = 350.0 + 60.0 * i as f64;
        lab.add_entity(BallSpec::new(Vec2::new(x, y), Vec2::new(20.0 * i as f64, 0.0), 1.0, 20.0))?;
    }
    Ok(())
}
