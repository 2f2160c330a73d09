//! Headless rotor runner

use anyhow::{Context, Result};
use clap::Parser;
use common::{init_logging, log_report, run_frames, Lab, SimConfig, Target};
use log::info;
use rotation::RotationLab;

#[derive(Parser, Debug)]
#[command(name = "rotation", about = "Run a rotor preset without a window")]
struct Args {
    /// YAML file with simulation settings
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value = "disk")]
    preset: String,

    #[arg(short, long, default_value_t = 600)]
    frames: usize,

    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Override the friction coefficient
    #[arg(long)]
    friction: Option<f64>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => SimConfig::default(),
    };

    let mut lab = RotationLab::with_config(config);
    lab.load_preset(&args.preset)
        .with_context(|| format!("available presets: {}", lab.presets().join(", ")))?;
    if let Some(friction) = args.friction {
        lab.set_parameter(Target::Global, "friction", friction.into())?;
    }

    let report = run_frames(&mut lab, args.frames, args.dt);
    for (id, rotor) in lab.snapshot().entities {
        info!(
            "rotor {} {:?}: I = {:.3}, ω = {:.4} rad/s, angle = {:.3}",
            id,
            rotor.shape(),
            rotor.inertia(),
            rotor.omega,
            rotor.angle
        );
    }
    log_report("final", &report);
    Ok(())
}
