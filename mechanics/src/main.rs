//! Headless collision runner
//!
//! Loads a preset, steps it at a fixed frame rate and logs how well
//! momentum and energy hold up.
//!
//! ```text
//! mechanics --preset gas --frames 600 --collision inelastic
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use common::{init_logging, log_report, run_frames, Lab, ParamValue, SimConfig, Target};
use log::info;
use mechanics::MechanicsLab;

#[derive(Parser, Debug)]
#[command(name = "mechanics", about = "Run a collision preset without a window")]
struct Args {
    /// YAML file with simulation settings
    #[arg(short, long)]
    config: Option<String>,

    /// Preset to load
    #[arg(short, long, default_value = "head_on")]
    preset: String,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: usize,

    /// Frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// elastic, inelastic or perfectly_inelastic
    #[arg(long)]
    collision: Option<String>,

    /// semi_implicit_euler or rk4
    #[arg(long)]
    integrator: Option<String>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => SimConfig::default(),
    };

    let mut lab = MechanicsLab::with_config(config);
    lab.load_preset(&args.preset)
        .with_context(|| format!("available presets: {}", lab.presets().join(", ")))?;

    if let Some(kind) = &args.collision {
        lab.set_parameter(Target::Global, "collision_type", ParamValue::from(kind.as_str()))?;
    }
    if let Some(method) = &args.integrator {
        lab.set_parameter(Target::Global, "integrator", ParamValue::from(method.as_str()))?;
    }

    info!("running `{}` for {} frames", args.preset, args.frames);
    let report = run_frames(&mut lab, args.frames, args.dt);
    log_report("final", &report);
    Ok(())
}
