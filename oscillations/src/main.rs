//! Headless spring-mass runner
//!
//! ```text
//! oscillations --preset resonance --frames 1200
//! oscillations --preset single_spring --integrator semi_implicit_euler
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use common::{init_logging, log_report, run_frames, Lab, ParamValue, SimConfig, Target};
use log::info;
use oscillations::OscillationsLab;

#[derive(Parser, Debug)]
#[command(name = "oscillations", about = "Run a spring-mass preset without a window")]
struct Args {
    /// YAML file with simulation settings
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value = "single_spring")]
    preset: String,

    #[arg(short, long, default_value_t = 600)]
    frames: usize,

    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// none, light, critical or heavy
    #[arg(long)]
    damping: Option<String>,

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

    let mut lab = OscillationsLab::with_config(config);
    lab.load_preset(&args.preset)
        .with_context(|| format!("available presets: {}", lab.presets().join(", ")))?;

    if let Some(damping) = &args.damping {
        lab.set_parameter(Target::Global, "damping", ParamValue::from(damping.as_str()))?;
    }
    if let Some(method) = &args.integrator {
        lab.set_parameter(Target::Global, "integrator", ParamValue::from(method.as_str()))?;
    }

    for (id, _) in lab.springs() {
        info!("spring {} natural frequency {:.3} rad/s", id, lab.spring_frequency(id)?);
    }

    let report = run_frames(&mut lab, args.frames, args.dt);
    log_report("final", &report);
    Ok(())
}
