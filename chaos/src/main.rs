//! Headless chaos runner
//!
//! With a two-system preset, logs how far the pair has drifted apart each
//! simulated second.

use anyhow::{Context, Result};
use chaos::ChaosLab;
use clap::Parser;
use common::{init_logging, log_report, Lab, SimConfig};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "chaos", about = "Run a chaos preset without a window")]
struct Args {
    /// YAML file with simulation settings
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value = "lorenz_pair")]
    preset: String,

    #[arg(short, long, default_value_t = 1800)]
    frames: usize,

    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => SimConfig::default(),
    };

    let mut lab = ChaosLab::with_config(config);
    let snapshot = lab
        .load_preset(&args.preset)
        .with_context(|| format!("available presets: {}", lab.presets().join(", ")))?;
    let pair = match snapshot.entities.as_slice() {
        [(a, _), (b, _), ..] => Some((*a, *b)),
        _ => None,
    };

    let per_second = ((1.0 / args.dt).round() as usize).max(1);
    for frame in 1..=args.frames {
        let snapshot = lab.step(args.dt);
        if frame % per_second != 0 {
            continue;
        }
        match pair {
            Some((a, b)) => info!("t={:.2}: separation {:.6e}", snapshot.time, lab.separation(a, b)?),
            None => info!("t={:.2}", snapshot.time),
        }
    }

    log_report("final", &lab.query_invariants());
    Ok(())
}
