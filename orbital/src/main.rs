//! Headless orbital runner
//!
//! Loads a preset, runs it for a number of frames and logs the orbit of
//! every body around the first fixed one.

use anyhow::{Context, Result};
use clap::Parser;
use common::{init_logging, log_report, run_frames, Lab, ParamValue, SimConfig, Target};
use log::info;
use orbital::OrbitalLab;

#[derive(Parser, Debug)]
#[command(name = "orbital", about = "Run an orbital preset without a window")]
struct Args {
    /// YAML file with simulation settings
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, default_value = "inner_planets")]
    preset: String,

    #[arg(short, long, default_value_t = 3600)]
    frames: usize,

    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Simulated seconds per frame second
    #[arg(long)]
    speed: Option<f64>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => SimConfig::default(),
    };

    let mut lab = OrbitalLab::with_config(config);
    lab.load_preset(&args.preset)
        .with_context(|| format!("available presets: {}", lab.presets().join(", ")))?;
    if let Some(speed) = args.speed {
        lab.set_parameter(Target::Global, "time_scale", ParamValue::Number(speed))
            .context("setting time scale")?;
    }

    let report = run_frames(&mut lab, args.frames, args.dt);

    let centre = lab.bodies().find(|(_, b)| b.is_fixed).map(|(id, _)| id);
    if let Some(centre) = centre {
        let ids: Vec<_> = lab.bodies().filter(|(id, _)| *id != centre).map(|(id, b)| (id, b.name.clone())).collect();
        for (id, name) in ids {
            match lab.elements(id, centre)? {
                Some(el) => info!(
                    "{}: e={:.4} periapsis={:.2} a={:?} period={:?}",
                    name, el.eccentricity, el.periapsis, el.semi_major_axis, el.period
                ),
                None => info!("{}: no orbit", name),
            }
        }
    }

    log_report("final", &report);
    Ok(())
}
