//! Driver-side helpers: logging setup and a clamped frame clock

use std::time::Instant;

use log::info;

use crate::conservation::InvariantReport;
use crate::integrator::clamp_dt;
use crate::lab::Lab;

/// Install `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();
}

/// Measures wall-clock time between frames and clamps it before it reaches a lab
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_dt: f64,
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            last: Instant::now(),
            max_dt,
        }
    }

    /// Clamped seconds since the previous tick
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f64();
        self.last = now;
        clamp_dt(dt, self.max_dt)
    }
}

/// Log one invariant report on a single line
pub fn log_report(label: &str, report: &InvariantReport) {
    let pct = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |p| format!("{p:.3}%"));
    info!(
        "{label}: energy {:.4} ({}), |p| {:.4} ({}), L {:.4} ({})",
        report.current.energy,
        pct(report.energy_ratio),
        report.current.momentum.length(),
        pct(report.momentum_ratio),
        report.current.angular_momentum,
        pct(report.angular_momentum_ratio),
    );
}

/// Drive a lab for `frames` fixed frames, logging invariants once per second of frames
pub fn run_frames<L: Lab>(lab: &mut L, frames: usize, dt: f64) -> InvariantReport {
    let per_second = ((1.0 / dt).round() as usize).max(1);
    for frame in 1..=frames {
        let snapshot = lab.step(dt);
        if frame % per_second == 0 {
            log_report(&format!("t={:.2}", snapshot.time), &lab.query_invariants());
        }
    }
    lab.query_invariants()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_never_exceeds_max() {
        let mut clock = FrameClock::new(0.05);
        std::thread::sleep(std::time::Duration::from_millis(60));
        let dt = clock.tick();
        assert!(dt <= 0.05);
        assert!(dt > 0.0);
    }
}
