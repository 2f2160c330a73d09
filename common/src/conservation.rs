//! Conservation tracking
//!
//! Momentum, energy and angular momentum are recomputed from the current
//! entities whenever they are queried. A tracker freezes the totals at scene
//! load so the current values can be reported as a percentage of the start.
//! Nothing here feeds back into integration.

use serde::{Deserialize, Serialize};

use crate::vector::{cross, Vec2};

/// Relative magnitudes below this are treated as zero when forming ratios
const RATIO_FLOOR: f64 = 1e-12;

/// Totals over every entity of a scene
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConservationSnapshot {
    pub momentum: Vec2,
    pub energy: f64,
    pub angular_momentum: f64,
}

impl ConservationSnapshot {
    /// Linear totals of a set of point masses: `Σ m v`, `Σ ½ m v²`, `Σ m (r × v)` about the origin
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, Vec2, Vec2)>,
    {
        let mut snap = Self::default();
        for (mass, position, velocity) in points {
            snap.momentum += velocity * mass;
            snap.energy += 0.5 * mass * velocity.length_squared();
            snap.angular_momentum += mass * cross(position, velocity);
        }
        snap
    }

    /// Rotational totals of spinning bodies: `Σ ½ I ω²` and `Σ I ω`
    pub fn from_rotors<I>(rotors: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut snap = Self::default();
        for (inertia, omega) in rotors {
            snap.energy += 0.5 * inertia * omega * omega;
            snap.angular_momentum += inertia * omega;
        }
        snap
    }

    /// Same totals with `potential` added to the energy
    pub fn with_potential(mut self, potential: f64) -> Self {
        self.energy += potential;
        self
    }
}

/// Current totals alongside the frozen baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub current: ConservationSnapshot,
    pub initial: Option<ConservationSnapshot>,
    /// `|p| / |p0|` in percent
    pub momentum_ratio: Option<f64>,
    /// `E / E0` in percent
    pub energy_ratio: Option<f64>,
    /// `L / L0` in percent
    pub angular_momentum_ratio: Option<f64>,
}

fn percent(current: f64, initial: f64) -> Option<f64> {
    if initial.abs() > RATIO_FLOOR {
        Some(100.0 * current / initial)
    } else {
        None
    }
}

/// Holds the baseline a scene's invariants are compared against
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservationTracker {
    initial: Option<ConservationSnapshot>,
}

impl ConservationTracker {
    pub fn new() -> Self {
        Self { initial: None }
    }

    /// Freeze `snapshot` as the baseline
    pub fn freeze(&mut self, snapshot: ConservationSnapshot) {
        self.initial = Some(snapshot);
    }

    pub fn clear(&mut self) {
        self.initial = None;
    }

    pub fn initial(&self) -> Option<ConservationSnapshot> {
        self.initial
    }

    pub fn report(&self, current: ConservationSnapshot) -> InvariantReport {
        let (momentum_ratio, energy_ratio, angular_momentum_ratio) = match self.initial {
            Some(initial) => (
                percent(current.momentum.length(), initial.momentum.length()),
                percent(current.energy, initial.energy),
                percent(current.angular_momentum, initial.angular_momentum),
            ),
            None => (None, None, None),
        };

        InvariantReport {
            current,
            initial: self.initial,
            momentum_ratio,
            energy_ratio,
            angular_momentum_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn point_totals() {
        let snap = ConservationSnapshot::from_points([
            (2.0, Vec2::new(1.0, 0.0), Vec2::new(0.0, 3.0)),
            (1.0, Vec2::new(0.0, 0.0), Vec2::new(-4.0, 0.0)),
        ]);
        assert_eq!(snap.momentum, Vec2::new(-4.0, 6.0));
        assert_abs_diff_eq!(snap.energy, 0.5 * 2.0 * 9.0 + 0.5 * 16.0, epsilon = 1e-12);
        assert_abs_diff_eq!(snap.angular_momentum, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn rotor_totals() {
        let snap = ConservationSnapshot::from_rotors([(3.0, 2.0), (1.0, -1.0)]);
        assert_abs_diff_eq!(snap.energy, 6.0 + 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(snap.angular_momentum, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn ratios_against_baseline() {
        let mut tracker = ConservationTracker::new();
        let start = ConservationSnapshot {
            momentum: Vec2::new(3.0, 4.0),
            energy: 10.0,
            angular_momentum: 0.0,
        };
        assert!(tracker.report(start).energy_ratio.is_none());

        tracker.freeze(start);
        let later = ConservationSnapshot {
            momentum: Vec2::new(0.0, 5.0),
            energy: 9.0,
            angular_momentum: 1.0,
        };
        let report = tracker.report(later);
        assert_abs_diff_eq!(report.momentum_ratio.unwrap(), 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.energy_ratio.unwrap(), 90.0, epsilon = 1e-12);
        assert!(report.angular_momentum_ratio.is_none());
    }
}
