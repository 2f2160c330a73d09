//! Force models shared by the labs
//!
//! Free functions cover the individual laws (gravity, Hooke springs, damping,
//! driving, rotational torque). `ForceField` terms collected in a `ForceSet`
//! turn the point-mass laws into per-point accelerations.

use serde::{Deserialize, Serialize};

use crate::error::Degeneracy;
use crate::integrator::Kinematic;
use crate::vector::{unit_between, Vec2};

/// Separations below this floor produce no gravitational force
pub const MIN_SEPARATION: f64 = 1.0;

/// Newtonian gravity on body 1 due to body 2: `F = G*m1*m2/r²` toward body 2.
///
/// Returns zero when the bodies are closer than `min_separation`.
pub fn gravity_force(g: f64, m1: f64, p1: Vec2, m2: f64, p2: Vec2, min_separation: f64) -> Vec2 {
    let r = p2 - p1;
    let dist = r.length();
    if dist < min_separation.max(f64::EPSILON) {
        return Vec2::ZERO;
    }
    let force_mag = g * m1 * m2 / (dist * dist);
    r / dist * force_mag
}

/// Gravitational potential energy of a pair, with the same separation floor
pub fn gravity_potential(g: f64, m1: f64, m2: f64, dist: f64, min_separation: f64) -> f64 {
    -g * m1 * m2 / dist.max(min_separation.max(f64::EPSILON))
}

/// Hooke spring force on the endpoint at `p2`: `F = -k*(|p2 - p1| - L0)` along the axis.
/// The endpoint at `p1` feels the opposite force.
pub fn spring_force(k: f64, rest_length: f64, p1: Vec2, p2: Vec2) -> Vec2 {
    match unit_between(p1, p2) {
        Some(axis) => {
            let extension = (p2 - p1).length() - rest_length;
            axis * (-k * extension)
        }
        None => Vec2::ZERO,
    }
}

/// Elastic energy stored in a spring
pub fn spring_potential(k: f64, rest_length: f64, p1: Vec2, p2: Vec2) -> f64 {
    let extension = (p2 - p1).length() - rest_length;
    0.5 * k * extension * extension
}

/// Damping along the spring axis on the endpoint at `p2`, from its velocity
/// relative to the other endpoint
pub fn spring_damping(b: f64, p1: Vec2, p2: Vec2, relative_velocity: Vec2) -> Vec2 {
    match unit_between(p1, p2) {
        Some(axis) => axis * (-b * relative_velocity.dot(axis)),
        None => Vec2::ZERO,
    }
}

/// Which side of the attached mass a wall anchor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    Left,
    Right,
}

/// Wall anchor for a spring whose other end rests at `equilibrium`:
/// `equilibrium - L0` for a left wall, `equilibrium + L0` for a right wall
pub fn wall_anchor(equilibrium: Vec2, rest_length: f64, side: WallSide) -> Vec2 {
    match side {
        WallSide::Left => equilibrium - Vec2::X * rest_length,
        WallSide::Right => equilibrium + Vec2::X * rest_length,
    }
}

/// Viscous damping `F = -b*v`
#[inline]
pub fn damping_force(b: f64, velocity: Vec2) -> Vec2 {
    velocity * -b
}

/// Periodic driving force `F = A*cos(ω*t)`
#[inline]
pub fn driving_force(amplitude: f64, omega: f64, t: f64) -> f64 {
    amplitude * (omega * t).cos()
}

/// Rotational friction `τ = -friction*ω*k`
#[inline]
pub fn friction_torque(friction: f64, omega: f64, k: f64) -> f64 {
    -friction * omega * k
}

/// Applied torque plus friction
#[inline]
pub fn net_torque(applied: f64, friction: f64, omega: f64, k: f64) -> f64 {
    applied + friction_torque(friction, omega, k)
}

/// `α = τ/I`, refusing to divide by a non-positive moment of inertia
pub fn angular_acceleration(torque: f64, inertia: f64) -> Result<f64, Degeneracy> {
    if inertia > 0.0 && inertia.is_finite() {
        Ok(torque / inertia)
    } else {
        Err(Degeneracy::ZeroInertia)
    }
}

/// `a = F/m`, refusing to divide by a non-positive mass
pub fn linear_acceleration(force: Vec2, mass: f64) -> Result<Vec2, Degeneracy> {
    if mass > 0.0 && mass.is_finite() {
        Ok(force / mass)
    } else {
        Err(Degeneracy::ZeroMass)
    }
}

/// An acceleration source operating on a batch of point masses.
/// Implementations add their contribution into `out[i]` for each point.
pub trait ForceField {
    fn accumulate(&self, t: f64, points: &[Kinematic<Vec2>], masses: &[f64], out: &mut [Vec2]);
}

/// Collection of acceleration terms whose contributions are summed per point
#[derive(Default)]
pub struct ForceSet {
    terms: Vec<Box<dyn ForceField + Send + Sync>>,
}

impl ForceSet {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceField + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total acceleration at time `t` for every point
    pub fn accelerations(&self, t: f64, points: &[Kinematic<Vec2>], masses: &[f64]) -> Vec<Vec2> {
        let mut out = vec![Vec2::ZERO; points.len()];
        for term in &self.terms {
            term.accumulate(t, points, masses, &mut out);
        }
        out
    }
}

/// Constant field such as surface gravity
#[derive(Debug, Clone, Copy)]
pub struct UniformGravity {
    pub g: Vec2,
}

impl ForceField for UniformGravity {
    fn accumulate(&self, _t: f64, _points: &[Kinematic<Vec2>], masses: &[f64], out: &mut [Vec2]) {
        for (a, m) in out.iter_mut().zip(masses) {
            if *m > 0.0 {
                *a += self.g;
            }
        }
    }
}

/// Linear air drag `F = -b*v`
#[derive(Debug, Clone, Copy)]
pub struct LinearDrag {
    pub b: f64,
}

impl ForceField for LinearDrag {
    fn accumulate(&self, _t: f64, points: &[Kinematic<Vec2>], masses: &[f64], out: &mut [Vec2]) {
        for ((a, p), m) in out.iter_mut().zip(points).zip(masses) {
            if let Ok(acc) = linear_acceleration(damping_force(self.b, p.velocity), *m) {
                *a += acc;
            }
        }
    }
}

/// Direct all-pairs Newtonian gravity
#[derive(Debug, Clone, Copy)]
pub struct PairwiseGravity {
    pub g: f64,
    pub min_separation: f64,
}

impl ForceField for PairwiseGravity {
    fn accumulate(&self, _t: f64, points: &[Kinematic<Vec2>], masses: &[f64], out: &mut [Vec2]) {
        let n = points.len();
        for i in 0..n {
            for j in (i + 1)..n {
                // Unit masses give the pull per unit mass of each body
                let pull = gravity_force(
                    self.g,
                    1.0,
                    points[i].position,
                    1.0,
                    points[j].position,
                    self.min_separation,
                );
                out[i] += pull * masses[j];
                out[j] -= pull * masses[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gravity_obeys_inverse_square() {
        let f1 = gravity_force(1.0, 2.0, Vec2::ZERO, 3.0, Vec2::new(10.0, 0.0), MIN_SEPARATION);
        let f2 = gravity_force(1.0, 2.0, Vec2::ZERO, 3.0, Vec2::new(20.0, 0.0), MIN_SEPARATION);
        assert_abs_diff_eq!(f1.length() / f2.length(), 4.0, epsilon = 1e-12);
        assert!(f1.x > 0.0, "force should point toward the other body");
    }

    #[test]
    fn gravity_is_zero_inside_separation_floor() {
        let f = gravity_force(1.0, 1.0, Vec2::ZERO, 1.0, Vec2::new(0.5, 0.0), MIN_SEPARATION);
        assert_eq!(f, Vec2::ZERO);
        let coincident = gravity_force(1.0, 1.0, Vec2::ONE, 1.0, Vec2::ONE, 0.0);
        assert_eq!(coincident, Vec2::ZERO);
    }

    #[test]
    fn stretched_spring_pulls_back() {
        let f = spring_force(10.0, 1.0, Vec2::ZERO, Vec2::new(1.5, 0.0));
        assert_abs_diff_eq!(f.x, -5.0, epsilon = 1e-12);
        let compressed = spring_force(10.0, 1.0, Vec2::ZERO, Vec2::new(0.5, 0.0));
        assert_abs_diff_eq!(compressed.x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn wall_anchor_sits_one_rest_length_away() {
        let eq = Vec2::new(5.0, 0.0);
        assert_eq!(wall_anchor(eq, 2.0, WallSide::Left), Vec2::new(3.0, 0.0));
        assert_eq!(wall_anchor(eq, 2.0, WallSide::Right), Vec2::new(7.0, 0.0));
    }

    #[test]
    fn degenerate_inertia_is_reported() {
        assert_eq!(angular_acceleration(1.0, 0.0), Err(Degeneracy::ZeroInertia));
        assert_eq!(linear_acceleration(Vec2::X, -1.0), Err(Degeneracy::ZeroMass));
        assert_eq!(angular_acceleration(4.0, 2.0), Ok(2.0));
    }

    #[test]
    fn friction_opposes_spin() {
        assert!(net_torque(0.0, 0.5, 3.0, 1.0) < 0.0);
        assert!(net_torque(0.0, 0.5, -3.0, 1.0) > 0.0);
        assert_eq!(driving_force(2.0, 0.0, 10.0), 2.0);
    }

    #[test]
    fn pairwise_gravity_conserves_momentum() {
        let points = [
            Kinematic::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Kinematic::new(Vec2::new(10.0, 0.0), Vec2::ZERO),
            Kinematic::new(Vec2::new(3.0, 7.0), Vec2::ZERO),
        ];
        let masses = [2.0, 3.0, 5.0];
        let set = ForceSet::new().with(PairwiseGravity { g: 1.0, min_separation: MIN_SEPARATION });
        let acc = set.accelerations(0.0, &points, &masses);
        let net: Vec2 = acc.iter().zip(masses.iter()).map(|(a, m)| *a * *m).sum();
        assert_abs_diff_eq!(net.length(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn force_set_sums_terms() {
        let points = [Kinematic::new(Vec2::ZERO, Vec2::new(2.0, 0.0))];
        let set = ForceSet::new()
            .with(UniformGravity { g: Vec2::new(0.0, -10.0) })
            .with(LinearDrag { b: 0.5 });
        let acc = set.accelerations(0.0, &points, &[1.0]);
        assert_abs_diff_eq!(acc[0].x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(acc[0].y, -10.0, epsilon = 1e-12);
        assert_eq!(set.len(), 2);
    }
}
