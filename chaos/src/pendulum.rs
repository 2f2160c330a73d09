//! Double pendulum
//!
//! Two point bobs on massless rods hanging from a fixed pivot. Angles are
//! measured from the downward vertical, and the state `[θ1, θ2, ω1, ω2]` is
//! advanced with RK4 using the closed-form Lagrangian accelerations.

use common::integrator::rk4;
use common::{Trail, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumParams {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
    pub g: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 1.0,
            g: common::constants::STANDARD_GRAVITY,
        }
    }
}

/// `d/dt [θ1, θ2, ω1, ω2]`
pub fn derivatives(p: &PendulumParams, s: &[f64; 4]) -> [f64; 4] {
    let [th1, th2, w1, w2] = *s;
    let PendulumParams { m1, m2, l1, l2, g } = *p;

    let delta = th1 - th2;
    let den = 2.0 * m1 + m2 - m2 * (2.0 * delta).cos();

    let a1 = (-g * (2.0 * m1 + m2) * th1.sin()
        - m2 * g * (th1 - 2.0 * th2).sin()
        - 2.0 * delta.sin() * m2 * (w2 * w2 * l2 + w1 * w1 * l1 * delta.cos()))
        / (l1 * den);

    let a2 = (2.0
        * delta.sin()
        * (w1 * w1 * l1 * (m1 + m2) + g * (m1 + m2) * th1.cos() + w2 * w2 * l2 * m2 * delta.cos()))
        / (l2 * den);

    [w1, w2, a1, a2]
}

/// Kinetic, potential and total energy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyAudit {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct DoublePendulum {
    pub params: PendulumParams,
    /// `[θ1, θ2, ω1, ω2]`
    pub state: [f64; 4],
    pub trail: Trail,
}

impl DoublePendulum {
    pub fn new(params: PendulumParams, theta1: f64, theta2: f64, trail_length: usize) -> Self {
        Self {
            params,
            state: [theta1, theta2, 0.0, 0.0],
            trail: Trail::new(trail_length),
        }
    }

    /// One RK4 step of size `h`
    pub fn advance(&mut self, h: f64) {
        let params = self.params;
        self.state = rk4(&self.state, 0.0, h, |_, s| derivatives(&params, s));
        let (_, bob2) = self.bob_positions();
        self.trail.push(bob2);
    }

    /// Bob positions relative to the pivot, y up
    pub fn bob_positions(&self) -> (Vec2, Vec2) {
        let [th1, th2, _, _] = self.state;
        let p1 = Vec2::new(th1.sin(), -th1.cos()) * self.params.l1;
        let p2 = p1 + Vec2::new(th2.sin(), -th2.cos()) * self.params.l2;
        (p1, p2)
    }

    pub fn bob_velocities(&self) -> (Vec2, Vec2) {
        let [th1, th2, w1, w2] = self.state;
        let v1 = Vec2::new(th1.cos(), th1.sin()) * (self.params.l1 * w1);
        let v2 = v1 + Vec2::new(th2.cos(), th2.sin()) * (self.params.l2 * w2);
        (v1, v2)
    }

    pub fn energy(&self) -> EnergyAudit {
        let PendulumParams { m1, m2, g, .. } = self.params;
        let (p1, p2) = self.bob_positions();
        let (v1, v2) = self.bob_velocities();
        let kinetic = 0.5 * m1 * v1.length_squared() + 0.5 * m2 * v2.length_squared();
        let potential = m1 * g * p1.y + m2 * g * p2.y;
        EnergyAudit {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    /// `Σ m (r × v)` about the pivot
    pub fn angular_momentum(&self) -> f64 {
        let (p1, p2) = self.bob_positions();
        let (v1, v2) = self.bob_velocities();
        self.params.m1 * p1.perp_dot(v1) + self.params.m2 * p2.perp_dot(v2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hanging_straight_down_is_at_rest() {
        let d = derivatives(&PendulumParams::default(), &[0.0, 0.0, 0.0, 0.0]);
        for v in d {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn small_swing_matches_linear_frequency_of_first_mode() {
        // Light lower bob: the upper rod swings like a simple pendulum
        let params = PendulumParams {
            m2: 1e-6,
            ..PendulumParams::default()
        };
        let d = derivatives(&params, &[0.01, 0.01, 0.0, 0.0]);
        assert_abs_diff_eq!(d[2], -params.g * 0.01, epsilon = 1e-5);
    }

    #[test]
    fn bob_geometry() {
        let mut p = DoublePendulum::new(PendulumParams::default(), std::f64::consts::FRAC_PI_2, 0.0, 10);
        let (b1, b2) = p.bob_positions();
        assert_abs_diff_eq!(b1.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b1.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b2.y, -1.0, epsilon = 1e-12);

        p.state[2] = 2.0;
        let energy = p.energy();
        // Only bob 1 height counts against zero; both bobs move at 2 m/s
        assert_abs_diff_eq!(energy.kinetic, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(energy.potential, -common::constants::STANDARD_GRAVITY, epsilon = 1e-12);
    }
}
