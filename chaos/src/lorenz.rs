//! Lorenz attractor
//!
//! `dx = σ(y - x)`, `dy = x(ρ - z) - y`, `dz = xy - βz`

use common::integrator::rk4;
use common::{Trail, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for LorenzParams {
    /// The classic chaotic parameters
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

pub fn derivatives(p: &LorenzParams, s: Vec3) -> Vec3 {
    Vec3::new(p.sigma * (s.y - s.x), s.x * (p.rho - s.z) - s.y, s.x * s.y - p.beta * s.z)
}

/// One point following the Lorenz flow
#[derive(Debug, Clone)]
pub struct LorenzTracer {
    pub state: Vec3,
    /// Recent states projected onto the x-z plane
    pub trail: Trail,
}

impl LorenzTracer {
    pub fn new(state: Vec3, trail_length: usize) -> Self {
        Self {
            state,
            trail: Trail::new(trail_length),
        }
    }

    pub fn advance(&mut self, params: &LorenzParams, h: f64) {
        self.state = rk4(&self.state, 0.0, h, |_, s| derivatives(params, *s));
        self.trail.push(Vec2::new(self.state.x, self.state.z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_is_a_fixed_point() {
        let d = derivatives(&LorenzParams::default(), Vec3::ZERO);
        assert_eq!(d, Vec3::ZERO);
    }

    #[test]
    fn off_origin_fixed_points() {
        let p = LorenzParams::default();
        let c = (p.beta * (p.rho - 1.0)).sqrt();
        let d = derivatives(&p, Vec3::new(c, c, p.rho - 1.0));
        assert_abs_diff_eq!(d.length(), 0.0, epsilon = 1e-9);
    }
}
