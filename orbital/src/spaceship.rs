//! Spacecraft propulsion
//!
//! A thruster pushes its craft along a heading at `throttle * max_thrust / m`
//! while fuel remains. Fuel drains at `burn_rate * throttle` per second.

use common::vector::from_angle;
use common::{Result, SimError, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thruster {
    /// Remaining fuel, in arbitrary units
    pub fuel: f64,
    /// Fuel used per second at full throttle
    pub burn_rate: f64,
    /// Force at full throttle
    pub max_thrust: f64,
    /// Fraction of max thrust, in `[0, 1]`
    throttle: f64,
    /// Thrust direction in radians, counter-clockwise from +x
    pub heading: f64,
}

impl Thruster {
    pub fn new(fuel: f64, burn_rate: f64, max_thrust: f64) -> Self {
        Self {
            fuel,
            burn_rate,
            max_thrust,
            throttle: 0.0,
            heading: 0.0,
        }
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn set_throttle(&mut self, throttle: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&throttle) {
            return Err(SimError::invalid("throttle", throttle, "must lie in [0, 1]"));
        }
        self.throttle = throttle;
        Ok(())
    }

    pub fn with_throttle(mut self, throttle: f64) -> Result<Self> {
        self.set_throttle(throttle)?;
        Ok(self)
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    pub fn is_firing(&self) -> bool {
        self.throttle > 0.0 && self.fuel > 0.0
    }

    /// Thrust acceleration on a craft of mass `mass`
    pub fn acceleration(&self, mass: f64) -> Vec2 {
        if !self.is_firing() || mass <= 0.0 {
            return Vec2::ZERO;
        }
        from_angle(self.heading) * (self.throttle * self.max_thrust / mass)
    }

    /// Consume fuel for `dt` seconds of firing
    pub fn burn(&mut self, dt: f64) {
        if self.is_firing() {
            self.fuel = (self.fuel - self.burn_rate * self.throttle * dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn thrust_points_along_heading() {
        let t = Thruster::new(10.0, 1.0, 4.0)
            .with_throttle(0.5)
            .unwrap()
            .with_heading(std::f64::consts::FRAC_PI_2);
        let a = t.acceleration(2.0);
        assert_abs_diff_eq!(a.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_tank_means_no_thrust() {
        let mut t = Thruster::new(1.0, 2.0, 4.0).with_throttle(1.0).unwrap();
        t.burn(0.25);
        assert_abs_diff_eq!(t.fuel, 0.5, epsilon = 1e-12);
        t.burn(10.0);
        assert_eq!(t.fuel, 0.0);
        assert_eq!(t.acceleration(1.0), Vec2::ZERO);
    }

    #[test]
    fn throttle_is_bounded() {
        let mut t = Thruster::new(1.0, 1.0, 1.0);
        assert!(t.set_throttle(1.5).is_err());
        assert!(t.set_throttle(-0.1).is_err());
        assert_eq!(t.throttle(), 0.0);
    }
}
