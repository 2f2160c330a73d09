//! Two-body orbit geometry: orbital elements, circular speeds and Lagrange points

use std::f64::consts::PI;

use common::vector::cross;
use common::Vec2;
use serde::Serialize;

/// Orbit of a body about a central mass, derived from one relative state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalElements {
    /// `ε = v²/2 - μ/r`
    pub specific_energy: f64,
    /// `h = r × v`
    pub angular_momentum: f64,
    pub eccentricity: f64,
    pub periapsis: f64,
    /// `None` for unbound orbits
    pub semi_major_axis: Option<f64>,
    pub apoapsis: Option<f64>,
    pub period: Option<f64>,
}

impl OrbitalElements {
    /// Elements of an orbit with gravitational parameter `mu`, from the
    /// position and velocity relative to the central body.
    ///
    /// Returns `None` when `mu` is not positive or the body sits on the centre.
    pub fn from_state(mu: f64, r: Vec2, v: Vec2) -> Option<Self> {
        let dist = r.length();
        if mu <= 0.0 || dist <= 0.0 {
            return None;
        }

        let energy = 0.5 * v.length_squared() - mu / dist;
        let h = cross(r, v);
        let eccentricity = (1.0 + 2.0 * energy * h * h / (mu * mu)).max(0.0).sqrt();
        // Holds for every conic, bound or not
        let periapsis = h * h / (mu * (1.0 + eccentricity));

        let (semi_major_axis, apoapsis, period) = if energy < 0.0 {
            let a = -mu / (2.0 * energy);
            (Some(a), Some(a * (1.0 + eccentricity)), Some(2.0 * PI * (a * a * a / mu).sqrt()))
        } else {
            (None, None, None)
        };

        Some(Self {
            specific_energy: energy,
            angular_momentum: h,
            eccentricity,
            periapsis,
            semi_major_axis,
            apoapsis,
            period,
        })
    }

    pub fn is_bound(&self) -> bool {
        self.semi_major_axis.is_some()
    }
}

/// Speed of a circular orbit of radius `r`: `sqrt(μ/r)`
pub fn circular_speed(mu: f64, r: f64) -> f64 {
    if r > 0.0 && mu > 0.0 {
        (mu / r).sqrt()
    } else {
        0.0
    }
}

/// Escape speed at radius `r`: `sqrt(2μ/r)`
pub fn escape_speed(mu: f64, r: f64) -> f64 {
    circular_speed(2.0 * mu, r)
}

/// Approximate L1 to L5 of a primary/secondary pair.
///
/// L1 and L2 sit a Hill radius `R*(μ/3)^(1/3)` either side of the secondary,
/// L3 opposite it at `R*(1 + 5μ/12)` from the primary, and L4/L5 lead and
/// trail the secondary by 60°. `μ = m2 / (m1 + m2)`.
pub fn lagrange_points(m1: f64, p1: Vec2, m2: f64, p2: Vec2) -> Option<[Vec2; 5]> {
    let offset = p2 - p1;
    let sep = offset.length();
    let total = m1 + m2;
    if sep <= 0.0 || total <= 0.0 {
        return None;
    }

    let mu = m2 / total;
    let u = offset / sep;
    let hill = sep * (mu / 3.0).cbrt();

    let l1 = p2 - u * hill;
    let l2 = p2 + u * hill;
    let l3 = p1 - u * (sep * (1.0 + 5.0 * mu / 12.0));
    let lead = Vec2::new(u.x * 0.5 - u.y * 0.75f64.sqrt(), u.x * 0.75f64.sqrt() + u.y * 0.5);
    let trail = Vec2::new(u.x * 0.5 + u.y * 0.75f64.sqrt(), -u.x * 0.75f64.sqrt() + u.y * 0.5);
    let l4 = p1 + lead * sep;
    let l5 = p1 + trail * sep;

    Some([l1, l2, l3, l4, l5])
}
