//! 2D vector helpers shared by every lab
//!
//! All labs simulate in double precision; `Vec2`/`Vec3` are glam's `DVec2`/`DVec3`.

pub use glam::{DVec2 as Vec2, DVec3 as Vec3};

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (b - a).length()
}

/// Unit vector pointing from `from` to `to`, or `None` when the points coincide
pub fn unit_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let r = to - from;
    let len = r.length();
    if len > 0.0 && len.is_finite() {
        Some(r / len)
    } else {
        None
    }
}

/// z-component of the 3D cross product `a × b`
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.perp_dot(b)
}

/// Split `v` into its scalar component along unit normal `n` and the
/// remaining tangential vector
#[inline]
pub fn decompose(v: Vec2, n: Vec2) -> (f64, Vec2) {
    let vn = v.dot(n);
    (vn, v - n * vn)
}

/// Unit vector at `angle` radians from the +x axis
#[inline]
pub fn from_angle(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
