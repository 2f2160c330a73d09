//! Circle-circle and wall collisions
//!
//! Each step runs Detect → Resolve → Separate:
//! - detection sweeps discs sorted by their left edge (broad phase) and tests
//!   centre distance against the sum of radii (narrow phase)
//! - resolution decomposes velocities along the line of centres and applies
//!   the 1-D collision formulas to the normal components only
//! - separation pushes overlapping pairs apart by half the penetration each,
//!   so a resting overlap does not re-trigger an impulse next step
//!
//! Resolution is pure: it takes copied records and returns new ones for the
//! caller to commit.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::vector::{decompose, Vec2};

/// How colliding discs exchange momentum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    #[default]
    Elastic,
    /// Restitution `e` in (0, 1)
    Inelastic { restitution: f64 },
    /// Both discs move off together at the centre-of-mass velocity
    PerfectlyInelastic,
}

impl CollisionKind {
    /// Fraction of normal relative velocity retained
    pub fn restitution(&self) -> f64 {
        match self {
            CollisionKind::Elastic => 1.0,
            CollisionKind::Inelastic { restitution } => *restitution,
            CollisionKind::PerfectlyInelastic => 0.0,
        }
    }
}

/// Collision view of a circular body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
}

/// Overlapping pair found by detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: usize,
    pub b: usize,
    /// Unit vector from `a` toward `b`
    pub normal: Vec2,
    pub penetration: f64,
}

/// Axis-aligned box the discs live in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Narrow-phase test for one pair. Coincident centres yield no contact since
/// the collision normal is undefined.
pub fn detect_pair(a: &Disc, b: &Disc) -> Option<(Vec2, f64)> {
    let r = b.position - a.position;
    let dist = r.length();
    let reach = a.radius + b.radius;
    if dist >= reach {
        return None;
    }
    if dist == 0.0 || !dist.is_finite() {
        debug!("skipping contact between coincident discs");
        return None;
    }
    Some((r / dist, reach - dist))
}

/// Find every overlapping pair, ordered by `(a, b)`
pub fn detect_all(discs: &[Disc]) -> Vec<Contact> {
    // Broad phase: sweep and prune on x
    let mut order: Vec<usize> = (0..discs.len()).collect();
    order.sort_by(|&i, &j| {
        let li = discs[i].position.x - discs[i].radius;
        let lj = discs[j].position.x - discs[j].radius;
        li.total_cmp(&lj)
    });

    let mut contacts = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let right_edge = discs[i].position.x + discs[i].radius;
        for &j in &order[k + 1..] {
            if discs[j].position.x - discs[j].radius > right_edge {
                break;
            }
            let (a, b) = if i < j { (i, j) } else { (j, i) };
            if let Some((normal, penetration)) = detect_pair(&discs[a], &discs[b]) {
                contacts.push(Contact { a, b, normal, penetration });
            }
        }
    }
    contacts.sort_by_key(|c| (c.a, c.b));
    contacts
}

/// 1-D collision along the normal with restitution `e`:
/// `v1' = ((m1 - e*m2)*v1 + (1 + e)*m2*v2) / (m1 + m2)` and symmetrically for `v2'`
fn normal_velocities(m1: f64, v1: f64, m2: f64, v2: f64, e: f64) -> (f64, f64) {
    let total = m1 + m2;
    let v1_new = ((m1 - e * m2) * v1 + (1.0 + e) * m2 * v2) / total;
    let v2_new = ((m2 - e * m1) * v2 + (1.0 + e) * m1 * v1) / total;
    (v1_new, v2_new)
}

/// Resolve one contact, returning the new records for `a` and `b`
pub fn resolve_pair(a: &Disc, b: &Disc, normal: Vec2, penetration: f64, kind: CollisionKind) -> (Disc, Disc) {
    let total = a.mass + b.mass;
    if a.mass <= 0.0 || b.mass <= 0.0 || !total.is_finite() {
        debug!("skipping contact with degenerate mass");
        return (*a, *b);
    }

    let (mut a_new, mut b_new) = (*a, *b);

    if let CollisionKind::PerfectlyInelastic = kind {
        let v_cm = (a.velocity * a.mass + b.velocity * b.mass) / total;
        let x_cm = (a.position * a.mass + b.position * b.mass) / total;
        a_new.velocity = v_cm;
        b_new.velocity = v_cm;
        a_new.position = x_cm;
        b_new.position = x_cm;
        return (a_new, b_new);
    }

    let (v1n, v1t) = decompose(a.velocity, normal);
    let (v2n, v2t) = decompose(b.velocity, normal);

    // Only approaching pairs exchange momentum; a separating overlap just gets pushed apart
    if v1n - v2n > 0.0 {
        let (v1n_new, v2n_new) = normal_velocities(a.mass, v1n, b.mass, v2n, kind.restitution());
        a_new.velocity = v1t + normal * v1n_new;
        b_new.velocity = v2t + normal * v2n_new;
    }

    let push = normal * (0.5 * penetration);
    a_new.position -= push;
    b_new.position += push;

    (a_new, b_new)
}

/// Bounce a disc off the walls of `bounds`. Returns `None` when it touches no wall.
pub fn resolve_wall(disc: &Disc, bounds: &Bounds, restitution: f64) -> Option<Disc> {
    let mut out = *disc;
    let mut hit = false;

    let lo = bounds.min + Vec2::splat(disc.radius);
    let hi = bounds.max - Vec2::splat(disc.radius);

    if out.position.x < lo.x {
        out.position.x = lo.x;
        if out.velocity.x < 0.0 {
            out.velocity.x = -out.velocity.x * restitution;
        }
        hit = true;
    } else if out.position.x > hi.x {
        out.position.x = hi.x;
        if out.velocity.x > 0.0 {
            out.velocity.x = -out.velocity.x * restitution;
        }
        hit = true;
    }

    if out.position.y < lo.y {
        out.position.y = lo.y;
        if out.velocity.y < 0.0 {
            out.velocity.y = -out.velocity.y * restitution;
        }
        hit = true;
    } else if out.position.y > hi.y {
        out.position.y = hi.y;
        if out.velocity.y > 0.0 {
            out.velocity.y = -out.velocity.y * restitution;
        }
        hit = true;
    }

    hit.then_some(out)
}

/// Per-scene collision settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    pub kind: CollisionKind,
    pub wall_restitution: f64,
    pub bounds: Option<Bounds>,
}

impl CollisionResolver {
    pub fn new(kind: CollisionKind) -> Self {
        Self {
            kind,
            wall_restitution: 1.0,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_wall_restitution(mut self, restitution: f64) -> Self {
        self.wall_restitution = restitution;
        self
    }

    /// Resolve all pair contacts and then walls, in place. Returns the number
    /// of pair contacts handled.
    ///
    /// Contacts are detected once from the incoming positions and resolved in
    /// `(a, b)` order.
    pub fn resolve(&self, discs: &mut [Disc]) -> usize {
        let contacts = detect_all(discs);
        for c in &contacts {
            // Re-test against current records: an earlier contact may have moved either disc
            let Some((normal, penetration)) = detect_pair(&discs[c.a], &discs[c.b]) else {
                continue;
            };
            let (a, b) = resolve_pair(&discs[c.a], &discs[c.b], normal, penetration, self.kind);
            discs[c.a] = a;
            discs[c.b] = b;
        }

        if let Some(bounds) = &self.bounds {
            for disc in discs.iter_mut() {
                if let Some(bounced) = resolve_wall(disc, bounds, self.wall_restitution) {
                    *disc = bounced;
                }
            }
        }

        contacts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn disc(x: f64, y: f64, vx: f64, vy: f64, mass: f64, radius: f64) -> Disc {
        Disc {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            mass,
            radius,
        }
    }

    #[test]
    fn detects_only_overlaps() {
        let discs = [
            disc(0.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            disc(1.5, 0.0, 0.0, 0.0, 1.0, 1.0),
            disc(10.0, 0.0, 0.0, 0.0, 1.0, 1.0),
        ];
        let contacts = detect_all(&discs);
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].a, contacts[0].b), (0, 1));
        assert_abs_diff_eq!(contacts[0].penetration, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(contacts[0].normal.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn coincident_centres_are_skipped() {
        let a = disc(1.0, 1.0, 1.0, 0.0, 1.0, 1.0);
        assert!(detect_pair(&a, &a).is_none());
    }

    #[test]
    fn tangential_velocity_passes_through() {
        let a = disc(0.0, 0.0, 1.0, 3.0, 1.0, 1.0);
        let b = disc(1.9, 0.0, -1.0, -2.0, 1.0, 1.0);
        let (normal, pen) = detect_pair(&a, &b).unwrap();
        let (a2, b2) = resolve_pair(&a, &b, normal, pen, CollisionKind::Elastic);
        assert_abs_diff_eq!(a2.velocity.y, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b2.velocity.y, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a2.velocity.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b2.velocity.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inelastic_keeps_restitution_fraction_of_relative_speed() {
        let a = disc(0.0, 0.0, 4.0, 0.0, 2.0, 1.0);
        let b = disc(1.9, 0.0, 0.0, 0.0, 1.0, 1.0);
        let (normal, pen) = detect_pair(&a, &b).unwrap();
        let kind = CollisionKind::Inelastic { restitution: 0.5 };
        let (a2, b2) = resolve_pair(&a, &b, normal, pen, kind);
        let separating = b2.velocity.x - a2.velocity.x;
        assert_abs_diff_eq!(separating, 0.5 * 4.0, epsilon = 1e-12);
        let p_before = a.velocity * a.mass + b.velocity * b.mass;
        let p_after = a2.velocity * a2.mass + b2.velocity * b2.mass;
        assert_abs_diff_eq!((p_after - p_before).length(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn separation_removes_overlap() {
        let a = disc(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        let b = disc(1.6, 0.0, -1.0, 0.0, 1.0, 1.0);
        let (normal, pen) = detect_pair(&a, &b).unwrap();
        let (a2, b2) = resolve_pair(&a, &b, normal, pen, CollisionKind::Elastic);
        assert_abs_diff_eq!((b2.position - a2.position).length(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a2.position.x, -0.2, epsilon = 1e-12);
    }

    #[test]
    fn separating_overlap_keeps_velocities() {
        let a = disc(0.0, 0.0, -1.0, 0.0, 1.0, 1.0);
        let b = disc(1.5, 0.0, 1.0, 0.0, 1.0, 1.0);
        let (normal, pen) = detect_pair(&a, &b).unwrap();
        let (a2, b2) = resolve_pair(&a, &b, normal, pen, CollisionKind::Elastic);
        assert_eq!(a2.velocity, a.velocity);
        assert_eq!(b2.velocity, b.velocity);
    }

    #[test]
    fn wall_reflects_and_clamps() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let d = disc(99.0, 50.0, 10.0, 1.0, 1.0, 5.0);
        let out = resolve_wall(&d, &bounds, 0.8).unwrap();
        assert_abs_diff_eq!(out.position.x, 95.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.velocity.x, -8.0, epsilon = 1e-12);
        assert_eq!(out.velocity.y, 1.0);
        let inside = disc(50.0, 50.0, 10.0, 1.0, 1.0, 5.0);
        assert!(resolve_wall(&inside, &bounds, 0.8).is_none());
    }

    #[test]
    fn resolver_handles_pairs_and_walls() {
        let resolver = CollisionResolver::new(CollisionKind::Elastic)
            .with_bounds(Bounds::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0)));
        let mut discs = [
            disc(-0.9, 0.0, 1.0, 0.0, 1.0, 1.0),
            disc(0.9, 0.0, -1.0, 0.0, 1.0, 1.0),
            disc(9.5, 0.0, 1.0, 0.0, 1.0, 1.0),
        ];
        let n = resolver.resolve(&mut discs);
        assert_eq!(n, 1);
        assert!(discs[0].velocity.x < 0.0);
        assert!(discs[1].velocity.x > 0.0);
        assert!(discs[2].velocity.x < 0.0);
        assert_abs_diff_eq!(discs[2].position.x, 9.0, epsilon = 1e-12);
    }
}
