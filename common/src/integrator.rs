//! Fixed-step time integrators
//!
//! Two schemes are provided:
//! - semi-implicit (symplectic) Euler for gravity and spring systems stepped at
//!   interactive rates, where bounded energy error matters more than accuracy
//! - classical RK4 for chaotic systems, where first-order error growth would
//!   swamp the dynamics within seconds
//!
//! Integrators are pure: they take the current state and a derivative function
//! and return the new state. Callers own mutation and commit the result.

use glam::{DVec2, DVec3};
use log::debug;
use serde::{Deserialize, Serialize};

/// Largest frame delta a lab will accept, in seconds
pub const MAX_DT: f64 = 0.05;

/// Clamp an incoming wall-clock delta before it reaches an integrator.
///
/// Negative or non-finite deltas become zero; anything above `max_dt`
/// (a debugger pause, a backgrounded window) is cut down to `max_dt`.
pub fn clamp_dt(dt: f64, max_dt: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    if dt > max_dt {
        debug!("clamping dt {:.4}s to {:.4}s", dt, max_dt);
        max_dt
    } else {
        dt
    }
}

/// Split a frame span into the fewest equal sub-steps no longer than
/// `max_step`, at most `max_substeps` of them.
///
/// Returns `(n, h)` with `n * h == span`. When the cap bites, `h` grows past
/// `max_step` instead of dropping simulated time.
pub fn substeps(span: f64, max_step: f64, max_substeps: usize) -> (usize, f64) {
    if !(span > 0.0 && span.is_finite()) {
        return (0, 0.0);
    }
    let wanted = (span / max_step).ceil().clamp(1.0, usize::MAX as f64) as usize;
    let n = wanted.min(max_substeps.max(1));
    if n < wanted {
        debug!("sub-steps capped at {} (wanted {})", n, wanted);
    }
    (n, span / n as f64)
}

/// A state that can be advanced by `state + h * rate`
pub trait StateVector: Clone {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self;
}

impl StateVector for f64 {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        self + rate * h
    }
}

impl StateVector for DVec2 {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        *self + *rate * h
    }
}

impl StateVector for DVec3 {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        *self + *rate * h
    }
}

impl<const N: usize> StateVector for [f64; N] {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        let mut out = *self;
        for (o, r) in out.iter_mut().zip(rate.iter()) {
            *o += r * h;
        }
        out
    }
}

impl<T: StateVector> StateVector for Vec<T> {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        self.iter()
            .zip(rate.iter())
            .map(|(s, r)| s.add_scaled(r, h))
            .collect()
    }
}

/// Position/velocity pair of a point in a second-order system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematic<V> {
    pub position: V,
    pub velocity: V,
}

impl<V> Kinematic<V> {
    pub fn new(position: V, velocity: V) -> Self {
        Self { position, velocity }
    }
}

impl<V: StateVector> StateVector for Kinematic<V> {
    fn add_scaled(&self, rate: &Self, h: f64) -> Self {
        Self {
            position: self.position.add_scaled(&rate.position, h),
            velocity: self.velocity.add_scaled(&rate.velocity, h),
        }
    }
}

/// Classical fourth-order Runge-Kutta step:
/// `x' = x + dt/6 * (k1 + 2k2 + 2k3 + k4)`
pub fn rk4<S, F>(state: &S, t: f64, dt: f64, f: F) -> S
where
    S: StateVector,
    F: Fn(f64, &S) -> S,
{
    let half = 0.5 * dt;

    // k1 = f(t, y)
    let k1 = f(t, state);
    // k2 = f(t + dt/2, y + dt*k1/2)
    let k2 = f(t + half, &state.add_scaled(&k1, half));
    // k3 = f(t + dt/2, y + dt*k2/2)
    let k3 = f(t + half, &state.add_scaled(&k2, half));
    // k4 = f(t + dt, y + dt*k3)
    let k4 = f(t + dt, &state.add_scaled(&k3, dt));

    state
        .add_scaled(&k1, dt / 6.0)
        .add_scaled(&k2, dt / 3.0)
        .add_scaled(&k3, dt / 3.0)
        .add_scaled(&k4, dt / 6.0)
}

/// Semi-implicit Euler over a batch of points.
///
/// Accelerations are evaluated once from the whole snapshot, then every point
/// is kicked (`v' = v + a*dt`) and drifted with the new velocity (`x' = x + v'*dt`).
pub fn semi_implicit_euler<V, A>(bodies: &[Kinematic<V>], t: f64, dt: f64, accel: A) -> Vec<Kinematic<V>>
where
    V: StateVector,
    A: Fn(f64, &[Kinematic<V>]) -> Vec<V>,
{
    let a = accel(t, bodies);
    bodies
        .iter()
        .zip(a.iter())
        .map(|(b, a)| {
            let velocity = b.velocity.add_scaled(a, dt);
            let position = b.position.add_scaled(&velocity, dt);
            Kinematic { position, velocity }
        })
        .collect()
}

/// RK4 over a batch of points whose derivative is `(v, a(x, v))`
pub fn rk4_kinematic<V, A>(bodies: &[Kinematic<V>], t: f64, dt: f64, accel: A) -> Vec<Kinematic<V>>
where
    V: StateVector,
    A: Fn(f64, &[Kinematic<V>]) -> Vec<V>,
{
    rk4(&bodies.to_vec(), t, dt, |t, state: &Vec<Kinematic<V>>| {
        let a = accel(t, state);
        state
            .iter()
            .zip(a)
            .map(|(b, a)| Kinematic {
                position: b.velocity.clone(),
                velocity: a,
            })
            .collect()
    })
}

/// Stepping strategy for labs that let the user choose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    SemiImplicitEuler,
    Rk4,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "semi_implicit_euler" | "euler" => Some(Method::SemiImplicitEuler),
            "rk4" => Some(Method::Rk4),
            _ => None,
        }
    }

    /// Advance every point by `dt` with this method
    pub fn advance<V, A>(&self, bodies: &[Kinematic<V>], t: f64, dt: f64, accel: A) -> Vec<Kinematic<V>>
    where
        V: StateVector,
        A: Fn(f64, &[Kinematic<V>]) -> Vec<V>,
    {
        match self {
            Method::SemiImplicitEuler => semi_implicit_euler(bodies, t, dt, accel),
            Method::Rk4 => rk4_kinematic(bodies, t, dt, accel),
        }
    }
}
