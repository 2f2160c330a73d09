//! Balls in a box: uniform gravity, drag and collisions

use common::collision::{Bounds, CollisionKind, CollisionResolver, Disc};
use common::forces::{ForceSet, LinearDrag, UniformGravity};
use common::lab::require_positive;
use common::{
    clamp_dt, substeps, Arena, ConservationSnapshot, ConservationTracker, EntityId, InvariantReport, Kinematic,
    Lab, Method, ParamValue, Result, SimConfig, SimError, Snapshot, Target, Trail, Vec2,
};
use log::{debug, info};

use crate::presets;

/// Default arena size, in scene units
pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 600.0;

/// Restitution picked up when switching to inelastic collisions
pub const DEFAULT_RESTITUTION: f64 = 0.8;

/// A ball in the simulation with mass, position, and velocity
#[derive(Debug, Clone)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    pub trail: Trail,
}

impl Ball {
    fn disc(&self) -> Disc {
        Disc {
            position: self.position,
            velocity: self.velocity,
            mass: self.mass,
            radius: self.radius,
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }
}

/// Initial state for a new ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
}

impl BallSpec {
    pub fn new(position: Vec2, velocity: Vec2, mass: f64, radius: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius,
        }
    }
}

/// The mechanics sandbox state
pub struct MechanicsLab {
    balls: Arena<Ball>,
    resolver: CollisionResolver,
    /// Restitution used when the collision type is switched to inelastic
    restitution: f64,
    /// Downward acceleration, units/s²
    gravity: f64,
    drag: f64,
    method: Method,
    time: f64,
    last_contacts: usize,
    config: SimConfig,
    /// Settings restored by `reset`
    defaults: SimConfig,
    tracker: ConservationTracker,
}

impl MechanicsLab {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            balls: Arena::new(),
            resolver: CollisionResolver::new(CollisionKind::Elastic)
                .with_bounds(Bounds::new(Vec2::ZERO, Vec2::new(WIDTH, HEIGHT))),
            restitution: DEFAULT_RESTITUTION,
            gravity: 0.0,
            drag: 0.0,
            method: Method::SemiImplicitEuler,
            time: 0.0,
            last_contacts: 0,
            defaults: config.clone(),
            config,
            tracker: ConservationTracker::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn collision_kind(&self) -> CollisionKind {
        self.resolver.kind
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.resolver.bounds
    }

    /// Pair contacts resolved during the last step
    pub fn last_contacts(&self) -> usize {
        self.last_contacts
    }

    pub fn ball(&self, id: EntityId) -> Option<&Ball> {
        self.balls.get(id)
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Get the center of mass of all balls
    pub fn center_of_mass(&self) -> Vec2 {
        let mut total_mass = 0.0;
        let mut com = Vec2::ZERO;

        for ball in self.balls.values() {
            com += ball.position * ball.mass;
            total_mass += ball.mass;
        }

        if total_mass > 0.0 {
            com / total_mass
        } else {
            Vec2::ZERO
        }
    }

    pub(crate) fn set_collision_kind(&mut self, kind: CollisionKind) {
        self.resolver.kind = kind;
    }

    pub(crate) fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    pub(crate) fn set_wall_restitution(&mut self, restitution: f64) {
        self.resolver.wall_restitution = restitution;
    }

    fn force_set(&self) -> ForceSet {
        let mut forces = ForceSet::new();
        if self.gravity != 0.0 {
            forces = forces.with(UniformGravity {
                g: Vec2::new(0.0, -self.gravity),
            });
        }
        if self.drag > 0.0 {
            forces = forces.with(LinearDrag { b: self.drag });
        }
        forces
    }

    /// One integration step of `h` seconds followed by contact resolution.
    /// Returns the number of pair contacts resolved.
    fn advance(&mut self, h: f64) -> usize {
        // Snapshot every ball once; all updates derive from it
        let ids = self.balls.ids();
        let points: Vec<Kinematic<Vec2>> = self
            .balls
            .values()
            .map(|b| Kinematic::new(b.position, b.velocity))
            .collect();
        let masses: Vec<f64> = self.balls.values().map(|b| b.mass).collect();
        let radii: Vec<f64> = self.balls.values().map(|b| b.radius).collect();

        let forces = self.force_set();
        let next = self
            .method
            .advance(&points, self.time, h, |t, s| forces.accelerations(t, s, &masses));

        let mut discs: Vec<Disc> = next
            .iter()
            .zip(masses.iter().zip(radii.iter()))
            .map(|(k, (&mass, &radius))| Disc {
                position: k.position,
                velocity: k.velocity,
                mass,
                radius,
            })
            .collect();
        let contacts = self.resolver.resolve(&mut discs);

        for (id, disc) in ids.into_iter().zip(discs) {
            if let Some(ball) = self.balls.get_mut(id) {
                ball.position = disc.position;
                ball.velocity = disc.velocity;
            }
        }
        self.time += h;
        contacts
    }

    fn conservation(&self) -> ConservationSnapshot {
        let floor = self.resolver.bounds.map_or(0.0, |b| b.min.y);
        let potential: f64 = self
            .balls
            .values()
            .map(|b| b.mass * self.gravity * (b.position.y - floor))
            .sum();
        ConservationSnapshot::from_points(self.balls.values().map(|b| (b.mass, b.position, b.velocity)))
            .with_potential(potential)
    }

    fn ball_mut(&mut self, id: EntityId) -> Result<&mut Ball> {
        self.balls.get_mut(id).ok_or(SimError::UnknownEntity(id))
    }

    fn set_global(&mut self, key: &str, value: &ParamValue) -> Result<()> {
        match key {
            "collision_type" => {
                let kind = match value.choice(key)? {
                    "elastic" => CollisionKind::Elastic,
                    "inelastic" => CollisionKind::Inelastic {
                        restitution: self.restitution,
                    },
                    "perfectly_inelastic" => CollisionKind::PerfectlyInelastic,
                    other => return Err(SimError::invalid(key, other, "unknown collision type")),
                };
                self.resolver.kind = kind;
            }
            "restitution" => {
                let e = value.number(key)?;
                if !(e > 0.0 && e < 1.0) {
                    return Err(SimError::invalid(key, e, "must lie strictly between 0 and 1"));
                }
                self.restitution = e;
                if let CollisionKind::Inelastic { .. } = self.resolver.kind {
                    self.resolver.kind = CollisionKind::Inelastic { restitution: e };
                }
            }
            "wall_restitution" => self.resolver.wall_restitution = value.in_range(key, 0.0, 1.0)?,
            "walls" => {
                self.resolver.bounds = if value.flag(key)? {
                    Some(Bounds::new(Vec2::ZERO, Vec2::new(WIDTH, HEIGHT)))
                } else {
                    None
                };
            }
            "gravity" => self.gravity = value.number(key)?,
            "drag" => self.drag = value.non_negative(key)?,
            "integrator" => {
                let name = value.choice(key)?;
                self.method = Method::parse(name).ok_or_else(|| SimError::invalid(key, name, "unknown integrator"))?;
            }
            "time_scale" | "max_substeps" => self.config.set(key, value)?,
            "trail_length" => {
                self.config.set(key, value)?;
                let len = self.config.trail_length;
                for (_, ball) in self.balls.iter_mut() {
                    ball.trail.set_max_length(len);
                }
            }
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    fn set_on_ball(&mut self, id: EntityId, key: &str, value: &ParamValue) -> Result<()> {
        let ball = self.ball_mut(id)?;
        match key {
            "mass" => ball.mass = value.positive(key)?,
            "radius" => ball.radius = value.positive(key)?,
            "x" => ball.position.x = value.number(key)?,
            "y" => ball.position.y = value.number(key)?,
            "vx" => ball.velocity.x = value.number(key)?,
            "vy" => ball.velocity.y = value.number(key)?,
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

impl Default for MechanicsLab {
    fn default() -> Self {
        Self::new()
    }
}

impl Lab for MechanicsLab {
    type Spec = BallSpec;
    type Entity = Ball;

    /// Step the simulation forward by dt seconds
    fn step(&mut self, dt: f64) -> Snapshot<Ball> {
        let span = clamp_dt(dt, self.config.max_dt) * self.config.time_scale;
        let (n, h) = substeps(span, self.config.max_dt, self.config.max_substeps);
        if n == 0 || self.balls.is_empty() {
            return self.snapshot();
        }

        let contacts: usize = (0..n).map(|_| self.advance(h)).sum();
        self.last_contacts = contacts;
        if self.last_contacts > 0 {
            debug!("t={:.3}: resolved {} contacts", self.time, self.last_contacts);
        }
        for (_, ball) in self.balls.iter_mut() {
            ball.trail.push(ball.position);
        }
        self.snapshot()
    }

    fn add_entity(&mut self, spec: BallSpec) -> Result<EntityId> {
        require_positive("mass", spec.mass)?;
        require_positive("radius", spec.radius)?;
        if !(spec.position.is_finite() && spec.velocity.is_finite()) {
            return Err(SimError::invalid("position", format!("{:?}", spec.position), "must be finite"));
        }
        Ok(self.balls.insert(Ball {
            position: spec.position,
            velocity: spec.velocity,
            mass: spec.mass,
            radius: spec.radius,
            trail: Trail::new(self.config.trail_length),
        }))
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.balls.remove(id).map(|_| ()).ok_or(SimError::UnknownEntity(id))
    }

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()> {
        match target {
            Target::Global => self.set_global(key, &value),
            Target::Entity(id) => self.set_on_ball(id, key, &value),
        }
    }

    fn load_preset(&mut self, name: &str) -> Result<Snapshot<Ball>> {
        self.reset();
        presets::build(self, name)?;
        self.tracker.freeze(self.conservation());
        info!("loaded mechanics preset `{}` with {} balls", name, self.balls.len());
        Ok(self.snapshot())
    }

    fn presets(&self) -> &'static [&'static str] {
        presets::NAMES
    }

    fn query_invariants(&self) -> InvariantReport {
        self.tracker.report(self.conservation())
    }

    fn snapshot(&self) -> Snapshot<Ball> {
        Snapshot {
            time: self.time,
            entities: self.balls.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.balls.clear();
        self.tracker.clear();
        self.time = 0.0;
        self.last_contacts = 0;
        self.gravity = 0.0;
        self.drag = 0.0;
        self.restitution = DEFAULT_RESTITUTION;
        self.method = Method::SemiImplicitEuler;
        self.config = self.defaults.clone();
        self.resolver = CollisionResolver::new(CollisionKind::Elastic)
            .with_bounds(Bounds::new(Vec2::ZERO, Vec2::new(WIDTH, HEIGHT)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn lab_with(specs: &[BallSpec]) -> (MechanicsLab, Vec<EntityId>) {
        let mut lab = MechanicsLab::new();
        let ids = specs.iter().map(|s| lab.add_entity(*s).unwrap()).collect();
        (lab, ids)
    }

    #[test]
    fn rejects_non_positive_mass() {
        let mut lab = MechanicsLab::new();
        let err = lab
            .add_entity(BallSpec::new(Vec2::ZERO, Vec2::ZERO, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }

    #[test]
    fn free_ball_moves_in_a_straight_line() {
        let (mut lab, ids) = lab_with(&[BallSpec::new(Vec2::new(100.0, 100.0), Vec2::new(10.0, 5.0), 1.0, 5.0)]);
        for _ in 0..10 {
            lab.step(0.01);
        }
        let ball = lab.ball(ids[0]).unwrap();
        assert_abs_diff_eq!(ball.position.x, 101.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ball.position.y, 100.5, epsilon = 1e-9);
        assert_eq!(ball.trail.len(), 10);
    }

    #[test]
    fn huge_frame_delta_is_clamped() {
        let (mut lab, ids) = lab_with(&[BallSpec::new(Vec2::new(100.0, 100.0), Vec2::new(10.0, 0.0), 1.0, 5.0)]);
        lab.step(10.0);
        let ball = lab.ball(ids[0]).unwrap();
        assert_abs_diff_eq!(ball.position.x, 100.0 + 10.0 * common::integrator::MAX_DT, epsilon = 1e-9);
    }

    #[test]
    fn fast_playback_is_split_into_short_steps() {
        let (mut lab, ids) = lab_with(&[BallSpec::new(Vec2::new(400.0, 500.0), Vec2::ZERO, 1.0, 10.0)]);
        lab.set_parameter(Target::Global, "gravity", 100.0.into()).unwrap();
        lab.set_parameter(Target::Global, "time_scale", 20.0.into()).unwrap();
        lab.step(0.05);
        // 1 s of free fall in twenty 0.05 s kicks: v = g*t, y drops g*h²*n(n+1)/2
        let ball = lab.ball(ids[0]).unwrap();
        assert_abs_diff_eq!(lab.time(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ball.velocity.y, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ball.position.y, 500.0 - 100.0 * 0.0025 * 210.0, epsilon = 1e-9);
        assert_eq!(ball.trail.len(), 1);

        assert!(lab.set_parameter(Target::Global, "time_scale", 1000.0.into()).is_err());
    }

    #[test]
    fn oversized_trail_length_is_rejected() {
        let (mut lab, _) = lab_with(&[]);
        let err = lab
            .set_parameter(Target::Global, "trail_length", 1e18.into())
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
        lab.add_entity(BallSpec::new(Vec2::new(10.0, 10.0), Vec2::ZERO, 1.0, 1.0))
            .unwrap();
    }

    #[test]
    fn gravity_pulls_down_and_floor_bounces() {
        let (mut lab, ids) = lab_with(&[BallSpec::new(Vec2::new(400.0, 50.0), Vec2::ZERO, 1.0, 10.0)]);
        lab.set_parameter(Target::Global, "gravity", 500.0.into()).unwrap();
        lab.set_parameter(Target::Global, "wall_restitution", 0.5.into()).unwrap();
        let mut bounced = false;
        for _ in 0..200 {
            lab.step(1.0 / 60.0);
            let ball = lab.ball(ids[0]).unwrap();
            assert!(ball.position.y >= 10.0 - 1e-9);
            if ball.velocity.y > 0.0 {
                bounced = true;
            }
        }
        assert!(bounced);
    }

    #[test]
    fn restitution_must_be_strictly_inside_unit_interval() {
        let mut lab = MechanicsLab::new();
        assert!(lab.set_parameter(Target::Global, "restitution", 1.0.into()).is_err());
        assert!(lab.set_parameter(Target::Global, "restitution", 0.0.into()).is_err());
        lab.set_parameter(Target::Global, "restitution", 0.3.into()).unwrap();
        lab.set_parameter(Target::Global, "collision_type", "inelastic".into()).unwrap();
        assert_eq!(lab.collision_kind(), CollisionKind::Inelastic { restitution: 0.3 });
    }

    #[test]
    fn unknown_parameter_and_entity_are_errors() {
        let mut lab = MechanicsLab::new();
        assert!(matches!(
            lab.set_parameter(Target::Global, "warp", 1.0.into()),
            Err(SimError::UnknownParameter(_))
        ));
        assert!(matches!(
            lab.remove_entity(EntityId(42)),
            Err(SimError::UnknownEntity(_))
        ));
    }

    #[test]
    fn center_of_mass_weights_by_mass() {
        let (lab, _) = lab_with(&[
            BallSpec::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 1.0, 1.0),
            BallSpec::new(Vec2::new(30.0, 0.0), Vec2::ZERO, 2.0, 1.0),
        ]);
        assert_abs_diff_eq!(lab.center_of_mass().x, 20.0, epsilon = 1e-12);
    }
}
