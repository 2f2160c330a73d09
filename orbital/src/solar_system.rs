//! Gravitating bodies and the orbital lab
//!
//! Every body attracts every other. Fixed bodies (usually a central star)
//! still pull on the rest but are never moved. A frame is split into
//! semi-implicit Euler sub-steps of roughly `substep_dt`, capped at
//! `max_substeps`, so fast time scales stay stable.

use common::constants::G_SCALED;
use common::forces::{gravity_potential, ForceSet, PairwiseGravity};
use common::integrator::semi_implicit_euler;
use common::lab::require_positive;
use common::{
    clamp_dt, substeps, Arena, ConservationSnapshot, ConservationTracker, EntityId, InvariantReport, Kinematic, Lab,
    ParamValue, Result, SimConfig, SimError, Snapshot, Target, Trail, Vec2,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::kepler::{circular_speed, lagrange_points, OrbitalElements};
use crate::presets;
use crate::spaceship::Thruster;

/// Celestial body types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Asteroid,
    Spacecraft,
}

/// A gravitating body
#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    /// Attracts others but is never integrated
    pub is_fixed: bool,
    pub thruster: Option<Thruster>,
    pub trail: Trail,
}

impl CelestialBody {
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

/// Initial state of a new body
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub name: String,
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    pub is_fixed: bool,
    pub thruster: Option<Thruster>,
}

impl BodySpec {
    pub fn new(name: &str, kind: BodyKind, mass: f64, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass,
            radius,
            is_fixed: false,
            thruster: None,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    pub fn with_thruster(mut self, thruster: Thruster) -> Self {
        self.thruster = Some(thruster);
        self
    }

    /// Place on a circular orbit of radius `distance` around a body of mass
    /// `central_mass` at `centre`, moving counter-clockwise
    pub fn at_orbit(mut self, g: f64, central_mass: f64, centre: Vec2, distance: f64, angle: f64) -> Self {
        let dir = Vec2::new(angle.cos(), angle.sin());
        let speed = circular_speed(g * central_mass, distance);
        self.position = centre + dir * distance;
        self.velocity = dir.perp() * speed;
        self
    }
}

pub struct OrbitalLab {
    bodies: Arena<CelestialBody>,
    /// Gravitational constant
    g: f64,
    time: f64,
    config: SimConfig,
    defaults: SimConfig,
    tracker: ConservationTracker,
}

impl OrbitalLab {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            bodies: Arena::new(),
            g: G_SCALED,
            time: 0.0,
            defaults: config.clone(),
            config,
            tracker: ConservationTracker::new(),
        }
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn body(&self, id: EntityId) -> Option<&CelestialBody> {
        self.bodies.get(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (EntityId, &CelestialBody)> {
        self.bodies.iter()
    }

    /// Find body by name
    pub fn find(&self, name: &str) -> Option<(EntityId, &CelestialBody)> {
        self.bodies.iter().find(|(_, b)| b.name == name)
    }

    /// Get the center of mass of all bodies
    pub fn center_of_mass(&self) -> Vec2 {
        let mut total_mass = 0.0;
        let mut com = Vec2::ZERO;

        for body in self.bodies.values() {
            com += body.position * body.mass;
            total_mass += body.mass;
        }

        if total_mass > 0.0 {
            com / total_mass
        } else {
            Vec2::ZERO
        }
    }

    /// Sub-step count and size for a frame advancing `span` simulated seconds
    pub fn substeps(&self, span: f64) -> (usize, f64) {
        substeps(span, self.config.substep_dt, self.config.max_substeps)
    }

    /// Orbit of `body` about `around`, using `μ = G*M` of the central body
    pub fn elements(&self, body: EntityId, around: EntityId) -> Result<Option<OrbitalElements>> {
        let b = self.bodies.get(body).ok_or(SimError::UnknownEntity(body))?;
        let c = self.bodies.get(around).ok_or(SimError::UnknownEntity(around))?;
        let mu = self.g * c.mass;
        Ok(OrbitalElements::from_state(mu, b.position - c.position, b.velocity - c.velocity))
    }

    /// L1 to L5 of `secondary` orbiting `primary`
    pub fn lagrange_points(&self, primary: EntityId, secondary: EntityId) -> Result<[Vec2; 5]> {
        let p = self.bodies.get(primary).ok_or(SimError::UnknownEntity(primary))?;
        let s = self.bodies.get(secondary).ok_or(SimError::UnknownEntity(secondary))?;
        lagrange_points(p.mass, p.position, s.mass, s.position)
            .ok_or_else(|| SimError::invalid("secondary", secondary, "coincides with the primary"))
    }

    /// One semi-implicit Euler sub-step of every free body, derived from a
    /// single snapshot of all bodies
    fn substep(&mut self, h: f64) {
        let ids = self.bodies.ids();
        let points: Vec<Kinematic<Vec2>> = self
            .bodies
            .values()
            .map(|b| Kinematic::new(b.position, b.velocity))
            .collect();
        let masses: Vec<f64> = self.bodies.values().map(|b| b.mass).collect();
        let thrust: Vec<Vec2> = self
            .bodies
            .values()
            .map(|b| b.thruster.map_or(Vec2::ZERO, |t| t.acceleration(b.mass)))
            .collect();

        let gravity = ForceSet::new().with(PairwiseGravity {
            g: self.g,
            min_separation: self.config.min_separation,
        });
        let next = semi_implicit_euler(&points, self.time, h, |t, s| {
            let mut acc = gravity.accelerations(t, s, &masses);
            for (a, push) in acc.iter_mut().zip(&thrust) {
                *a += *push;
            }
            acc
        });

        for (id, k) in ids.into_iter().zip(next) {
            if let Some(body) = self.bodies.get_mut(id) {
                if let Some(thruster) = body.thruster.as_mut() {
                    thruster.burn(h);
                }
                if !body.is_fixed {
                    body.position = k.position;
                    body.velocity = k.velocity;
                }
            }
        }
    }

    fn conservation(&self) -> ConservationSnapshot {
        let bodies: Vec<&CelestialBody> = self.bodies.values().collect();
        let mut potential = 0.0;
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let dist = bodies[i].position.distance(bodies[j].position);
                potential += gravity_potential(self.g, bodies[i].mass, bodies[j].mass, dist, self.config.min_separation);
            }
        }
        ConservationSnapshot::from_points(bodies.iter().map(|b| (b.mass, b.position, b.velocity)))
            .with_potential(potential)
    }

    fn set_on_body(&mut self, id: EntityId, key: &str, value: &ParamValue) -> Result<()> {
        let body = self.bodies.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        match key {
            "mass" => body.mass = value.positive(key)?,
            "radius" => body.radius = value.positive(key)?,
            "fixed" => {
                body.is_fixed = value.flag(key)?;
                if body.is_fixed {
                    body.velocity = Vec2::ZERO;
                }
            }
            "x" => body.position.x = value.number(key)?,
            "y" => body.position.y = value.number(key)?,
            "vx" => body.velocity.x = value.number(key)?,
            "vy" => body.velocity.y = value.number(key)?,
            "throttle" | "heading" | "fuel" => {
                let thruster = body.thruster.as_mut().ok_or(SimError::WrongEntityKind {
                    id,
                    expected: "spacecraft with a thruster",
                })?;
                match key {
                    "throttle" => thruster.set_throttle(value.number(key)?)?,
                    "heading" => thruster.heading = value.number(key)?,
                    _ => thruster.fuel = value.non_negative(key)?,
                }
            }
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

impl Default for OrbitalLab {
    fn default() -> Self {
        Self::new()
    }
}

impl Lab for OrbitalLab {
    type Spec = BodySpec;
    type Entity = CelestialBody;

    fn step(&mut self, dt: f64) -> Snapshot<CelestialBody> {
        let span = clamp_dt(dt, self.config.max_dt) * self.config.time_scale;
        let (n, h) = self.substeps(span);
        if n == 0 || self.bodies.is_empty() {
            return self.snapshot();
        }

        for _ in 0..n {
            self.substep(h);
            self.time += h;
        }

        for (_, body) in self.bodies.iter_mut() {
            if !body.is_fixed {
                body.trail.push(body.position);
            }
        }
        self.snapshot()
    }

    fn add_entity(&mut self, spec: BodySpec) -> Result<EntityId> {
        require_positive("mass", spec.mass)?;
        require_positive("radius", spec.radius)?;
        if !(spec.position.is_finite() && spec.velocity.is_finite()) {
            return Err(SimError::invalid("position", format!("{:?}", spec.position), "must be finite"));
        }
        Ok(self.bodies.insert(CelestialBody {
            name: spec.name,
            kind: spec.kind,
            position: spec.position,
            velocity: if spec.is_fixed { Vec2::ZERO } else { spec.velocity },
            mass: spec.mass,
            radius: spec.radius,
            is_fixed: spec.is_fixed,
            thruster: spec.thruster,
            trail: Trail::new(self.config.trail_length),
        }))
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.bodies.remove(id).map(|_| ()).ok_or(SimError::UnknownEntity(id))
    }

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()> {
        match (target, key) {
            (Target::Global, "g") => self.g = value.positive(key)?,
            (Target::Global, "time_scale" | "substep_dt" | "max_substeps") => self.config.set(key, &value)?,
            (Target::Global, "trail_length") => {
                self.config.set(key, &value)?;
                let len = self.config.trail_length;
                for (_, body) in self.bodies.iter_mut() {
                    body.trail.set_max_length(len);
                }
            }
            (Target::Global, _) => return Err(SimError::UnknownParameter(key.to_string())),
            (Target::Entity(id), _) => return self.set_on_body(id, key, &value),
        }
        Ok(())
    }

    fn load_preset(&mut self, name: &str) -> Result<Snapshot<CelestialBody>> {
        self.reset();
        presets::build(self, name)?;
        self.tracker.freeze(self.conservation());
        info!("loaded orbital preset `{}` with {} bodies", name, self.bodies.len());
        Ok(self.snapshot())
    }

    fn presets(&self) -> &'static [&'static str] {
        presets::NAMES
    }

    fn query_invariants(&self) -> InvariantReport {
        self.tracker.report(self.conservation())
    }

    fn snapshot(&self) -> Snapshot<CelestialBody> {
        Snapshot {
            time: self.time,
            entities: self.bodies.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.bodies.clear();
        self.tracker.clear();
        self.time = 0.0;
        self.g = G_SCALED;
        self.config = self.defaults.clone();
    }
}
