//! Spring-mass networks
//!
//! Masses are joined to each other or to fixed wall anchors by Hooke springs.
//! Springs damp along their own axis, and any mass can be flagged as driven
//! by a periodic force `A*cos(ωt)` along x. The scene is a single arena, so
//! masses and springs share one id space.

use std::collections::BTreeMap;

use common::forces::{driving_force, spring_damping, spring_force, spring_potential};
use common::lab::require_positive;
use common::{
    clamp_dt, substeps, Arena, ConservationSnapshot, ConservationTracker, EntityId, InvariantReport, Kinematic,
    Lab, Method, ParamValue, Result, SimConfig, SimError, Snapshot, Target, Trail, Vec2,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::presets;

/// A point mass attached to springs
#[derive(Debug, Clone)]
pub struct Mass {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    /// Feels the periodic driving force
    pub driven: bool,
    pub trail: Trail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    pub driven: bool,
}

impl MassSpec {
    pub fn at(position: Vec2, mass: f64) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            mass,
            radius: 15.0,
            driven: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn driven(mut self) -> Self {
        self.driven = true;
        self
    }
}

/// One end of a spring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Endpoint {
    /// Fixed anchor point
    Wall(Vec2),
    Entity(EntityId),
}

/// A Hooke spring between two endpoints. Springs reference masses by id and
/// never own them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: Endpoint,
    pub b: Endpoint,
    pub stiffness: f64,
    pub rest_length: f64,
    /// Own damping coefficient; `None` follows the lab's `DampingType`
    pub damping: Option<f64>,
}

impl Spring {
    pub fn new(a: Endpoint, b: Endpoint, stiffness: f64, rest_length: f64) -> Self {
        Self {
            a,
            b,
            stiffness,
            rest_length,
            damping: None,
        }
    }

    pub fn with_damping(mut self, b: f64) -> Self {
        self.damping = Some(b);
        self
    }

    fn masses(&self) -> impl Iterator<Item = EntityId> {
        [self.a, self.b].into_iter().filter_map(|e| match e {
            Endpoint::Entity(id) => Some(id),
            Endpoint::Wall(_) => None,
        })
    }
}

/// Anything stored in the oscillations scene
#[derive(Debug, Clone)]
pub enum Element {
    Mass(Mass),
    Spring(Spring),
}

impl Element {
    pub fn as_mass(&self) -> Option<&Mass> {
        match self {
            Element::Mass(m) => Some(m),
            Element::Spring(_) => None,
        }
    }

    pub fn as_spring(&self) -> Option<&Spring> {
        match self {
            Element::Spring(s) => Some(s),
            Element::Mass(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementSpec {
    Mass(MassSpec),
    Spring(Spring),
}

/// How strongly springs resist motion along their axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DampingType {
    #[default]
    None,
    Light,
    Critical,
    Heavy,
    /// Fixed coefficient `b`
    Custom(f64),
}

impl DampingType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(DampingType::None),
            "light" => Some(DampingType::Light),
            "critical" => Some(DampingType::Critical),
            "heavy" => Some(DampingType::Heavy),
            _ => None,
        }
    }

    /// Damping coefficient for a spring of stiffness `k` moving an effective
    /// mass `m_eff`. Named levels are fractions of critical damping `2*sqrt(k*m)`.
    pub fn coefficient(&self, k: f64, m_eff: f64) -> f64 {
        let ratio = match self {
            DampingType::Custom(b) => return *b,
            DampingType::None => 0.0,
            DampingType::Light => 0.1,
            DampingType::Critical => 1.0,
            DampingType::Heavy => 2.0,
        };
        ratio * 2.0 * (k * m_eff).sqrt()
    }
}

/// Angular frequency `ω0 = sqrt(k/m)`
pub fn natural_frequency(k: f64, m: f64) -> f64 {
    if m > 0.0 {
        (k / m).sqrt()
    } else {
        0.0
    }
}

/// Spring endpoint resolved against the current state vector
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Fixed(Vec2),
    Point(usize),
}

#[derive(Debug, Clone, Copy)]
struct Link {
    a: Anchor,
    b: Anchor,
    k: f64,
    rest: f64,
    damping: f64,
}

fn locate(anchor: Anchor, state: &[Kinematic<Vec2>]) -> (Vec2, Vec2) {
    match anchor {
        Anchor::Fixed(p) => (p, Vec2::ZERO),
        Anchor::Point(i) => (state[i].position, state[i].velocity),
    }
}

/// Periodic drive applied to flagged masses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for Drive {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            frequency: 1.0,
        }
    }
}

pub struct OscillationsLab {
    elements: Arena<Element>,
    damping: DampingType,
    drive: Drive,
    method: Method,
    time: f64,
    config: SimConfig,
    /// Settings restored by `reset`
    defaults: SimConfig,
    tracker: ConservationTracker,
}

impl OscillationsLab {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            elements: Arena::new(),
            damping: DampingType::None,
            drive: Drive::default(),
            method: Method::Rk4,
            time: 0.0,
            defaults: config.clone(),
            config,
            tracker: ConservationTracker::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn damping(&self) -> DampingType {
        self.damping
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn drive(&self) -> Drive {
        self.drive
    }

    pub fn mass(&self, id: EntityId) -> Option<&Mass> {
        self.elements.get(id).and_then(Element::as_mass)
    }

    pub fn spring(&self, id: EntityId) -> Option<&Spring> {
        self.elements.get(id).and_then(Element::as_spring)
    }

    pub fn masses(&self) -> impl Iterator<Item = (EntityId, &Mass)> {
        self.elements.iter().filter_map(|(id, e)| e.as_mass().map(|m| (id, m)))
    }

    pub fn springs(&self) -> impl Iterator<Item = (EntityId, &Spring)> {
        self.elements.iter().filter_map(|(id, e)| e.as_spring().map(|s| (id, s)))
    }

    pub(crate) fn set_damping(&mut self, damping: DampingType) {
        self.damping = damping;
    }

    pub(crate) fn set_drive(&mut self, drive: Drive) {
        self.drive = drive;
    }

    /// Effective mass a spring moves: the attached mass for a wall spring,
    /// the reduced mass `m1*m2/(m1+m2)` between two masses
    pub fn effective_mass(&self, spring: &Spring) -> f64 {
        let end_mass = |e: Endpoint| match e {
            Endpoint::Entity(id) => self.mass(id).map(|m| m.mass),
            Endpoint::Wall(_) => None,
        };
        match (end_mass(spring.a), end_mass(spring.b)) {
            (Some(m1), Some(m2)) => m1 * m2 / (m1 + m2),
            (Some(m), None) | (None, Some(m)) => m,
            (None, None) => 0.0,
        }
    }

    /// Damping coefficient a spring applies this step
    pub fn damping_coefficient(&self, spring: &Spring) -> f64 {
        spring
            .damping
            .unwrap_or_else(|| self.damping.coefficient(spring.stiffness, self.effective_mass(spring)))
    }

    /// Undamped angular frequency of one spring with its effective mass
    pub fn spring_frequency(&self, id: EntityId) -> Result<f64> {
        let spring = self.spring(id).ok_or(SimError::UnknownEntity(id))?;
        Ok(natural_frequency(spring.stiffness, self.effective_mass(spring)))
    }

    /// Remove springs whose mass endpoints no longer exist
    fn drop_dangling_springs(&mut self) {
        let dangling: Vec<EntityId> = self
            .springs()
            .filter(|(_, s)| s.masses().any(|m| self.mass(m).is_none()))
            .map(|(id, _)| id)
            .collect();
        for id in dangling {
            warn!("dropping spring {} with a missing endpoint", id);
            self.elements.remove(id);
        }
    }

    fn conservation(&self) -> ConservationSnapshot {
        let mut potential = 0.0;
        for (_, spring) in self.springs() {
            if let (Some(pa), Some(pb)) = (self.endpoint_position(spring.a), self.endpoint_position(spring.b)) {
                potential += spring_potential(spring.stiffness, spring.rest_length, pa, pb);
            }
        }
        ConservationSnapshot::from_points(self.masses().map(|(_, m)| (m.mass, m.position, m.velocity)))
            .with_potential(potential)
    }

    fn endpoint_position(&self, end: Endpoint) -> Option<Vec2> {
        match end {
            Endpoint::Wall(p) => Some(p),
            Endpoint::Entity(id) => self.mass(id).map(|m| m.position),
        }
    }

    fn check_endpoint(&self, end: Endpoint) -> Result<()> {
        match end {
            Endpoint::Wall(p) if p.is_finite() => Ok(()),
            Endpoint::Wall(p) => Err(SimError::invalid("anchor", format!("{p:?}"), "must be finite")),
            Endpoint::Entity(id) => match self.elements.get(id) {
                Some(Element::Mass(_)) => Ok(()),
                Some(Element::Spring(_)) => Err(SimError::WrongEntityKind { id, expected: "mass" }),
                None => Err(SimError::UnknownEntity(id)),
            },
        }
    }

    fn set_global(&mut self, key: &str, value: &ParamValue) -> Result<()> {
        match key {
            "damping" => {
                self.damping = match value {
                    ParamValue::Number(_) => DampingType::Custom(value.non_negative(key)?),
                    _ => {
                        let name = value.choice(key)?;
                        DampingType::parse(name).ok_or_else(|| SimError::invalid(key, name, "unknown damping type"))?
                    }
                };
            }
            "drive_amplitude" => self.drive.amplitude = value.number(key)?,
            "drive_frequency" => self.drive.frequency = value.non_negative(key)?,
            "integrator" => {
                let name = value.choice(key)?;
                self.method = Method::parse(name).ok_or_else(|| SimError::invalid(key, name, "unknown integrator"))?;
            }
            "time_scale" | "max_substeps" => self.config.set(key, value)?,
            "trail_length" => {
                self.config.set(key, value)?;
                let len = self.config.trail_length;
                for (_, element) in self.elements.iter_mut() {
                    if let Element::Mass(m) = element {
                        m.trail.set_max_length(len);
                    }
                }
            }
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    fn set_on_element(&mut self, id: EntityId, key: &str, value: &ParamValue) -> Result<()> {
        match self.elements.get_mut(id).ok_or(SimError::UnknownEntity(id))? {
            Element::Mass(m) => match key {
                "mass" => m.mass = value.positive(key)?,
                "radius" => m.radius = value.positive(key)?,
                "x" => m.position.x = value.number(key)?,
                "y" => m.position.y = value.number(key)?,
                "vx" => m.velocity.x = value.number(key)?,
                "vy" => m.velocity.y = value.number(key)?,
                "driven" => m.driven = value.flag(key)?,
                _ => return Err(SimError::UnknownParameter(key.to_string())),
            },
            Element::Spring(s) => match key {
                "stiffness" => s.stiffness = value.positive(key)?,
                "rest_length" => s.rest_length = value.non_negative(key)?,
                // A number pins this spring's coefficient; "default" hands it back to the lab
                "damping" => {
                    s.damping = match value {
                        ParamValue::Choice(c) if c == "default" => None,
                        _ => Some(value.non_negative(key)?),
                    }
                }
                _ => return Err(SimError::UnknownParameter(key.to_string())),
            },
        }
        Ok(())
    }
}

impl Default for OscillationsLab {
    fn default() -> Self {
        Self::new()
    }
}

impl Lab for OscillationsLab {
    type Spec = ElementSpec;
    type Entity = Element;

    fn step(&mut self, dt: f64) -> Snapshot<Element> {
        let span = clamp_dt(dt, self.config.max_dt) * self.config.time_scale;
        let (n, h) = substeps(span, self.config.max_dt, self.config.max_substeps);
        if n == 0 {
            return self.snapshot();
        }
        self.drop_dangling_springs();

        let ids: Vec<EntityId> = self.masses().map(|(id, _)| id).collect();
        if ids.is_empty() {
            self.time += span;
            return self.snapshot();
        }
        let index: BTreeMap<EntityId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let points: Vec<Kinematic<Vec2>> = self
            .masses()
            .map(|(_, m)| Kinematic::new(m.position, m.velocity))
            .collect();
        let masses: Vec<f64> = self.masses().map(|(_, m)| m.mass).collect();
        let driven: Vec<bool> = self.masses().map(|(_, m)| m.driven).collect();

        let anchor = |e: Endpoint| match e {
            Endpoint::Wall(p) => Some(Anchor::Fixed(p)),
            Endpoint::Entity(id) => index.get(&id).map(|&i| Anchor::Point(i)),
        };
        let links: Vec<Link> = self
            .springs()
            .filter_map(|(_, s)| {
                Some(Link {
                    a: anchor(s.a)?,
                    b: anchor(s.b)?,
                    k: s.stiffness,
                    rest: s.rest_length,
                    damping: self.damping_coefficient(s),
                })
            })
            .collect();
        let drive = self.drive;

        let accel = |t: f64, state: &[Kinematic<Vec2>]| -> Vec<Vec2> {
            let mut forces = vec![Vec2::ZERO; state.len()];
            for link in &links {
                let (pa, va) = locate(link.a, state);
                let (pb, vb) = locate(link.b, state);
                let on_b = spring_force(link.k, link.rest, pa, pb) + spring_damping(link.damping, pa, pb, vb - va);
                if let Anchor::Point(i) = link.a {
                    forces[i] -= on_b;
                }
                if let Anchor::Point(j) = link.b {
                    forces[j] += on_b;
                }
            }
            if drive.amplitude != 0.0 {
                let push = driving_force(drive.amplitude, drive.frequency, t);
                for (f, _) in forces.iter_mut().zip(&driven).filter(|(_, d)| **d) {
                    f.x += push;
                }
            }
            forces.iter().zip(&masses).map(|(f, m)| *f / *m).collect()
        };

        let mut state = points;
        for _ in 0..n {
            state = self.method.advance(&state, self.time, h, &accel);
            self.time += h;
        }

        for (id, k) in ids.into_iter().zip(state) {
            if let Some(Element::Mass(m)) = self.elements.get_mut(id) {
                m.position = k.position;
                m.velocity = k.velocity;
                m.trail.push(k.position);
            }
        }
        self.snapshot()
    }

    fn add_entity(&mut self, spec: ElementSpec) -> Result<EntityId> {
        let element = match spec {
            ElementSpec::Mass(m) => {
                require_positive("mass", m.mass)?;
                require_positive("radius", m.radius)?;
                Element::Mass(Mass {
                    position: m.position,
                    velocity: m.velocity,
                    mass: m.mass,
                    radius: m.radius,
                    driven: m.driven,
                    trail: Trail::new(self.config.trail_length),
                })
            }
            ElementSpec::Spring(s) => {
                require_positive("stiffness", s.stiffness)?;
                if !(s.rest_length >= 0.0 && s.rest_length.is_finite()) {
                    return Err(SimError::invalid("rest_length", s.rest_length, "must not be negative"));
                }
                if let Some(b) = s.damping {
                    ParamValue::Number(b).non_negative("damping")?;
                }
                self.check_endpoint(s.a)?;
                self.check_endpoint(s.b)?;
                Element::Spring(s)
            }
        };
        Ok(self.elements.insert(element))
    }

    /// Removing a mass leaves its springs in place; they are dropped on the next step
    fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.elements.remove(id).map(|_| ()).ok_or(SimError::UnknownEntity(id))
    }

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()> {
        match target {
            Target::Global => self.set_global(key, &value),
            Target::Entity(id) => self.set_on_element(id, key, &value),
        }
    }

    fn load_preset(&mut self, name: &str) -> Result<Snapshot<Element>> {
        self.reset();
        presets::build(self, name)?;
        self.tracker.freeze(self.conservation());
        info!(
            "loaded oscillations preset `{}`: {} masses, {} springs",
            name,
            self.masses().count(),
            self.springs().count()
        );
        Ok(self.snapshot())
    }

    fn presets(&self) -> &'static [&'static str] {
        presets::NAMES
    }

    fn query_invariants(&self) -> InvariantReport {
        self.tracker.report(self.conservation())
    }

    fn snapshot(&self) -> Snapshot<Element> {
        Snapshot {
            time: self.time,
            entities: self.elements.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.elements.clear();
        self.tracker.clear();
        self.time = 0.0;
        self.damping = DampingType::None;
        self.drive = Drive::default();
        self.method = Method::Rk4;
        self.config = self.defaults.clone();
    }
}
