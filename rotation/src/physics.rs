//! Rigid rotors spinning about a fixed axis
//!
//! Each rotor has a shape, mass and radius, from which its moment of inertia
//! follows as `I = factor * m * r²`. The net torque is the applied torque
//! minus viscous friction `friction * ω * k`, and `α = τ/I`.

use common::forces::{angular_acceleration, net_torque};
use common::{
    clamp_dt, substeps, Arena, ConservationSnapshot, ConservationTracker, EntityId, InvariantReport, Lab, ParamValue,
    Result, SimConfig, SimError, Snapshot, Target, Vec2,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::presets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    SolidDisk,
    Ring,
    SolidSphere,
    HollowSphere,
    /// Thin rod spun about its centre; `radius` is its full length
    Rod,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::SolidDisk,
        Shape::Ring,
        Shape::SolidSphere,
        Shape::HollowSphere,
        Shape::Rod,
    ];

    /// Coefficient in `I = factor * m * r²`
    pub fn inertia_factor(&self) -> f64 {
        match self {
            Shape::SolidDisk => 0.5,
            Shape::Ring => 1.0,
            Shape::SolidSphere => 0.4,
            Shape::HollowSphere => 2.0 / 3.0,
            Shape::Rod => 1.0 / 12.0,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "solid_disk" | "disk" => Some(Shape::SolidDisk),
            "ring" => Some(Shape::Ring),
            "solid_sphere" | "sphere" => Some(Shape::SolidSphere),
            "hollow_sphere" => Some(Shape::HollowSphere),
            "rod" => Some(Shape::Rod),
            _ => None,
        }
    }
}

/// A rigid body spinning about its centre.
///
/// Mass, radius and shape are private so the moment of inertia can only be
/// changed through the setters, which recompute it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotator {
    shape: Shape,
    mass: f64,
    radius: f64,
    inertia: f64,
    /// Where the rotor is drawn; it never translates
    pub position: Vec2,
    pub angle: f64,
    pub omega: f64,
    /// Angular acceleration from the last step
    pub alpha: f64,
    pub applied_torque: f64,
}

impl Rotator {
    pub fn new(shape: Shape, mass: f64, radius: f64) -> Result<Self> {
        let mut rotor = Self {
            shape,
            mass: 0.0,
            radius: 0.0,
            inertia: 0.0,
            position: Vec2::ZERO,
            angle: 0.0,
            omega: 0.0,
            alpha: 0.0,
            applied_torque: 0.0,
        };
        rotor.set_mass(mass)?;
        rotor.set_radius(radius)?;
        Ok(rotor)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        self.mass = ParamValue::Number(mass).positive("mass")?;
        self.update_inertia();
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.radius = ParamValue::Number(radius).positive("radius")?;
        self.update_inertia();
        Ok(())
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.update_inertia();
    }

    fn update_inertia(&mut self) {
        self.inertia = self.shape.inertia_factor() * self.mass * self.radius * self.radius;
    }

    pub fn angular_momentum(&self) -> f64 {
        self.inertia * self.omega
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.inertia * self.omega * self.omega
    }

    /// Advance one step with semi-implicit Euler. Friction alone can bring the
    /// rotor to rest but never reverse its spin.
    fn advance(&mut self, friction: f64, friction_k: f64, dt: f64) {
        let torque = net_torque(self.applied_torque, friction, self.omega, friction_k);
        self.alpha = match angular_acceleration(torque, self.inertia) {
            Ok(alpha) => alpha,
            Err(e) => {
                debug!("rotor held still: {}", e);
                0.0
            }
        };

        let mut omega = self.omega + self.alpha * dt;
        let driven = self.omega + self.applied_torque / self.inertia * dt;
        if self.omega * driven >= 0.0 && self.omega * omega < 0.0 {
            omega = 0.0;
        }

        self.omega = omega;
        self.angle = (self.angle + self.omega * dt).rem_euclid(std::f64::consts::TAU);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatorSpec {
    pub shape: Shape,
    pub mass: f64,
    pub radius: f64,
    pub position: Vec2,
    pub omega: f64,
    pub torque: f64,
}

impl RotatorSpec {
    pub fn new(shape: Shape, mass: f64, radius: f64) -> Self {
        Self {
            shape,
            mass,
            radius,
            position: Vec2::ZERO,
            omega: 0.0,
            torque: 0.0,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn spinning(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_torque(mut self, torque: f64) -> Self {
        self.torque = torque;
        self
    }
}

pub struct RotationLab {
    rotators: Arena<Rotator>,
    /// Viscous friction coefficient
    friction: f64,
    /// Scale applied to the friction torque
    friction_k: f64,
    time: f64,
    config: SimConfig,
    defaults: SimConfig,
    tracker: ConservationTracker,
}

impl RotationLab {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            rotators: Arena::new(),
            friction: 0.0,
            friction_k: 1.0,
            time: 0.0,
            defaults: config.clone(),
            config,
            tracker: ConservationTracker::new(),
        }
    }

    pub fn rotator(&self, id: EntityId) -> Option<&Rotator> {
        self.rotators.get(id)
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub(crate) fn set_friction(&mut self, friction: f64) {
        self.friction = friction;
    }

    /// Spin rate at which friction balances a constant applied torque
    pub fn terminal_omega(&self, torque: f64) -> Option<f64> {
        let drag = self.friction * self.friction_k;
        (drag > 0.0).then(|| torque / drag)
    }

    fn conservation(&self) -> ConservationSnapshot {
        ConservationSnapshot::from_rotors(self.rotators.values().map(|r| (r.inertia, r.omega)))
    }

    fn set_on_rotator(&mut self, id: EntityId, key: &str, value: &ParamValue) -> Result<()> {
        let rotor = self.rotators.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        match key {
            "mass" => rotor.set_mass(value.number(key)?)?,
            "radius" => rotor.set_radius(value.number(key)?)?,
            "shape" => {
                let name = value.choice(key)?;
                let shape = Shape::parse(name).ok_or_else(|| SimError::invalid(key, name, "unknown shape"))?;
                rotor.set_shape(shape);
            }
            "omega" => rotor.omega = value.number(key)?,
            "angle" => rotor.angle = value.number(key)?,
            "torque" => rotor.applied_torque = value.number(key)?,
            _ => return Err(SimError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

impl Default for RotationLab {
    fn default() -> Self {
        Self::new()
    }
}

impl Lab for RotationLab {
    type Spec = RotatorSpec;
    type Entity = Rotator;

    fn step(&mut self, dt: f64) -> Snapshot<Rotator> {
        let span = clamp_dt(dt, self.config.max_dt) * self.config.time_scale;
        let (n, h) = substeps(span, self.config.max_dt, self.config.max_substeps);
        let (friction, k) = (self.friction, self.friction_k);
        for _ in 0..n {
            for (_, rotor) in self.rotators.iter_mut() {
                rotor.advance(friction, k, h);
            }
            self.time += h;
        }
        self.snapshot()
    }

    fn add_entity(&mut self, spec: RotatorSpec) -> Result<EntityId> {
        let mut rotor = Rotator::new(spec.shape, spec.mass, spec.radius)?;
        rotor.position = spec.position;
        rotor.omega = ParamValue::Number(spec.omega).number("omega")?;
        rotor.applied_torque = ParamValue::Number(spec.torque).number("torque")?;
        Ok(self.rotators.insert(rotor))
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.rotators.remove(id).map(|_| ()).ok_or(SimError::UnknownEntity(id))
    }

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()> {
        match (target, key) {
            (Target::Global, "friction") => self.friction = value.non_negative(key)?,
            (Target::Global, "friction_k") => self.friction_k = value.non_negative(key)?,
            (Target::Global, "time_scale" | "max_substeps") => self.config.set(key, &value)?,
            (Target::Global, _) => return Err(SimError::UnknownParameter(key.to_string())),
            (Target::Entity(id), _) => return self.set_on_rotator(id, key, &value),
        }
        Ok(())
    }

    fn load_preset(&mut self, name: &str) -> Result<Snapshot<Rotator>> {
        self.reset();
        presets::build(self, name)?;
        self.tracker.freeze(self.conservation());
        info!("loaded rotation preset `{}` with {} rotors", name, self.rotators.len());
        Ok(self.snapshot())
    }

    fn presets(&self) -> &'static [&'static str] {
        presets::NAMES
    }

    fn query_invariants(&self) -> InvariantReport {
        self.tracker.report(self.conservation())
    }

    fn snapshot(&self) -> Snapshot<Rotator> {
        Snapshot {
            time: self.time,
            entities: self.rotators.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.rotators.clear();
        self.tracker.clear();
        self.time = 0.0;
        self.friction = 0.0;
        self.friction_k = 1.0;
        self.config = self.defaults.clone();
    }
}
