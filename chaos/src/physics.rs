//! The chaos lab: double pendulums and Lorenz tracers side by side
//!
//! Every frame is split into RK4 sub-steps no longer than `chaos_step`, so
//! trajectories do not depend on the frame rate that drives them. At most
//! `max_substeps` are taken per frame; past that the steps grow instead.

use common::{
    clamp_dt, substeps, Arena, ConservationSnapshot, ConservationTracker, EntityId, InvariantReport, Lab, ParamValue,
    Result, SimConfig, SimError, Snapshot, Target, Vec3,
};
use log::{debug, info};

use crate::lorenz::{LorenzParams, LorenzTracer};
use crate::pendulum::{DoublePendulum, PendulumParams};
use crate::presets;

#[derive(Debug, Clone)]
pub enum System {
    Pendulum(DoublePendulum),
    Lorenz(LorenzTracer),
}

impl System {
    fn kind(&self) -> &'static str {
        match self {
            System::Pendulum(_) => "pendulum",
            System::Lorenz(_) => "lorenz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SystemSpec {
    Pendulum {
        params: PendulumParams,
        theta1: f64,
        theta2: f64,
    },
    Lorenz(Vec3),
}

pub struct ChaosLab {
    systems: Arena<System>,
    lorenz: LorenzParams,
    time: f64,
    config: SimConfig,
    defaults: SimConfig,
    tracker: ConservationTracker,
}

impl ChaosLab {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            systems: Arena::new(),
            lorenz: LorenzParams::default(),
            time: 0.0,
            defaults: config.clone(),
            config,
            tracker: ConservationTracker::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn lorenz_params(&self) -> LorenzParams {
        self.lorenz
    }

    pub fn system(&self, id: EntityId) -> Option<&System> {
        self.systems.get(id)
    }

    pub fn pendulum(&self, id: EntityId) -> Option<&DoublePendulum> {
        match self.systems.get(id) {
            Some(System::Pendulum(p)) => Some(p),
            _ => None,
        }
    }

    pub fn tracer(&self, id: EntityId) -> Option<&LorenzTracer> {
        match self.systems.get(id) {
            Some(System::Lorenz(t)) => Some(t),
            _ => None,
        }
    }

    /// Euclidean distance between two systems of the same kind, in state space.
    /// Tracks how fast nearby starts drift apart.
    pub fn separation(&self, a: EntityId, b: EntityId) -> Result<f64> {
        let first = self.systems.get(a).ok_or(SimError::UnknownEntity(a))?;
        let second = self.systems.get(b).ok_or(SimError::UnknownEntity(b))?;
        match (first, second) {
            (System::Lorenz(x), System::Lorenz(y)) => Ok(x.state.distance(y.state)),
            (System::Pendulum(x), System::Pendulum(y)) => Ok(x
                .state
                .iter()
                .zip(&y.state)
                .map(|(p, q)| (p - q) * (p - q))
                .sum::<f64>()
                .sqrt()),
            (first, _) => Err(SimError::WrongEntityKind {
                id: b,
                expected: first.kind(),
            }),
        }
    }

    fn conservation(&self) -> ConservationSnapshot {
        let mut snap = ConservationSnapshot::default();
        for system in self.systems.values() {
            if let System::Pendulum(p) = system {
                let (r1, r2) = p.bob_positions();
                let (v1, v2) = p.bob_velocities();
                let part = ConservationSnapshot::from_points([(p.params.m1, r1, v1), (p.params.m2, r2, v2)]);
                let audit = p.energy();
                snap.momentum += part.momentum;
                snap.angular_momentum += part.angular_momentum;
                snap.energy += audit.total;
            }
        }
        snap
    }

    fn set_on_system(&mut self, id: EntityId, key: &str, value: &ParamValue) -> Result<()> {
        match self.systems.get_mut(id).ok_or(SimError::UnknownEntity(id))? {
            System::Pendulum(p) => match key {
                "m1" => p.params.m1 = value.positive(key)?,
                "m2" => p.params.m2 = value.positive(key)?,
                "l1" => p.params.l1 = value.positive(key)?,
                "l2" => p.params.l2 = value.positive(key)?,
                "g" => p.params.g = value.non_negative(key)?,
                "theta1" => p.state[0] = value.number(key)?,
                "theta2" => p.state[1] = value.number(key)?,
                "omega1" => p.state[2] = value.number(key)?,
                "omega2" => p.state[3] = value.number(key)?,
                _ => return Err(SimError::UnknownParameter(key.to_string())),
            },
            System::Lorenz(t) => match key {
                "x" => t.state.x = value.number(key)?,
                "y" => t.state.y = value.number(key)?,
                "z" => t.state.z = value.number(key)?,
                _ => return Err(SimError::UnknownParameter(key.to_string())),
            },
        }
        Ok(())
    }
}

impl Default for ChaosLab {
    fn default() -> Self {
        Self::new()
    }
}

fn check_pendulum(p: &PendulumParams) -> Result<()> {
    for (key, v) in [("m1", p.m1), ("m2", p.m2), ("l1", p.l1), ("l2", p.l2)] {
        ParamValue::Number(v).positive(key)?;
    }
    ParamValue::Number(p.g).non_negative("g")?;
    Ok(())
}

impl Lab for ChaosLab {
    type Spec = SystemSpec;
    type Entity = System;

    fn step(&mut self, dt: f64) -> Snapshot<System> {
        let span = clamp_dt(dt, self.config.max_dt) * self.config.time_scale;
        let (n, h) = substeps(span, self.config.chaos_step, self.config.max_substeps);
        if n == 0 {
            return self.snapshot();
        }
        debug!("chaos frame: {} RK4 sub-steps of {:.5}", n, h);

        let params = self.lorenz;
        for (_, system) in self.systems.iter_mut() {
            match system {
                System::Pendulum(p) => (0..n).for_each(|_| p.advance(h)),
                System::Lorenz(t) => (0..n).for_each(|_| t.advance(&params, h)),
            }
        }

        self.time += span;
        self.snapshot()
    }

    fn add_entity(&mut self, spec: SystemSpec) -> Result<EntityId> {
        let trail = self.config.trail_length;
        let system = match spec {
            SystemSpec::Pendulum { params, theta1, theta2 } => {
                check_pendulum(&params)?;
                let theta1 = ParamValue::Number(theta1).number("theta1")?;
                let theta2 = ParamValue::Number(theta2).number("theta2")?;
                System::Pendulum(DoublePendulum::new(params, theta1, theta2, trail))
            }
            SystemSpec::Lorenz(start) => {
                if !start.is_finite() {
                    return Err(SimError::invalid("start", format!("{start:?}"), "must be finite"));
                }
                System::Lorenz(LorenzTracer::new(start, trail))
            }
        };
        Ok(self.systems.insert(system))
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.systems.remove(id).map(|_| ()).ok_or(SimError::UnknownEntity(id))
    }

    fn set_parameter(&mut self, target: Target, key: &str, value: ParamValue) -> Result<()> {
        match (target, key) {
            (Target::Global, "sigma") => self.lorenz.sigma = value.number(key)?,
            (Target::Global, "rho") => self.lorenz.rho = value.number(key)?,
            (Target::Global, "beta") => self.lorenz.beta = value.number(key)?,
            (Target::Global, "chaos_step" | "time_scale" | "max_substeps") => self.config.set(key, &value)?,
            (Target::Global, "trail_length") => {
                self.config.set(key, &value)?;
                let len = self.config.trail_length;
                for (_, system) in self.systems.iter_mut() {
                    match system {
                        System::Pendulum(p) => p.trail.set_max_length(len),
                        System::Lorenz(t) => t.trail.set_max_length(len),
                    }
                }
            }
            (Target::Global, _) => return Err(SimError::UnknownParameter(key.to_string())),
            (Target::Entity(id), _) => return self.set_on_system(id, key, &value),
        }
        Ok(())
    }

    fn load_preset(&mut self, name: &str) -> Result<Snapshot<System>> {
        self.reset();
        presets::build(self, name)?;
        self.tracker.freeze(self.conservation());
        info!("loaded chaos preset `{}` with {} systems", name, self.systems.len());
        Ok(self.snapshot())
    }

    fn presets(&self) -> &'static [&'static str] {
        presets::NAMES
    }

    /// Energy and angular momentum summed over the pendulums; Lorenz tracers
    /// carry no conserved quantity
    fn query_invariants(&self) -> InvariantReport {
        self.tracker.report(self.conservation())
    }

    fn snapshot(&self) -> Snapshot<System> {
        Snapshot {
            time: self.time,
            entities: self.systems.snapshot(),
        }
    }

    fn reset(&mut self) {
        self.systems.clear();
        self.tracker.clear();
        self.time = 0.0;
        self.lorenz = LorenzParams::default();
        self.config = self.defaults.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tiny_chaos_step_is_rejected_and_substeps_stay_capped() {
        let mut lab = ChaosLab::new();
        lab.add_entity(SystemSpec::Lorenz(Vec3::new(1.0, 1.0, 1.0))).unwrap();
        let err = lab.set_parameter(Target::Global, "chaos_step", 1e-9.into());
        assert!(matches!(err, Err(SimError::InvalidParameter { .. })));
        assert_eq!(lab.config.chaos_step, 0.005);

        lab.set_parameter(Target::Global, "chaos_step", 1e-4.into()).unwrap();
        lab.set_parameter(Target::Global, "time_scale", 100.0.into()).unwrap();
        lab.set_parameter(Target::Global, "max_substeps", 50.0.into()).unwrap();
        let (n, h) = substeps(0.05 * 100.0, lab.config.chaos_step, lab.config.max_substeps);
        assert_eq!(n, 50);
        assert_relative_eq!(h, 0.1);

        lab.step(0.05);
        assert_relative_eq!(lab.time(), 5.0);
        assert!(lab.set_parameter(Target::Global, "max_substeps", 1e9.into()).is_err());

        lab.reset();
        assert_eq!(lab.config.chaos_step, 0.005);
        assert_eq!(lab.config.time_scale, 1.0);
    }

    #[test]
    fn separation_requires_matching_kinds() {
        let mut lab = ChaosLab::new();
        let p = lab
            .add_entity(SystemSpec::Pendulum {
                params: PendulumParams::default(),
                theta1: 1.0,
                theta2: 1.0,
            })
            .unwrap();
        let l = lab.add_entity(SystemSpec::Lorenz(Vec3::new(0.0, 1.0, 1.05))).unwrap();
        assert!(matches!(lab.separation(p, l), Err(SimError::WrongEntityKind { .. })));
        assert_eq!(lab.separation(l, l).unwrap(), 0.0);
    }

    #[test]
    fn rejects_bad_pendulum_parameters() {
        let mut lab = ChaosLab::new();
        let bad = lab.add_entity(SystemSpec::Pendulum {
            params: PendulumParams {
                l2: 0.0,
                ..PendulumParams::default()
            },
            theta1: 0.0,
            theta2: 0.0,
        });
        assert!(bad.is_err());
    }
}
