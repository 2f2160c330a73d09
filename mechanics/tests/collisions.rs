use approx::assert_abs_diff_eq;
use common::{CollisionKind, EntityId, Lab, Method, SimError, Target, Vec2};
use mechanics::{BallSpec, MechanicsLab};

const FRAME: f64 = 1.0 / 60.0;

fn run(lab: &mut MechanicsLab, frames: usize) {
    for _ in 0..frames {
        lab.step(FRAME);
    }
}

fn total_momentum(lab: &MechanicsLab) -> Vec2 {
    lab.snapshot().entities.iter().map(|(_, b)| b.momentum()).sum()
}

fn total_kinetic(lab: &MechanicsLab) -> f64 {
    lab.snapshot().entities.iter().map(|(_, b)| b.kinetic_energy()).sum()
}

#[test]
fn head_on_equal_masses_swap_velocities() {
    let mut lab = MechanicsLab::new();
    let snapshot = lab.load_preset("head_on").unwrap();
    let ids: Vec<EntityId> = snapshot.entities.iter().map(|(id, _)| *id).collect();

    // Contact happens at t = 1.4 s; the walls are not reached before t = 8 s
    run(&mut lab, 150);

    let a = lab.ball(ids[0]).unwrap();
    let b = lab.ball(ids[1]).unwrap();
    assert_abs_diff_eq!(a.velocity.x, -50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(a.velocity.y, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.velocity.x, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.velocity.y, 0.0, epsilon = 1e-9);
    assert!(b.position.x - a.position.x >= 60.0 - 1e-9);
}

#[test]
fn elastic_collisions_conserve_momentum_and_energy() {
    let mut lab = MechanicsLab::new();
    lab.load_preset("glancing").unwrap();
    lab.set_parameter(Target::Global, "walls", false.into()).unwrap();

    let p0 = total_momentum(&lab);
    let e0 = total_kinetic(&lab);
    run(&mut lab, 240);

    let p1 = total_momentum(&lab);
    assert_abs_diff_eq!(p1.x, p0.x, epsilon = 1e-9 * p0.length());
    assert_abs_diff_eq!(p1.y, p0.y, epsilon = 1e-9 * p0.length().max(1.0));
    assert_abs_diff_eq!(total_kinetic(&lab), e0, epsilon = 1e-9 * e0);

    let report = lab.query_invariants();
    assert_abs_diff_eq!(report.energy_ratio.unwrap(), 100.0, epsilon = 1e-6);
}

#[test]
fn glancing_hit_deflects_both_balls() {
    let mut lab = MechanicsLab::new();
    let snapshot = lab.load_preset("glancing").unwrap();
    let ids: Vec<EntityId> = snapshot.entities.iter().map(|(id, _)| *id).collect();
    run(&mut lab, 180);

    let striker = lab.ball(ids[0]).unwrap();
    let target = lab.ball(ids[1]).unwrap();
    assert!(striker.velocity.y > 0.0);
    assert!(target.velocity.y < 0.0);
    // Equal masses, elastic: outgoing paths are perpendicular
    assert_abs_diff_eq!(striker.velocity.dot(target.velocity), 0.0, epsilon = 1e-6);
}

#[test]
fn perfectly_inelastic_loses_kinetic_energy_and_keeps_momentum() {
    let mut lab = MechanicsLab::new();
    lab.load_preset("unequal_masses").unwrap();
    lab.set_parameter(Target::Global, "collision_type", "perfectly_inelastic".into())
        .unwrap();

    let p0 = total_momentum(&lab);
    let e0 = total_kinetic(&lab);
    let com0 = lab.center_of_mass();
    run(&mut lab, 180);

    assert!(total_kinetic(&lab) < e0);
    assert_abs_diff_eq!(total_momentum(&lab).x, p0.x, epsilon = 1e-9);

    let balls: Vec<(Vec2, Vec2)> = lab
        .snapshot()
        .entities
        .iter()
        .map(|(_, b)| (b.position, b.velocity))
        .collect();
    let v_cm = 120.0 / 5.0;
    assert_abs_diff_eq!(balls[0].1.x, balls[1].1.x, epsilon = 1e-12);
    assert_abs_diff_eq!(balls[0].1.x, v_cm, epsilon = 1e-9);

    // Merged at the mass-weighted centre, which drifts at v_cm
    let expected = com0 + Vec2::new(v_cm * lab.time(), 0.0);
    for (position, _) in &balls {
        assert_abs_diff_eq!(position.x, expected.x, epsilon = 1e-6);
        assert_abs_diff_eq!(position.y, expected.y, epsilon = 1e-9);
    }
}

#[test]
fn inelastic_collision_keeps_momentum_and_sheds_energy() {
    let mut lab = MechanicsLab::new();
    lab.load_preset("head_on").unwrap();
    lab.set_parameter(Target::Global, "restitution", 0.5.into()).unwrap();
    lab.set_parameter(Target::Global, "collision_type", "inelastic".into()).unwrap();

    run(&mut lab, 150);
    let speeds: Vec<f64> = lab
        .snapshot()
        .entities
        .iter()
        .map(|(_, b)| b.velocity.x)
        .collect();
    assert_abs_diff_eq!(speeds[0], -25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(speeds[1], 25.0, epsilon = 1e-9);
}

#[test]
fn newtons_cradle_passes_motion_to_the_last_ball() {
    let mut lab = MechanicsLab::new();
    let snapshot = lab.load_preset("newtons_cradle").unwrap();
    let first = snapshot.entities[0].0;
    let last = snapshot.entities[snapshot.len() - 1].0;

    run(&mut lab, 120);

    let first = lab.ball(first).unwrap();
    let last = lab.ball(last).unwrap();
    assert_abs_diff_eq!(first.velocity.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(last.velocity.x, 150.0, epsilon = 1e-9);
}

#[test]
fn gas_preset_is_deterministic_and_stays_in_the_box() {
    let mut a = MechanicsLab::new();
    let mut b = MechanicsLab::new();
    a.load_preset("gas").unwrap();
    b.load_preset("gas").unwrap();
    run(&mut a, 300);
    run(&mut b, 300);

    let (sa, sb) = (a.snapshot(), b.snapshot());
    for ((_, ba), (_, bb)) in sa.entities.iter().zip(&sb.entities) {
        assert_eq!(ba.position, bb.position);
        assert!(ba.position.x >= ba.radius - 1e-9 && ba.position.x <= 800.0 - ba.radius + 1e-9);
        assert!(ba.position.y >= ba.radius - 1e-9 && ba.position.y <= 600.0 - ba.radius + 1e-9);
    }
}

#[test]
fn removing_a_ball_and_unknown_presets() {
    let mut lab = MechanicsLab::new();
    let snapshot = lab.load_preset("head_on").unwrap();
    let id = snapshot.entities[0].0;
    lab.remove_entity(id).unwrap();
    assert_eq!(lab.len(), 1);
    assert!(matches!(lab.remove_entity(id), Err(SimError::UnknownEntity(_))));
    assert!(matches!(lab.load_preset("nope"), Err(SimError::UnknownPreset(_))));

    lab.reset();
    assert!(lab.is_empty());
    assert!(lab.query_invariants().initial.is_none());
}

#[test]
fn new_ids_are_not_reused_after_reset() {
    let mut lab = MechanicsLab::new();
    let first = lab
        .add_entity(BallSpec::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0, 5.0))
        .unwrap();
    lab.reset();
    let second = lab
        .add_entity(BallSpec::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0, 5.0))
        .unwrap();
    assert_ne!(first, second);
}

#[test]
fn presets_restore_default_settings() {
    let mut lab = MechanicsLab::new();
    lab.load_preset("head_on").unwrap();
    lab.set_parameter(Target::Global, "integrator", "rk4".into()).unwrap();
    lab.set_parameter(Target::Global, "restitution", 0.2.into()).unwrap();
    lab.set_parameter(Target::Global, "time_scale", 5.0.into()).unwrap();
    run(&mut lab, 30);

    lab.load_preset("head_on").unwrap();
    assert_eq!(lab.method(), Method::SemiImplicitEuler);
    lab.set_parameter(Target::Global, "collision_type", "inelastic".into()).unwrap();
    assert_eq!(lab.collision_kind(), CollisionKind::Inelastic { restitution: 0.8 });

    // Same frames as a fresh lab, so same trajectory
    let mut fresh = MechanicsLab::new();
    fresh.load_preset("head_on").unwrap();
    fresh.set_parameter(Target::Global, "collision_type", "inelastic".into()).unwrap();
    run(&mut lab, 150);
    run(&mut fresh, 150);
    assert_eq!(lab.snapshot().time, fresh.snapshot().time);
    for ((_, a), (_, b)) in lab.snapshot().entities.iter().zip(&fresh.snapshot().entities) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}
