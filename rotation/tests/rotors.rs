use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::{EntityId, Lab, Target};
use rotation::{RotationLab, RotatorSpec, Shape};

const FRAME: f64 = 1.0 / 60.0;

fn only_rotor(lab: &RotationLab) -> EntityId {
    lab.snapshot().entities[0].0
}

#[test]
fn free_disk_keeps_exact_spin() {
    let mut lab = RotationLab::new();
    lab.load_preset("disk").unwrap();
    let id = only_rotor(&lab);
    assert_relative_eq!(lab.rotator(id).unwrap().inertia(), 6400.0);

    for frame in 0..1000 {
        let dt = if frame % 3 == 0 { 0.04 } else { FRAME };
        lab.step(dt);
        assert_eq!(lab.rotator(id).unwrap().omega, 5.0);
    }
    let report = lab.query_invariants();
    assert_relative_eq!(report.energy_ratio.unwrap(), 100.0);
    assert_relative_eq!(report.angular_momentum_ratio.unwrap(), 100.0);
    assert!(report.momentum_ratio.is_none());
}

#[test]
fn same_torque_spins_low_inertia_shapes_faster() {
    let mut lab = RotationLab::new();
    lab.load_preset("shape_race").unwrap();
    for _ in 0..60 {
        lab.step(FRAME);
    }
    let omega = |shape: Shape| {
        lab.snapshot()
            .entities
            .into_iter()
            .find(|(_, r)| r.shape() == shape)
            .map(|(_, r)| r.omega)
            .unwrap()
    };
    assert!(omega(Shape::Rod) > omega(Shape::SolidSphere));
    assert!(omega(Shape::SolidSphere) > omega(Shape::SolidDisk));
    assert!(omega(Shape::SolidDisk) > omega(Shape::HollowSphere));
    assert!(omega(Shape::HollowSphere) > omega(Shape::Ring));
    // Ring: α = τ / (m r²) = 1, for one second
    assert_relative_eq!(omega(Shape::Ring), 1.0, max_relative = 1e-9);
}

#[test]
fn friction_spins_down_without_reversing() {
    let mut lab = RotationLab::new();
    lab.load_preset("spin_down").unwrap();
    let id = only_rotor(&lab);

    let mut last = lab.rotator(id).unwrap().omega;
    for _ in 0..1200 {
        lab.step(FRAME);
        let omega = lab.rotator(id).unwrap().omega;
        assert!(omega >= 0.0 && omega <= last);
        last = omega;
    }
    // I = 4, friction 0.5: time constant 8 s, so 20 s leaves under 10%
    assert!(last < 1.0);
    assert!(lab.query_invariants().energy_ratio.unwrap() < 1.0);
}

#[test]
fn heavy_friction_stops_dead_in_one_step() {
    let mut lab = RotationLab::new();
    let id = lab
        .add_entity(RotatorSpec::new(Shape::SolidDisk, 1.0, 1.0).spinning(-4.0))
        .unwrap();
    lab.set_parameter(Target::Global, "friction", 1000.0.into()).unwrap();
    lab.step(0.05);
    assert_eq!(lab.rotator(id).unwrap().omega, 0.0);
}

#[test]
fn constant_torque_settles_at_terminal_spin() {
    let mut lab = RotationLab::new();
    lab.load_preset("terminal_spin").unwrap();
    let id = only_rotor(&lab);
    for _ in 0..1800 {
        lab.step(FRAME);
    }
    let terminal = lab.terminal_omega(2.0).unwrap();
    assert_relative_eq!(terminal, 4.0);
    assert_abs_diff_eq!(lab.rotator(id).unwrap().omega, terminal, epsilon = 1e-3);
}

#[test]
fn changing_radius_recomputes_inertia_only() {
    let mut lab = RotationLab::new();
    lab.load_preset("disk").unwrap();
    let id = only_rotor(&lab);
    lab.set_parameter(Target::Entity(id), "radius", 40.0.into()).unwrap();
    let rotor = lab.rotator(id).unwrap();
    assert_relative_eq!(rotor.inertia(), 1600.0);
    assert_eq!(rotor.omega, 5.0);

    lab.set_parameter(Target::Entity(id), "shape", "ring".into()).unwrap();
    assert_relative_eq!(lab.rotator(id).unwrap().inertia(), 3200.0);
    assert!(lab.set_parameter(Target::Entity(id), "mass", 0.0.into()).is_err());
    assert_relative_eq!(lab.rotator(id).unwrap().inertia(), 3200.0);
}

#[test]
fn fast_playback_tracks_the_exact_spin_down() {
    let mut lab = RotationLab::new();
    lab.load_preset("spin_down").unwrap();
    let id = only_rotor(&lab);
    lab.set_parameter(Target::Global, "time_scale", 20.0.into()).unwrap();
    for _ in 0..60 {
        lab.step(FRAME);
    }
    assert_abs_diff_eq!(lab.time(), 20.0, epsilon = 1e-9);
    // ω(t) = ω0 * exp(-friction * t / I) with I = 4
    let exact = 10.0 * (-0.5 * 20.0 / 4.0_f64).exp();
    assert_relative_eq!(lab.rotator(id).unwrap().omega, exact, max_relative = 0.02);
}

#[test]
fn presets_start_at_normal_speed() {
    let mut lab = RotationLab::new();
    lab.load_preset("disk").unwrap();
    lab.set_parameter(Target::Global, "time_scale", 50.0.into()).unwrap();
    assert!(lab.set_parameter(Target::Global, "time_scale", 500.0.into()).is_err());

    lab.load_preset("disk").unwrap();
    lab.step(FRAME);
    assert_abs_diff_eq!(lab.time(), FRAME, epsilon = 1e-12);
}
