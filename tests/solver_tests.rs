use approx::assert_relative_eq;
use atom_physics::{
    collision::contact::{AtomContact, ContactSet, ContactTuning},
    dynamics::friction::apply_friction,
    Arena, Atom, BodyId, ContactSolver, RigidBody, SimulationConfig, Vec2,
};
use proptest::prelude::*;

const TUNING: ContactTuning = ContactTuning {
    bias_factor: 0.2,
    penetration_decay: 0.5,
    dt: 1.0 / 60.0,
};

struct Scene {
    atoms: Arena<Atom>,
    bodies: Arena<RigidBody>,
    body_a: BodyId,
    body_b: BodyId,
    contact: AtomContact,
}

/// Two single-atom bodies with B placed at `offset` from A.
fn scene(offset: Vec2, b_moving: bool) -> Scene {
    let mut atoms = Arena::new();
    let mut bodies = Arena::new();
    let body_a = bodies.insert(RigidBody::dynamic(BodyId::default()));
    let body_b = bodies.insert(RigidBody::new(BodyId::default(), b_moving));
    let origin = Vec2::new(200.0, 200.0);
    for (body, position) in [(body_a, origin), (body_b, origin + offset)] {
        let atom = atoms.insert(Atom::new(position, 8.0, 1.0).unwrap());
        let stored = bodies.get_mut(body).unwrap();
        stored.id = body;
        stored.add_atom(atom, &mut atoms);
    }
    let ids: Vec<_> = atoms.ids().collect();
    let mut contact = AtomContact::new(ids[0], ids[1], body_a, body_b);
    contact.refresh(&atoms, &bodies, &TUNING);
    Scene {
        atoms,
        bodies,
        body_a,
        body_b,
        contact,
    }
}

fn velocity() -> impl Strategy<Value = Vec2> {
    (-800.0f32..800.0, -800.0f32..800.0).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #[test]
    fn accumulated_normal_impulse_never_goes_negative(
        angle in 0.0f32..std::f32::consts::TAU,
        distance in 6.0f32..16.9,
        v_a in velocity(),
        v_b in velocity(),
        spin in -20.0f32..20.0,
    ) {
        let mut s = scene(Vec2::from_angle(angle) * distance, true);
        let (a, b) = s.bodies.get2_mut(s.body_a, s.body_b).unwrap();
        a.set_velocity(v_a, spin);
        b.set_velocity(v_b, -spin);

        for _ in 0..16 {
            apply_friction(a, b, &mut s.contact, 0.2);
            s.contact.solve_normal(a, b, 1.0e6);
            prop_assert!(s.contact.accumulated_impulse() >= 0.0);
            prop_assert!(s.contact.accumulated_impulse().is_finite());
        }
    }

    #[test]
    fn friction_stays_within_coulomb_bound(
        angle in 0.0f32..std::f32::consts::TAU,
        distance in 6.0f32..16.9,
        v_a in velocity(),
        friction in 0.0f32..1.5,
    ) {
        let mut s = scene(Vec2::from_angle(angle) * distance, false);
        let (a, b) = s.bodies.get2_mut(s.body_a, s.body_b).unwrap();
        a.set_velocity(v_a, 0.0);

        for _ in 0..8 {
            let bound = friction * s.contact.last_impulse().abs();
            let lambda = apply_friction(a, b, &mut s.contact, friction);
            prop_assert!(lambda.abs() <= bound + 1e-3 * bound.max(1.0));
            s.contact.solve_normal(a, b, 1.0e6);
        }
    }
}

#[test]
fn warm_start_reapplies_last_frame_impulse() {
    let mut s = scene(Vec2::new(15.0, 0.0), true);
    {
        let (a, b) = s.bodies.get2_mut(s.body_a, s.body_b).unwrap();
        b.set_velocity(Vec2::new(-100.0, 0.0), 0.0);
        s.contact.solve_normal(a, b, 1.0e6);
    }
    let accumulated = s.contact.accumulated_impulse();
    assert!(accumulated > 0.0);

    for body in s.bodies.values_mut() {
        body.set_velocity(Vec2::ZERO, 0.0);
    }
    s.contact.warm_start(&s.atoms, &mut s.bodies);

    // Normal points from B to A, i.e. -X; each unit mass gets the whole impulse.
    assert_relative_eq!(s.bodies.get(s.body_a).unwrap().velocity().x, -accumulated);
    assert_relative_eq!(s.bodies.get(s.body_b).unwrap().velocity().x, accumulated);
}

#[test]
fn max_impulse_caps_a_single_step() {
    let mut s = scene(Vec2::new(15.0, 0.0), true);
    let (a, b) = s.bodies.get2_mut(s.body_a, s.body_b).unwrap();
    b.set_velocity(Vec2::new(-5000.0, 0.0), 0.0);
    let lambda = s.contact.solve_normal(a, b, 100.0);
    assert_eq!(lambda, 100.0);
    assert_eq!(s.contact.accumulated_impulse(), 100.0);
}

#[test]
fn position_correction_stays_out_of_real_velocity() {
    let solver = ContactSolver::from_config(&SimulationConfig::default());
    let mut s = scene(Vec2::new(14.0, 0.0), true);
    let mut contacts = ContactSet::new();
    contacts.insert(s.contact.clone());

    let metrics = solver.solve(&mut s.bodies, &mut contacts);
    assert_eq!(metrics.contacts_solved, 1);

    let a = s.bodies.get(s.body_a).unwrap();
    let b = s.bodies.get(s.body_b).unwrap();
    // Nothing was approaching, so only the bias channel moved.
    assert_eq!(a.velocity(), Vec2::ZERO);
    assert_eq!(b.velocity(), Vec2::ZERO);
    assert!(a.velocity_bias().x < 0.0);
    assert!(b.velocity_bias().x > 0.0);
}

#[test]
fn solver_reports_loud_contacts() {
    let mut config = SimulationConfig::default();
    config.impact_loudness = 50.0;
    let solver = ContactSolver::from_config(&config);

    let mut s = scene(Vec2::new(15.0, 0.0), true);
    s.bodies
        .get_mut(s.body_b)
        .unwrap()
        .set_velocity(Vec2::new(-300.0, 0.0), 0.0);
    let mut contacts = ContactSet::new();
    contacts.insert(s.contact.clone());

    let metrics = solver.solve(&mut s.bodies, &mut contacts);
    assert_eq!(metrics.impacts.len(), 1);
    assert!(metrics.impacts[0].impulse > 50.0);
    assert!(metrics.normal_impulse_sum > 0.0);
}
