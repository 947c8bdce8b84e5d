use std::sync::Arc;

use approx::assert_relative_eq;
use atom_physics::{
    AnchorSpring, DragForce, ImpactEvent, ImpactSink, PhysicsError, PhysicsWorld,
    PolyphonicImpacts, RenderSink, RenderSnapshot, SimulationConfig, Vec2,
};
use parking_lot::Mutex;

const DT: f32 = 1.0 / 60.0;

fn weightless() -> SimulationConfig {
    SimulationConfig::default()
        .with_gravity(Vec2::ZERO)
        .with_friction(0.2)
        .with_solver_iterations(8)
}

/// Static row of atoms spaced one diameter apart, left edge at `x0`.
fn floor(world: &mut PhysicsWorld, x0: f32, y: f32, count: usize) {
    let body = world.create_body(false);
    for i in 0..count {
        world
            .add_atom(body, Vec2::new(x0 + i as f32 * 16.0, y), 8.0, 1.0)
            .unwrap();
    }
}

#[test]
fn overlapping_atoms_are_pushed_apart() {
    let mut world = PhysicsWorld::new(weightless()).unwrap();
    let body_a = world.create_body(true);
    let body_b = world.create_body(true);
    let a = world.add_atom(body_a, Vec2::new(100.0, 100.0), 8.0, 1.0).unwrap();
    let b = world.add_atom(body_b, Vec2::new(115.0, 100.0), 8.0, 1.0).unwrap();

    for _ in 0..10 {
        world.update(DT);
        if let Some(contact) = world.contact(a, b) {
            assert!(contact.accumulated_impulse() >= 0.0);
            assert!(contact.accumulated_impulse().is_finite());
        }
    }

    let distance = world
        .atom(a)
        .unwrap()
        .position
        .distance(world.atom(b).unwrap().position);
    let margin = world.config().persistence_margin;
    assert!(distance >= 16.0 - margin, "distance {distance}");
    assert!(distance >= 16.0, "contact keeps pushing until separated: {distance}");

    // Equal masses: the pair separates symmetrically, and position
    // correction leaves no separating speed behind.
    let va = world.body(body_a).unwrap().velocity();
    let vb = world.body(body_b).unwrap().velocity();
    assert_relative_eq!(va.x, -vb.x, epsilon = 1e-3);
    assert!((vb - va).length() < 1e-3, "separating at {}", (vb - va).length());
}

#[test]
fn deep_overlaps_come_to_rest_just_apart() {
    for offset in [15.0, 12.0, 8.0] {
        let mut world = PhysicsWorld::new(weightless()).unwrap();
        let body_a = world.create_body(true);
        let body_b = world.create_body(true);
        let a = world.add_atom(body_a, Vec2::new(200.0, 200.0), 8.0, 1.0).unwrap();
        let b = world
            .add_atom(body_b, Vec2::new(200.0 + offset, 200.0), 8.0, 1.0)
            .unwrap();

        for _ in 0..60 {
            world.update(DT);
        }

        let distance = world
            .atom(a)
            .unwrap()
            .position
            .distance(world.atom(b).unwrap().position);
        let relative =
            world.body(body_b).unwrap().velocity() - world.body(body_a).unwrap().velocity();
        assert!(
            (16.0..17.0).contains(&distance),
            "offset {offset}: distance {distance}"
        );
        assert!(relative.length() < 1e-3, "offset {offset}: relative speed {relative}");
    }
}

#[test]
fn resting_atom_settles_on_static_floor() {
    let mut world = PhysicsWorld::new(SimulationConfig::default()).unwrap();
    floor(&mut world, 100.0, 300.0, 10);
    let ball = world.create_body(true);
    let atom = world.add_atom(ball, Vec2::new(164.0, 282.0), 8.0, 1.0).unwrap();

    for _ in 0..300 {
        world.update(DT);
    }

    let settled = world.atom(atom).unwrap().position;
    assert_relative_eq!(settled.x, 164.0, epsilon = 1e-3);
    assert_relative_eq!(300.0 - settled.y, 16.0, epsilon = 0.5);
    assert!(world.body(ball).unwrap().velocity().y.abs() < 1.0);

    for _ in 0..60 {
        world.update(DT);
    }
    let later = world.atom(atom).unwrap().position;
    assert!((later.y - settled.y).abs() < 0.05, "still sinking: {settled} -> {later}");
}

#[test]
fn setup_rejects_bad_handles_and_parameters() {
    let mut world = PhysicsWorld::default();
    let body = world.create_body(true);
    assert!(matches!(
        world.add_atom(body, Vec2::ZERO, 8.0, 0.0),
        Err(PhysicsError::InvalidMass(_))
    ));
    assert!(matches!(
        world.add_atom(body, Vec2::ZERO, -2.0, 1.0),
        Err(PhysicsError::InvalidRadius(_))
    ));

    world.remove_body(body).unwrap();
    assert_eq!(
        world.add_atom(body, Vec2::ZERO, 8.0, 1.0),
        Err(PhysicsError::BodyNotFound(body))
    );

    let invalid = SimulationConfig::default().with_solver_iterations(0);
    assert!(matches!(
        PhysicsWorld::new(invalid),
        Err(PhysicsError::InvalidConfig(_))
    ));
}

#[test]
fn removing_atoms_drops_their_contacts_and_empty_bodies() {
    let mut world = PhysicsWorld::new(weightless()).unwrap();
    let body_a = world.create_body(true);
    let body_b = world.create_body(true);
    let a = world.add_atom(body_a, Vec2::new(200.0, 200.0), 8.0, 1.0).unwrap();
    let b = world.add_atom(body_b, Vec2::new(215.0, 200.0), 8.0, 1.0).unwrap();

    world.update(DT);
    assert!(world.contact(a, b).is_some());

    world.remove_atom(b).unwrap();
    assert!(world.contact(a, b).is_none());
    assert!(world.body(body_b).is_none());
    assert!(world.atom(b).is_none());
    assert!(world.atom(a).is_some(), "other handles stay valid");
    assert_eq!(world.remove_atom(b), Err(PhysicsError::AtomNotFound(b)));
}

#[test]
fn step_runs_whole_frames_and_carries_remainder() {
    let mut world = PhysicsWorld::default();
    assert_eq!(world.step(0.04), 2);
    assert_eq!(world.step(0.02), 1);
    assert_eq!(world.frame(), 3);
    assert_eq!(world.step(-1.0), 0);
}

#[test]
fn gravity_accelerates_dynamic_bodies_only() {
    let mut world = PhysicsWorld::default();
    let fixed = world.create_body(false);
    let falling = world.create_body(true);
    world.add_atom(fixed, Vec2::new(100.0, 100.0), 8.0, 1.0).unwrap();
    world.add_atom(falling, Vec2::new(400.0, 100.0), 8.0, 3.0).unwrap();

    world.update(DT);
    assert_eq!(world.body(fixed).unwrap().velocity(), Vec2::ZERO);
    assert_relative_eq!(
        world.body(falling).unwrap().velocity().y,
        1000.0 * DT,
        epsilon = 1e-3
    );
}

#[test]
fn registered_drag_slows_moving_bodies() {
    let mut world = PhysicsWorld::new(weightless()).unwrap();
    let body = world.create_body(true);
    world.add_atom(body, Vec2::new(200.0, 200.0), 8.0, 1.0).unwrap();
    world
        .body_mut(body)
        .unwrap()
        .set_velocity(Vec2::new(100.0, 0.0), 0.0);
    world.add_force(DragForce {
        drag_coefficient: 0.01,
    });

    world.update(DT);
    // |v| = 100 gives a drag force of 100 on a unit mass.
    let velocity = world.body(body).unwrap().velocity();
    assert_relative_eq!(velocity.x, 100.0 - 100.0 * DT, epsilon = 1e-3);
    assert_eq!(velocity.y, 0.0);
}

#[test]
fn anchor_spring_pulls_only_its_body() {
    let mut world = PhysicsWorld::new(weightless()).unwrap();
    let tethered = world.create_body(true);
    let free = world.create_body(true);
    world.add_atom(tethered, Vec2::new(100.0, 100.0), 8.0, 1.0).unwrap();
    world.add_atom(free, Vec2::new(100.0, 400.0), 8.0, 1.0).unwrap();
    world.add_force(AnchorSpring {
        body: tethered,
        anchor: Vec2::new(200.0, 100.0),
        rest_length: 0.0,
        stiffness: 60.0,
        damping: 0.0,
    });

    world.update(DT);
    // Stretched by 100 with stiffness 60: a force of 6000 towards the anchor.
    let pulled = world.body(tethered).unwrap().velocity();
    assert_relative_eq!(pulled.x, 6000.0 * DT, epsilon = 1e-2);
    assert_relative_eq!(pulled.y, 0.0, epsilon = 1e-4);
    assert_eq!(world.body(free).unwrap().velocity(), Vec2::ZERO);

    for _ in 0..30 {
        world.update(DT);
    }
    let position = world.body(tethered).unwrap().center_of_mass();
    assert!(position.x > 100.0, "moved towards the anchor: {position}");
}

#[derive(Clone, Default)]
struct RecordingImpacts {
    events: Arc<Mutex<Vec<ImpactEvent>>>,
}

impl ImpactSink for RecordingImpacts {
    fn on_impact(&mut self, impact: &ImpactEvent) -> atom_physics::Result<()> {
        self.events.lock().push(*impact);
        Ok(())
    }
}

fn falling_ball(config: SimulationConfig) -> PhysicsWorld {
    let mut world = PhysicsWorld::new(config).unwrap();
    floor(&mut world, 100.0, 300.0, 10);
    let ball = world.create_body(true);
    // Gap of 5 to the floor, moving down at 600 px/s.
    world.add_atom(ball, Vec2::new(164.0, 279.0), 8.0, 1.0).unwrap();
    world
        .body_mut(ball)
        .unwrap()
        .set_velocity(Vec2::new(0.0, 600.0), 0.0);
    world
}

#[test]
fn hard_impacts_reach_the_impact_sink() {
    let mut config = weightless();
    config.impact_loudness = 100.0;
    let mut world = falling_ball(config);
    let sink = RecordingImpacts::default();
    world.set_impact_sink(sink.clone());

    for _ in 0..5 {
        world.update(DT);
    }
    let events = sink.events.lock();
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| event.impulse > 100.0));
}

#[test]
fn impact_sink_errors_do_not_stop_the_frame() {
    let mut config = weightless();
    config.impact_loudness = 100.0;
    let mut world = falling_ball(config);
    let voices = PolyphonicImpacts::new(0);
    world.set_impact_sink(voices.clone());

    for _ in 0..5 {
        world.update(DT);
    }
    assert_eq!(world.frame(), 5);
    assert_eq!(voices.played(), 0);
}

#[derive(Clone, Default)]
struct CountingRenderer {
    frames: Arc<Mutex<Vec<(u64, usize)>>>,
}

impl RenderSink for CountingRenderer {
    fn name(&self) -> &str {
        "counting"
    }

    fn present(&mut self, snapshot: &RenderSnapshot) {
        self.frames.lock().push((snapshot.frame, snapshot.atom_count()));
    }
}

#[test]
fn render_sink_sees_every_completed_frame() {
    let mut world = PhysicsWorld::default();
    floor(&mut world, 100.0, 300.0, 4);
    let renderer = CountingRenderer::default();
    world.set_render_sink(renderer.clone());
    assert_eq!(world.render_sink_name(), "counting");

    world.update(DT);
    world.update(DT);
    assert_eq!(*renderer.frames.lock(), vec![(1, 4), (2, 4)]);
    assert_eq!(world.snapshot().cells.iter().filter(|c| c.occupancy > 0).count(), 18);
}

#[test]
fn frame_profile_reports_population() {
    let mut world = PhysicsWorld::new(weightless()).unwrap();
    let body_a = world.create_body(true);
    let body_b = world.create_body(true);
    world.add_atom(body_a, Vec2::new(100.0, 100.0), 8.0, 1.0).unwrap();
    world.add_atom(body_b, Vec2::new(115.0, 100.0), 8.0, 1.0).unwrap();

    world.update(DT);
    let profile = world.profile();
    assert_eq!(profile.atom_count, 2);
    assert_eq!(profile.body_count, 2);
    assert_eq!(profile.contacts_created, 1);
    assert_eq!(profile.contact_count, 1);
    assert!(profile.total_frame_time >= profile.solver_time);
}
