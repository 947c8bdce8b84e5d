pub mod collision_manager;
pub mod dynamics_manager;

use std::time::Instant;

use glam::Vec2;
use log::{debug, warn};

use crate::{
    audio::{ImpactSink, SilentImpacts},
    collision::{
        broadphase::CollisionGrid,
        contact::{AtomContact, ContactSet, ContactTuning},
        queries::{Raycast, RaycastHit, RaycastQuery},
    },
    config::SimulationConfig,
    core::{atom::Atom, rigidbody::RigidBody},
    dynamics::{
        forces::ForceGenerator,
        fracture::{split_body, tick_cooldowns},
        solver::ImpactEvent,
    },
    error::{PhysicsError, Result},
    render::{NoopRenderer, RenderSink, RenderSnapshot},
    utils::{
        allocator::{Arena, AtomId, BodyId},
        logging::{report_grid_degradation, warn_if_frame_budget_exceeded},
        profiling::{FrameProfile, StageTimer},
    },
};

pub use collision_manager::{CollisionManager, ContactChanges};
pub use dynamics_manager::DynamicsManager;

/// Central simulation container orchestrating all subsystems.
///
/// Owns every atom, body and contact. One call to [`update`](Self::update)
/// runs the whole frame pipeline to completion:
/// forces, velocity integration, grid rebuild, contact update, impulse
/// iterations, position integration, fracture, then the collaborators.
pub struct PhysicsWorld {
    config: SimulationConfig,
    bodies: Arena<RigidBody>,
    atoms: Arena<Atom>,
    collision: CollisionManager,
    dynamics: DynamicsManager,
    time_accumulated: f32,
    frame: u64,
    profile: FrameProfile,
    impact_sink: Box<dyn ImpactSink>,
    render_sink: Box<dyn RenderSink>,
    snapshot: RenderSnapshot,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_validated(SimulationConfig::default())
    }
}

impl PhysicsWorld {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: SimulationConfig) -> Self {
        Self {
            collision: CollisionManager::new(&config),
            dynamics: DynamicsManager::new(&config),
            config,
            bodies: Arena::new(),
            atoms: Arena::new(),
            time_accumulated: 0.0,
            frame: 0,
            profile: FrameProfile::default(),
            impact_sink: Box::new(SilentImpacts),
            render_sink: Box::new(NoopRenderer::new()),
            snapshot: RenderSnapshot::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_impact_sink<S>(&mut self, sink: S)
    where
        S: ImpactSink + 'static,
    {
        self.impact_sink = Box::new(sink);
    }

    pub fn set_render_sink<S>(&mut self, sink: S)
    where
        S: RenderSink + 'static,
    {
        self.render_sink = Box::new(sink);
    }

    pub fn render_sink_name(&self) -> &str {
        self.render_sink.name()
    }

    pub fn add_force<F: ForceGenerator + 'static>(&mut self, force: F) {
        self.dynamics.force_registry.add_force(force);
    }

    /// Creates an empty body. Static bodies (`moving == false`) never move
    /// and act as infinite mass in contacts.
    pub fn create_body(&mut self, moving: bool) -> BodyId {
        let id = self.bodies.insert(RigidBody::new(BodyId::default(), moving));
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
        }
        id
    }

    /// Creates an atom and adds it to `body`.
    pub fn add_atom(
        &mut self,
        body: BodyId,
        position: Vec2,
        radius: f32,
        mass: f32,
    ) -> Result<AtomId> {
        if !self.bodies.contains(body) {
            return Err(PhysicsError::BodyNotFound(body));
        }
        let atom = self.atoms.insert(Atom::new(position, radius, mass)?);
        if let Some(owner) = self.bodies.get_mut(body) {
            owner.add_atom(atom, &mut self.atoms);
        }
        Ok(atom)
    }

    /// Removes one atom together with its contacts. A body left without
    /// atoms is removed as well.
    pub fn remove_atom(&mut self, atom: AtomId) -> Result<()> {
        let owner = self
            .atoms
            .get(atom)
            .map(|a| a.body)
            .ok_or(PhysicsError::AtomNotFound(atom))?;

        let mut now_empty = false;
        if let Some(body) = self.bodies.get_mut(owner) {
            body.remove_atom(atom, &mut self.atoms);
            now_empty = body.atom_count() == 0;
        }
        if now_empty {
            self.bodies.remove(owner);
        }
        self.atoms.remove(atom);
        self.collision.contacts.remove_atom(atom);
        Ok(())
    }

    /// Removes a body, its atoms and every contact touching them.
    pub fn remove_body(&mut self, body: BodyId) -> Result<()> {
        let removed = self
            .bodies
            .remove(body)
            .ok_or(PhysicsError::BodyNotFound(body))?;
        for atom in removed.atoms() {
            self.atoms.remove(*atom);
            self.collision.contacts.remove_atom(*atom);
        }
        Ok(())
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &Arena<RigidBody> {
        &self.bodies
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Mutable atom access, e.g. to push it with [`Atom::accelerate`].
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms(&self) -> &Arena<Atom> {
        &self.atoms
    }

    pub fn contacts(&self) -> &ContactSet {
        &self.collision.contacts
    }

    pub fn contact(&self, a: AtomId, b: AtomId) -> Option<&AtomContact> {
        self.collision.contacts.get(a, b)
    }

    /// Grid as rebuilt by the last update.
    pub fn grid(&self) -> &CollisionGrid {
        &self.collision.grid
    }

    pub fn profile(&self) -> &FrameProfile {
        &self.profile
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances the simulation in whole `time_step` frames, carrying the
    /// remainder to the next call. Returns the number of frames run.
    pub fn step(&mut self, elapsed: f32) -> u32 {
        if !(elapsed.is_finite() && elapsed > 0.0) {
            return 0;
        }
        self.time_accumulated += elapsed;

        let mut frames = 0;
        while self.time_accumulated >= self.config.time_step {
            self.time_accumulated -= self.config.time_step;
            self.update(self.config.time_step);
            frames += 1;
        }
        frames
    }

    /// Runs one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("Ignoring update with invalid dt {dt}");
            return;
        }

        let frame_start = Instant::now();
        let mut profile = FrameProfile::default();

        {
            let _timer = StageTimer::new("forces", &mut profile.forces_time);
            self.apply_gravity();
            self.dynamics.force_registry.apply_all(&mut self.bodies, dt);
            self.dynamics
                .integrator
                .integrate_velocities(&mut self.bodies, &mut self.atoms, dt);
        }

        {
            let _timer = StageTimer::new("broad_phase", &mut profile.broad_phase_time);
            let (dropped, out_of_bounds) = self.collision.rebuild_grid(&mut self.atoms);
            report_grid_degradation(dropped, out_of_bounds);
            profile.grid_overflow = dropped;
        }

        {
            let _timer = StageTimer::new("contacts", &mut profile.contact_time);
            let tuning = ContactTuning {
                bias_factor: self.config.bias_factor,
                penetration_decay: self.config.penetration_decay,
                dt,
            };
            let changes = self
                .collision
                .update_contacts(&self.atoms, &mut self.bodies, &tuning);
            profile.contacts_created = changes.created;
            profile.contacts_destroyed = changes.destroyed;
        }

        let metrics = {
            let _timer = StageTimer::new("solver", &mut profile.solver_time);
            self.dynamics
                .solver
                .solve(&mut self.bodies, &mut self.collision.contacts)
        };

        {
            let _timer = StageTimer::new("integrator", &mut profile.integrator_time);
            self.dynamics
                .integrator
                .integrate_positions(&mut self.bodies, &mut self.atoms, dt);
        }

        {
            let _timer = StageTimer::new("fracture", &mut profile.fracture_time);
            let splits = self.process_fractures();
            profile.fractures = splits.len();
            let just_split: Vec<BodyId> = splits
                .iter()
                .flat_map(|&(origin, fragment)| [origin, fragment])
                .collect();
            tick_cooldowns(&mut self.bodies, &just_split);
        }

        self.frame += 1;
        profile.impacts = metrics.impacts.len();
        self.notify_impacts(&metrics.impacts);
        self.render();

        profile.atom_count = self.atoms.len();
        profile.body_count = self.bodies.len();
        profile.contact_count = self.collision.contacts.len();
        profile.total_frame_time = frame_start.elapsed();
        profile.log_summary();
        warn_if_frame_budget_exceeded(profile.total_frame_time, self.config.frame_budget_ms);
        self.profile = profile;
    }

    fn apply_gravity(&mut self) {
        let gravity = self.config.gravity;
        if gravity == Vec2::ZERO {
            return;
        }
        for body in self.bodies.values_mut() {
            body.accelerate(gravity);
        }
    }

    /// Breaks bodies whose contacts carried more impulse than their current
    /// threshold. Returns every `(origin, fragment)` pair split this frame.
    fn process_fractures(&mut self) -> Vec<(BodyId, BodyId)> {
        let mut splits = Vec::new();
        if !self.config.fracture.enabled {
            return splits;
        }

        let candidates: Vec<_> = self
            .collision
            .contacts
            .iter()
            .filter(|contact| contact.accumulated_impulse() > 0.0)
            .map(|contact| (contact.atoms(), contact.contact_point(), contact.impulse()))
            .collect();

        for ((atom_a, atom_b), point, impulse) in candidates {
            for atom in [atom_a, atom_b] {
                let Some(body_id) = self.atoms.get(atom).map(|a| a.body) else {
                    continue;
                };
                let breaks = self
                    .bodies
                    .get(body_id)
                    .is_some_and(|body| self.dynamics.fracture.should_break(body, impulse));
                if !breaks {
                    continue;
                }
                if let Some(fragment) = self.split_body(body_id, point, impulse.perp()) {
                    splits.push((body_id, fragment));
                }
            }
        }
        splits
    }

    /// Cuts a body along the line through `point` perpendicular to
    /// `separation`; atoms behind the line move to a new body that inherits
    /// the velocity and fracture cooldown.
    pub fn split_body(&mut self, body: BodyId, point: Vec2, separation: Vec2) -> Option<BodyId> {
        let fragment = split_body(
            &mut self.bodies,
            &mut self.atoms,
            body,
            point,
            separation,
            self.config.fracture.cooldown_frames,
        )?;
        debug!("frame {}: body {} fractured", self.frame, body.index());
        Some(fragment)
    }

    fn notify_impacts(&mut self, impacts: &[ImpactEvent]) {
        for impact in impacts {
            if let Err(err) = self.impact_sink.on_impact(impact) {
                warn!("Impact sink error: {err}");
            }
        }
    }

    /// Casts a ray through the grid of the last update.
    pub fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RaycastHit> {
        Raycast::cast(
            &self.collision.grid,
            &RaycastQuery::new(origin, direction, max_distance),
        )
    }

    /// Like [`cast_ray`](Self::cast_ray), also marking visited cells in the
    /// debug overlay until the next grid rebuild.
    pub fn cast_ray_marked(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        Raycast::cast_marked(
            &mut self.collision.grid,
            &RaycastQuery::new(origin, direction, max_distance),
        )
    }

    /// Refreshes the render snapshot and hands it to the render sink.
    pub fn render(&mut self) {
        self.snapshot
            .sync(self.frame, &self.atoms, &self.bodies, &self.collision.grid);
        self.render_sink.present(&self.snapshot);
    }

    /// Snapshot handed to the render sink by the last [`render`](Self::render).
    pub fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }
}
