use glam::Vec2;
use log::debug;

use crate::{
    config::FractureConfig,
    core::{atom::Atom, rigidbody::RigidBody},
    utils::allocator::{Arena, AtomId, BodyId},
};

/// Impulse thresholds deciding when a body breaks.
#[derive(Debug, Clone, Copy)]
pub struct FractureRule {
    pub config: FractureConfig,
}

impl FractureRule {
    pub fn new(config: FractureConfig) -> Self {
        Self { config }
    }

    /// Intact bodies break at the fragile threshold; bodies still cooling
    /// down from a split need the higher break threshold.
    pub fn threshold(&self, body: &RigidBody) -> f32 {
        if body.fracture_cooldown == 0 {
            self.config.fragile_threshold
        } else {
            self.config.break_threshold
        }
    }

    pub fn should_break(&self, body: &RigidBody, impulse: Vec2) -> bool {
        self.config.enabled
            && body.is_moving()
            && body.atom_count() >= 2
            && impulse.length() > self.threshold(body)
    }
}

/// Splits the body's atoms by the line through `point` along `separation`:
/// atoms with `(p - point) · separation < 0` go to the second list.
pub fn partition(
    body: &RigidBody,
    atoms: &Arena<Atom>,
    point: Vec2,
    separation: Vec2,
) -> (Vec<AtomId>, Vec<AtomId>) {
    body.atoms().iter().copied().partition(|id| {
        atoms
            .get(*id)
            .map_or(true, |atom| (atom.position - point).dot(separation) >= 0.0)
    })
}

/// Moves the atoms on the negative side of the cut into a new body.
///
/// Both halves keep the pre-split velocities, so momentum divides by mass.
/// Returns `None` (and changes nothing) for static or single-atom bodies and
/// when the cut leaves either side empty.
pub fn split_body(
    bodies: &mut Arena<RigidBody>,
    atoms: &mut Arena<Atom>,
    body_id: BodyId,
    point: Vec2,
    separation: Vec2,
    cooldown_frames: u32,
) -> Option<BodyId> {
    let origin = bodies.get(body_id)?;
    if !origin.is_moving() || origin.atom_count() < 2 {
        return None;
    }
    let (kept, moved) = partition(origin, atoms, point, separation);
    if kept.is_empty() || moved.is_empty() {
        return None;
    }
    let (velocity, angular_velocity) = (origin.velocity(), origin.angular_velocity());

    let fragment_id = bodies.insert(RigidBody::dynamic(BodyId::default()));
    let (origin, fragment) = bodies.get2_mut(body_id, fragment_id)?;
    fragment.id = fragment_id;
    for atom_id in &moved {
        origin.remove_atom(*atom_id, atoms);
        fragment.add_atom(*atom_id, atoms);
    }

    origin.set_velocity(velocity, angular_velocity);
    fragment.set_velocity(velocity, angular_velocity);
    origin.fracture_cooldown = cooldown_frames;
    fragment.fracture_cooldown = cooldown_frames;

    debug!(
        "body {} split: {} atoms kept, {} moved to body {}",
        body_id.index(),
        kept.len(),
        moved.len(),
        fragment_id.index()
    );
    Some(fragment_id)
}

/// Counts every cooldown down by one frame. Bodies split during this frame
/// are skipped so they keep the full `cooldown_frames` for the frames after.
pub fn tick_cooldowns(bodies: &mut Arena<RigidBody>, just_split: &[BodyId]) {
    for (id, body) in bodies.iter_mut() {
        if !just_split.contains(&id) {
            body.fracture_cooldown = body.fracture_cooldown.saturating_sub(1);
        }
    }
}
