use std::collections::BTreeMap;

use glam::Vec2;

use crate::{
    core::{atom::Atom, rigidbody::RigidBody},
    utils::{
        allocator::{Arena, AtomId, BodyId},
        math::Vec2Ext,
        spatial::SpatialVec2,
    },
};

/// Per-frame parameters shared by every contact refresh.
#[derive(Debug, Clone, Copy)]
pub struct ContactTuning {
    pub bias_factor: f32,
    pub penetration_decay: f32,
    pub dt: f32,
}

/// Persistent non-penetration constraint between two atoms of different bodies.
///
/// Geometry is recomputed by [`refresh`](Self::refresh); everything else is
/// read through accessors. The accumulated normal impulse never goes negative:
/// contacts push, they never pull.
#[derive(Debug, Clone)]
pub struct AtomContact {
    atom_a: AtomId,
    atom_b: AtomId,
    body_a: BodyId,
    body_b: BodyId,
    normal: Vec2,
    contact_point: Vec2,
    depth: f32,
    pub(crate) jacobian: SpatialVec2,
    pub(crate) friction_jacobian: SpatialVec2,
    pub(crate) inverse_mass: SpatialVec2,
    pub(crate) inertia_factor: f32,
    pub(crate) friction_factor: f32,
    bias: f32,
    accumulated_delta: f32,
    accumulated_impulse: f32,
    accumulated_bias_impulse: f32,
    last_impulse: f32,
    frame_impulse: f32,
    pub(crate) last_friction_impulse: f32,
    impulse: Vec2,
    ticks: u32,
}

impl AtomContact {
    pub fn new(atom_a: AtomId, atom_b: AtomId, body_a: BodyId, body_b: BodyId) -> Self {
        Self {
            atom_a,
            atom_b,
            body_a,
            body_b,
            normal: Vec2::X,
            contact_point: Vec2::ZERO,
            depth: 0.0,
            jacobian: SpatialVec2::ZERO,
            friction_jacobian: SpatialVec2::ZERO,
            inverse_mass: SpatialVec2::ZERO,
            inertia_factor: 0.0,
            friction_factor: 0.0,
            bias: 0.0,
            accumulated_delta: 0.0,
            accumulated_impulse: 0.0,
            accumulated_bias_impulse: 0.0,
            last_impulse: 0.0,
            frame_impulse: 0.0,
            last_friction_impulse: 0.0,
            impulse: Vec2::ZERO,
            ticks: 0,
        }
    }

    pub fn atoms(&self) -> (AtomId, AtomId) {
        (self.atom_a, self.atom_b)
    }

    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    pub fn key(&self) -> ContactKey {
        ContactKey::new(self.atom_a, self.atom_b)
    }

    /// Unit vector from atom B towards atom A.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn tangent(&self) -> Vec2 {
        self.normal.perp()
    }

    pub fn contact_point(&self) -> Vec2 {
        self.contact_point
    }

    /// Overlap of the two circles at the last refresh (negative when apart).
    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn accumulated_delta(&self) -> f32 {
        self.accumulated_delta
    }

    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    /// Normal impulse of the most recent solver step.
    pub fn last_impulse(&self) -> f32 {
        self.last_impulse
    }

    pub fn last_friction_impulse(&self) -> f32 {
        self.last_friction_impulse
    }

    /// Normal impulse added by the solver during the current frame.
    pub fn frame_impulse(&self) -> f32 {
        self.frame_impulse
    }

    /// `normal * accumulated_impulse`, used by the fracture check.
    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }

    /// Frames this contact has been refreshed.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn jacobian(&self) -> SpatialVec2 {
        self.jacobian
    }

    pub fn inverse_mass(&self) -> SpatialVec2 {
        self.inverse_mass
    }

    /// Whether the atoms still belong to the bodies this contact was built for.
    pub fn owners_match(&self, atoms: &Arena<Atom>) -> bool {
        match (atoms.get(self.atom_a), atoms.get(self.atom_b)) {
            (Some(a), Some(b)) => a.body == self.body_a && b.body == self.body_b,
            _ => false,
        }
    }

    /// Re-applies last frame's accumulated impulse with last frame's Jacobian.
    /// Skipped when an atom changed owner since then.
    pub fn warm_start(&self, atoms: &Arena<Atom>, bodies: &mut Arena<RigidBody>) {
        if self.accumulated_impulse == 0.0 || !self.owners_match(atoms) {
            return;
        }
        let Some((body_a, body_b)) = bodies.get2_mut(self.body_a, self.body_b) else {
            return;
        };
        (self.inverse_mass.hadamard(&self.jacobian) * self.accumulated_impulse)
            .apply_velocity(body_a, body_b);
    }

    /// Recomputes geometry, Jacobians, mass terms and the Baumgarte bias from
    /// the current atom and body state. Returns `false` when an atom or body
    /// no longer exists.
    pub fn refresh(
        &mut self,
        atoms: &Arena<Atom>,
        bodies: &Arena<RigidBody>,
        tuning: &ContactTuning,
    ) -> bool {
        let (Some(atom_a), Some(atom_b)) = (atoms.get(self.atom_a), atoms.get(self.atom_b)) else {
            return false;
        };

        if atom_a.body != self.body_a || atom_b.body != self.body_b {
            self.body_a = atom_a.body;
            self.body_b = atom_b.body;
            self.accumulated_impulse = 0.0;
            self.accumulated_delta = 0.0;
            self.last_impulse = 0.0;
            self.last_friction_impulse = 0.0;
        }

        let (Some(body_a), Some(body_b)) = (bodies.get(self.body_a), bodies.get(self.body_b))
        else {
            return false;
        };

        let between_bodies = body_a.center_of_mass() - body_b.center_of_mass();
        self.normal = (atom_a.position - atom_b.position)
            .normalize_or_fallback(between_bodies.normalize_or_fallback(Vec2::X));
        self.contact_point = atom_a.position - self.normal * atom_a.radius();
        self.depth = -atom_a.gap_to(atom_b);

        let tangent = self.normal.perp();
        let r_a = self.contact_point - body_a.center_of_mass();
        let r_b = self.contact_point - body_b.center_of_mass();
        self.jacobian = SpatialVec2::new(
            self.normal,
            r_a.cross(self.normal),
            -self.normal,
            -r_b.cross(self.normal),
        );
        self.friction_jacobian =
            SpatialVec2::new(tangent, r_a.cross(tangent), -tangent, -r_b.cross(tangent));
        self.inverse_mass = SpatialVec2::inverse_mass_of(body_a, body_b);
        self.inertia_factor = effective_mass(&self.jacobian, &self.inverse_mass);
        self.friction_factor = effective_mass(&self.friction_jacobian, &self.inverse_mass);

        self.accumulated_delta = self.accumulated_delta * tuning.penetration_decay + self.depth;
        self.bias = -(tuning.bias_factor / tuning.dt) * self.accumulated_delta;

        self.accumulated_impulse = self.accumulated_impulse.max(0.0);
        self.impulse = self.normal * self.accumulated_impulse;
        self.accumulated_bias_impulse = 0.0;
        self.frame_impulse = 0.0;
        self.ticks += 1;
        true
    }

    /// One sequential-impulse step on the normal row. The row only removes
    /// approaching velocity; penetration is corrected by [`Self::solve_bias`].
    /// Returns the applied impulse.
    pub fn solve_normal(
        &mut self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        max_impulse: f32,
    ) -> f32 {
        let velocity = SpatialVec2::velocity_of(body_a, body_b);
        let lambda = clamp_push(
            -self.jacobian.dot(&velocity) * self.inertia_factor,
            self.accumulated_impulse,
            max_impulse,
        );

        self.accumulated_impulse += lambda;
        self.last_impulse = lambda;
        self.frame_impulse += lambda;
        self.impulse = self.normal * self.accumulated_impulse;
        (self.inverse_mass.hadamard(&self.jacobian) * lambda).apply_velocity(body_a, body_b);
        lambda
    }

    /// Baumgarte position correction: drives the bias velocities only, with
    /// its own non-negative accumulator, so the real velocity never picks up
    /// separating speed from penetration.
    pub fn solve_bias(
        &mut self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        max_impulse: f32,
    ) -> f32 {
        let velocity = SpatialVec2::bias_velocity_of(body_a, body_b);
        let lambda = clamp_push(
            -(self.jacobian.dot(&velocity) + self.bias) * self.inertia_factor,
            self.accumulated_bias_impulse,
            max_impulse,
        );
        self.accumulated_bias_impulse += lambda;
        (self.inverse_mass.hadamard(&self.jacobian) * lambda).apply_bias(body_a, body_b);
        lambda
    }
}

/// Keeps `accumulated + lambda` non-negative, then bounds the step.
fn clamp_push(lambda: f32, accumulated: f32, max_impulse: f32) -> f32 {
    let lambda = if accumulated + lambda < 0.0 {
        -accumulated
    } else {
        lambda
    };
    lambda.clamp(-max_impulse, max_impulse)
}

/// `1 / (J · (M⁻¹ ⊙ J))`, or zero when the row cannot move either body.
pub fn effective_mass(jacobian: &SpatialVec2, inverse_mass: &SpatialVec2) -> f32 {
    let denominator = jacobian.dot(&inverse_mass.hadamard(jacobian));
    if denominator > f32::EPSILON && denominator.is_finite() {
        1.0 / denominator
    } else {
        0.0
    }
}

/// Persistence test: the gap between the circles is below `margin`.
pub fn pair_within_margin(a: &Atom, b: &Atom, margin: f32) -> bool {
    a.gap_to(b) < margin
}

/// Order-independent key of an atom pair; the lower slot index comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactKey(AtomId, AtomId);

impl ContactKey {
    pub fn new(a: AtomId, b: AtomId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn atoms(&self) -> (AtomId, AtomId) {
        (self.0, self.1)
    }
}

/// Live contacts, iterated in key order so every frame solves them in the
/// same sequence.
#[derive(Debug, Default, Clone)]
pub struct ContactSet {
    contacts: BTreeMap<ContactKey, AtomContact>,
}

impl ContactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contact: AtomContact) {
        self.contacts.insert(contact.key(), contact);
    }

    pub fn contains(&self, a: AtomId, b: AtomId) -> bool {
        self.contacts.contains_key(&ContactKey::new(a, b))
    }

    pub fn get(&self, a: AtomId, b: AtomId) -> Option<&AtomContact> {
        self.contacts.get(&ContactKey::new(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AtomContact> + '_ {
        self.contacts.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AtomContact> + '_ {
        self.contacts.values_mut()
    }

    /// Keeps only the contacts for which `keep` returns true; returns how
    /// many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut AtomContact) -> bool) -> usize {
        let before = self.contacts.len();
        self.contacts.retain(|_, contact| keep(contact));
        before - self.contacts.len()
    }

    /// Drops every contact touching `atom`.
    pub fn remove_atom(&mut self, atom: AtomId) -> usize {
        self.retain(|contact| {
            let (a, b) = contact.atoms();
            a != atom && b != atom
        })
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}
