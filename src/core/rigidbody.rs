use glam::Vec2;
use log::trace;

use super::{
    atom::Atom,
    types::{MassProperties, Velocity},
};
use crate::utils::{
    allocator::{Arena, AtomId, BodyId},
    math::Vec2Ext,
};

/// A rigid aggregate of atoms sharing one linear and angular velocity.
///
/// Mass and inertia are maintained incrementally as atoms come and go; the
/// center of mass is recomputed from every owned atom on each change.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub id: BodyId,
    atoms: Vec<AtomId>,
    center_of_mass: Vec2,
    velocity: Velocity,
    velocity_bias: Velocity,
    force: Vec2,
    torque: f32,
    mass_properties: MassProperties,
    angle: f32,
    moving: bool,
    /// Frames left before the body counts as intact again after a split.
    pub fracture_cooldown: u32,
}

impl RigidBody {
    pub fn new(id: BodyId, moving: bool) -> Self {
        Self {
            id,
            atoms: Vec::new(),
            center_of_mass: Vec2::ZERO,
            velocity: Velocity::default(),
            velocity_bias: Velocity::default(),
            force: Vec2::ZERO,
            torque: 0.0,
            mass_properties: MassProperties::default(),
            angle: 0.0,
            moving,
            fracture_cooldown: 0,
        }
    }

    pub fn dynamic(id: BodyId) -> Self {
        Self::new(id, true)
    }

    pub fn fixed(id: BodyId) -> Self {
        Self::new(id, false)
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Freezes or releases the body. Freezing discards pending motion.
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
        if !moving {
            self.velocity = Velocity::default();
            self.velocity_bias = Velocity::default();
            self.force = Vec2::ZERO;
            self.torque = 0.0;
        }
    }

    pub fn center_of_mass(&self) -> Vec2 {
        self.center_of_mass
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn mass(&self) -> f32 {
        self.mass_properties.mass
    }

    pub fn moment_of_inertia(&self) -> f32 {
        self.mass_properties.inertia
    }

    pub fn mass_properties(&self) -> MassProperties {
        self.mass_properties
    }

    /// Zero for static bodies so contact rows treat them as immovable.
    pub fn inverse_mass(&self) -> f32 {
        if self.moving && self.mass_properties.mass > 0.0 {
            1.0 / self.mass_properties.mass
        } else {
            0.0
        }
    }

    pub fn inverse_inertia(&self) -> f32 {
        if self.moving && self.mass_properties.inertia > 0.0 {
            1.0 / self.mass_properties.inertia
        } else {
            0.0
        }
    }

    pub fn velocity(&self) -> Vec2 {
        if self.moving {
            self.velocity.linear
        } else {
            Vec2::ZERO
        }
    }

    pub fn angular_velocity(&self) -> f32 {
        if self.moving {
            self.velocity.angular
        } else {
            0.0
        }
    }

    pub fn velocity_bias(&self) -> Vec2 {
        if self.moving {
            self.velocity_bias.linear
        } else {
            Vec2::ZERO
        }
    }

    pub fn angular_velocity_bias(&self) -> f32 {
        if self.moving {
            self.velocity_bias.angular
        } else {
            0.0
        }
    }

    pub fn linear_momentum(&self) -> Vec2 {
        self.velocity() * self.mass()
    }

    pub fn set_velocity(&mut self, linear: Vec2, angular: f32) {
        if !self.moving {
            return;
        }
        self.velocity = Velocity::new(linear, angular);
    }

    pub fn apply_velocity_delta(&mut self, linear: Vec2, angular: f32) {
        if !self.moving {
            return;
        }
        self.velocity.linear += linear;
        self.velocity.angular += angular;
    }

    pub fn apply_bias_delta(&mut self, linear: Vec2, angular: f32) {
        if !self.moving {
            return;
        }
        self.velocity_bias.linear += linear;
        self.velocity_bias.angular += angular;
    }

    pub fn clear_bias(&mut self) {
        self.velocity_bias = Velocity::default();
    }

    /// Adds an atom, updating mass and inertia incrementally and the center of
    /// mass from scratch. The first atom seeds the inertia with its own mass so
    /// single-atom bodies keep a finite angular response.
    pub fn add_atom(&mut self, atom_id: AtomId, atoms: &mut Arena<Atom>) {
        let Some(atom) = atoms.get_mut(atom_id) else {
            return;
        };
        atom.body = self.id;
        let (mass, position) = (atom.mass(), atom.position);

        if self.atoms.is_empty() {
            self.mass_properties.inertia = mass;
        } else {
            self.mass_properties.inertia +=
                MassProperties::point_inertia(mass, position - self.center_of_mass);
        }
        self.mass_properties.mass += mass;
        self.atoms.push(atom_id);
        self.compute_center_of_mass(atoms);
    }

    /// Symmetric inverse of [`add_atom`](Self::add_atom). Returns `false` when
    /// the atom is not owned by this body.
    pub fn remove_atom(&mut self, atom_id: AtomId, atoms: &mut Arena<Atom>) -> bool {
        let Some(slot) = self.atoms.iter().position(|id| *id == atom_id) else {
            return false;
        };
        self.atoms.swap_remove(slot);

        if let Some(atom) = atoms.get(atom_id) {
            let mass = atom.mass();
            self.mass_properties.mass -= mass;
            self.mass_properties.inertia -=
                MassProperties::point_inertia(mass, atom.position - self.center_of_mass);
        }

        match self.atoms.as_slice() {
            [] => {
                self.mass_properties = MassProperties::default();
            }
            [last] => {
                if let Some(atom) = atoms.get(*last) {
                    self.mass_properties.mass = atom.mass();
                    self.mass_properties.inertia = atom.mass();
                }
            }
            _ => {
                let floor = self.min_atom_mass(atoms);
                self.mass_properties.inertia = self.mass_properties.inertia.max(floor);
            }
        }

        self.compute_center_of_mass(atoms);
        true
    }

    /// Mass-weighted average of the owned atom positions.
    pub fn compute_center_of_mass(&mut self, atoms: &Arena<Atom>) {
        let mut weighted = Vec2::ZERO;
        let mut total = 0.0;
        for atom in self.atoms.iter().filter_map(|id| atoms.get(*id)) {
            weighted += atom.position * atom.mass();
            total += atom.mass();
        }
        if total > 0.0 {
            self.center_of_mass = weighted / total;
        }
    }

    fn min_atom_mass(&self, atoms: &Arena<Atom>) -> f32 {
        self.atoms
            .iter()
            .filter_map(|id| atoms.get(*id))
            .map(Atom::mass)
            .fold(f32::INFINITY, f32::min)
    }

    pub fn apply_force(&mut self, force: Vec2) {
        if !self.moving {
            return;
        }
        self.force += force;
    }

    /// Applies a force at a world point, producing torque about the center of mass.
    pub fn apply_force_at(&mut self, force: Vec2, point: Vec2) {
        if !self.moving {
            return;
        }
        self.force += force;
        self.torque += (point - self.center_of_mass).cross(force);
    }

    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.apply_force(acceleration * self.mass());
    }

    /// Moves per-atom accelerations into the body's force and torque buffers.
    pub fn gather_atom_forces(&mut self, atoms: &mut Arena<Atom>) {
        for atom_id in &self.atoms {
            let Some(atom) = atoms.get_mut(*atom_id) else {
                continue;
            };
            let acceleration = std::mem::take(&mut atom.acceleration);
            if self.moving && acceleration != Vec2::ZERO {
                let force = acceleration * atom.mass();
                self.force += force;
                self.torque += (atom.position - self.center_of_mass).cross(force);
            }
        }
    }

    /// Integrates accumulated force and torque into velocity, then clears them.
    pub fn update(&mut self, dt: f32) {
        if !self.moving {
            return;
        }
        if self.mass_properties.mass > 0.0 {
            self.velocity.linear += (self.force / self.mass_properties.mass) * dt;
        }
        if self.mass_properties.inertia > 0.0 {
            self.velocity.angular += (self.torque / self.mass_properties.inertia) * dt;
        }
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn damp(&mut self, linear_damping: f32, angular_damping: f32, dt: f32) {
        if !self.moving {
            return;
        }
        self.velocity.linear *= (1.0 - linear_damping * dt).max(0.0);
        self.velocity.angular *= (1.0 - angular_damping * dt).max(0.0);
    }

    /// Advances position and orientation by `(velocity + bias) * dt`, moving
    /// every owned atom with the body.
    pub fn update_state(&mut self, dt: f32, atoms: &mut Arena<Atom>) {
        if !self.moving {
            return;
        }
        let translation = (self.velocity.linear + self.velocity_bias.linear) * dt;
        let rotation = (self.velocity.angular + self.velocity_bias.angular) * dt;
        let center = self.center_of_mass + translation;

        for atom_id in &self.atoms {
            if let Some(atom) = atoms.get_mut(*atom_id) {
                let moved = (atom.position + translation).rotate_about(center, rotation);
                atom.move_to(moved);
            }
        }

        self.center_of_mass = center;
        self.angle += rotation;
        trace!(
            "body {} -> com {} angle {:.4}",
            self.id.index(),
            self.center_of_mass,
            self.angle
        );
    }
}
