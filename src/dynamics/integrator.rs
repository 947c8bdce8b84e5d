use crate::{
    core::{atom::Atom, rigidbody::RigidBody},
    utils::allocator::Arena,
};

/// Semi-implicit Euler integration of composite bodies.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Integrator {
    pub fn new(linear_damping: f32, angular_damping: f32) -> Self {
        Self {
            linear_damping,
            angular_damping,
        }
    }

    /// Folds atom accelerations into their bodies, turns force and torque
    /// into velocity, then applies damping.
    pub fn integrate_velocities(
        &self,
        bodies: &mut Arena<RigidBody>,
        atoms: &mut Arena<Atom>,
        dt: f32,
    ) {
        for body in bodies.values_mut() {
            body.gather_atom_forces(atoms);
            body.update(dt);
            body.damp(self.linear_damping, self.angular_damping, dt);
        }
    }

    /// Moves every body (and its atoms) by its velocity plus bias velocity,
    /// then drops the bias so position correction never carries over.
    pub fn integrate_positions(
        &self,
        bodies: &mut Arena<RigidBody>,
        atoms: &mut Arena<Atom>,
        dt: f32,
    ) {
        for body in bodies.values_mut() {
            body.update_state(dt, atoms);
            body.clear_bias();
        }
    }
}
