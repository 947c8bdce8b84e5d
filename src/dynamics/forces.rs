use glam::Vec2;

use crate::{
    core::rigidbody::RigidBody,
    utils::allocator::{Arena, BodyId},
};

/// External force source applied to every body once per frame.
pub trait ForceGenerator: Send + Sync {
    fn apply(&self, body: &mut RigidBody, dt: f32);
}

/// Uniform acceleration field, scaled by each body's mass.
pub struct GravityForce {
    pub gravity: Vec2,
}

impl GravityForce {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for GravityForce {
    fn apply(&self, body: &mut RigidBody, _dt: f32) {
        body.accelerate(self.gravity);
    }
}

/// Quadratic drag: `-c * |v| * v`.
pub struct DragForce {
    pub drag_coefficient: f32,
}

impl ForceGenerator for DragForce {
    fn apply(&self, body: &mut RigidBody, _dt: f32) {
        let velocity = body.velocity();
        body.apply_force(-velocity * velocity.length() * self.drag_coefficient);
    }
}

/// Damped spring pulling one body's center of mass towards a fixed anchor.
/// Every other body is left alone.
pub struct AnchorSpring {
    pub body: BodyId,
    pub anchor: Vec2,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl ForceGenerator for AnchorSpring {
    fn apply(&self, body: &mut RigidBody, _dt: f32) {
        if body.id != self.body {
            return;
        }
        let offset = body.center_of_mass() - self.anchor;
        let distance = offset.length();
        if distance < 1e-6 {
            return;
        }
        let stretch = distance - self.rest_length;
        let spring = -self.stiffness * stretch * (offset / distance);
        body.apply_force(spring - self.damping * body.velocity());
    }
}

/// Collection of forces applied each frame, in registration order.
pub struct ForceRegistry {
    forces: Vec<Box<dyn ForceGenerator>>,
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self { forces: Vec::new() }
    }

    pub fn add_force<F: ForceGenerator + 'static>(&mut self, force: F) {
        self.forces.push(Box::new(force));
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn apply_all(&self, bodies: &mut Arena<RigidBody>, dt: f32) {
        for force in &self.forces {
            for body in bodies.values_mut() {
                force.apply(body, dt);
            }
        }
    }
}
