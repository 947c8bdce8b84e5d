use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    pub angular: f32,
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            linear: Vec2::ZERO,
            angular: 0.0,
        }
    }
}

impl Velocity {
    pub fn new(linear: Vec2, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// Aggregate mass and scalar moment of inertia of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f32,
    pub inertia: f32,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 0.0,
            inertia: 0.0,
        }
    }
}

impl MassProperties {
    /// Inertia contribution of a point mass at `offset` from the rotation center.
    pub fn point_inertia(mass: f32, offset: Vec2) -> f32 {
        mass * offset.length_squared()
    }
}
