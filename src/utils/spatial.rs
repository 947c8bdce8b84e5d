use glam::Vec2;

use crate::core::rigidbody::RigidBody;

/// A 6D vector over the generalized velocity space of a body pair:
/// linear x, linear y and angular for body A, then the same for body B.
///
/// Used both for velocities and for constraint Jacobian rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpatialVec2 {
    pub lin_a: Vec2,
    pub ang_a: f32,
    pub lin_b: Vec2,
    pub ang_b: f32,
}

impl SpatialVec2 {
    pub const ZERO: Self = Self {
        lin_a: Vec2::ZERO,
        ang_a: 0.0,
        lin_b: Vec2::ZERO,
        ang_b: 0.0,
    };

    pub fn new(lin_a: Vec2, ang_a: f32, lin_b: Vec2, ang_b: f32) -> Self {
        Self {
            lin_a,
            ang_a,
            lin_b,
            ang_b,
        }
    }

    /// Observable velocities of both bodies; static bodies read as zero.
    pub fn velocity_of(body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self::new(
            body_a.velocity(),
            body_a.angular_velocity(),
            body_b.velocity(),
            body_b.angular_velocity(),
        )
    }

    /// Position-correction pseudo velocities of both bodies.
    pub fn bias_velocity_of(body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self::new(
            body_a.velocity_bias(),
            body_a.angular_velocity_bias(),
            body_b.velocity_bias(),
            body_b.angular_velocity_bias(),
        )
    }

    /// Inverse-mass diagonal `[1/m, 1/m, 1/I]` for each body.
    pub fn inverse_mass_of(body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self::new(
            Vec2::splat(body_a.inverse_mass()),
            body_a.inverse_inertia(),
            Vec2::splat(body_b.inverse_mass()),
            body_b.inverse_inertia(),
        )
    }

    /// Adds this generalized velocity change to the two bodies.
    pub fn apply_velocity(&self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        body_a.apply_velocity_delta(self.lin_a, self.ang_a);
        body_b.apply_velocity_delta(self.lin_b, self.ang_b);
    }

    /// Adds this change to the bias (position correction) channel only.
    pub fn apply_bias(&self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        body_a.apply_bias_delta(self.lin_a, self.ang_a);
        body_b.apply_bias_delta(self.lin_b, self.ang_b);
    }

    pub fn dot(&self, other: &SpatialVec2) -> f32 {
        self.lin_a.dot(other.lin_a)
            + self.ang_a * other.ang_a
            + self.lin_b.dot(other.lin_b)
            + self.ang_b * other.ang_b
    }

    /// Component-wise product, used to apply a diagonal mass matrix.
    pub fn hadamard(&self, other: &SpatialVec2) -> SpatialVec2 {
        SpatialVec2 {
            lin_a: self.lin_a * other.lin_a,
            ang_a: self.ang_a * other.ang_a,
            lin_b: self.lin_b * other.lin_b,
            ang_b: self.ang_b * other.ang_b,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lin_a.is_finite()
            && self.ang_a.is_finite()
            && self.lin_b.is_finite()
            && self.ang_b.is_finite()
    }
}

impl std::ops::Add for SpatialVec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            lin_a: self.lin_a + other.lin_a,
            ang_a: self.ang_a + other.ang_a,
            lin_b: self.lin_b + other.lin_b,
            ang_b: self.ang_b + other.ang_b,
        }
    }
}

impl std::ops::Sub for SpatialVec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            lin_a: self.lin_a - other.lin_a,
            ang_a: self.ang_a - other.ang_a,
            lin_b: self.lin_b - other.lin_b,
            ang_b: self.ang_b - other.ang_b,
        }
    }
}

impl std::ops::Mul<f32> for SpatialVec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            lin_a: self.lin_a * rhs,
            ang_a: self.ang_a * rhs,
            lin_b: self.lin_b * rhs,
            ang_b: self.ang_b * rhs,
        }
    }
}

impl std::ops::Neg for SpatialVec2 {
    type Output = Self;
    fn neg(self) -> Self {
        self * -1.0
    }
}
