use glam::Vec2;

use crate::{
    error::{PhysicsError, Result},
    utils::allocator::BodyId,
};

/// A circular point mass, the indivisible simulation unit.
///
/// Atoms never move on their own: their owning body translates and rotates
/// them in [`RigidBody::update_state`](crate::core::rigidbody::RigidBody::update_state).
#[derive(Debug, Clone)]
pub struct Atom {
    pub position: Vec2,
    pub previous_position: Vec2,
    /// Accumulated acceleration, folded into the owning body once per frame.
    pub acceleration: Vec2,
    mass: f32,
    radius: f32,
    /// Owning body; set when the atom is added to a body.
    pub body: BodyId,
    /// Home cell in the broad-phase grid after the last rebuild.
    pub cell: Option<usize>,
}

impl Atom {
    pub fn new(position: Vec2, radius: f32, mass: f32) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidRadius(radius));
        }
        Ok(Self {
            position,
            previous_position: position,
            acceleration: Vec2::ZERO,
            mass,
            radius,
            body: BodyId::default(),
            cell: None,
        })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Displacement over the last integrated frame.
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous_position
    }

    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Moves the atom, remembering where it was.
    pub fn move_to(&mut self, position: Vec2) {
        self.previous_position = self.position;
        self.position = position;
    }

    /// Signed gap between the two circles (negative when overlapping).
    pub fn gap_to(&self, other: &Atom) -> f32 {
        self.position.distance(other.position) - (self.radius + other.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_mass_and_radius() {
        assert_eq!(
            Atom::new(Vec2::ZERO, 8.0, 0.0).unwrap_err(),
            PhysicsError::InvalidMass(0.0)
        );
        assert!(matches!(
            Atom::new(Vec2::ZERO, -1.0, 1.0),
            Err(PhysicsError::InvalidRadius(_))
        ));
        assert!(Atom::new(Vec2::ZERO, 8.0, f32::NAN).is_err());
    }

    #[test]
    fn velocity_is_derived_from_positions() {
        let mut atom = Atom::new(Vec2::new(1.0, 1.0), 8.0, 1.0).unwrap();
        assert_eq!(atom.velocity(), Vec2::ZERO);
        atom.move_to(Vec2::new(3.0, 0.0));
        assert_eq!(atom.velocity(), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn gap_is_negative_when_overlapping() {
        let a = Atom::new(Vec2::ZERO, 8.0, 1.0).unwrap();
        let b = Atom::new(Vec2::new(15.0, 0.0), 8.0, 1.0).unwrap();
        assert_eq!(a.gap_to(&b), -1.0);
    }
}
