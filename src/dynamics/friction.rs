use crate::{
    collision::contact::AtomContact, core::rigidbody::RigidBody, utils::spatial::SpatialVec2,
};

/// Applies one Coulomb friction step along the contact tangent.
///
/// The step removes relative tangential velocity and is bounded by
/// `friction * |last normal impulse|`. Returns the applied impulse.
pub fn apply_friction(
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    contact: &mut AtomContact,
    friction: f32,
) -> f32 {
    let limit = friction.max(0.0) * contact.last_impulse().abs();
    if limit <= f32::EPSILON || contact.friction_factor == 0.0 {
        contact.last_friction_impulse = 0.0;
        return 0.0;
    }

    let velocity = SpatialVec2::velocity_of(body_a, body_b);
    let lambda = (-contact.friction_jacobian.dot(&velocity) * contact.friction_factor)
        .clamp(-limit, limit);

    contact.last_friction_impulse = lambda;
    (contact.inverse_mass.hadamard(&contact.friction_jacobian) * lambda)
        .apply_velocity(body_a, body_b);
    lambda
}
