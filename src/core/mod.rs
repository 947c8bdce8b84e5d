//! Core types describing atoms, composite bodies and shared data.

pub mod atom;
pub mod rigidbody;
pub mod types;

pub use atom::Atom;
pub use rigidbody::RigidBody;
pub use types::{MassProperties, Velocity};
