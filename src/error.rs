//! Error types for the physics core.
//!
//! The simulation itself degrades softly (dropped grid inserts, clamped
//! impulses, skipped fractures); [`PhysicsError`] covers rejected setup
//! parameters and collaborator failures.

use std::fmt;

use crate::utils::allocator::EntityId;

/// Main error type for the physics core.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A configuration value is out of range or could not be parsed.
    InvalidConfig(String),
    /// Atom mass must be finite and strictly positive.
    InvalidMass(f32),
    /// Atom radius must be finite and strictly positive.
    InvalidRadius(f32),
    /// No live body for the given handle.
    BodyNotFound(EntityId),
    /// No live atom for the given handle.
    AtomNotFound(EntityId),
    /// The impact collaborator refused or failed to play a sound.
    ImpactDropped(String),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid simulation config: {msg}"),
            Self::InvalidMass(mass) => write!(f, "Invalid atom mass: {mass}"),
            Self::InvalidRadius(radius) => write!(f, "Invalid atom radius: {radius}"),
            Self::BodyNotFound(id) => write!(
                f,
                "Body not found: index {} generation {}",
                id.index(),
                id.generation()
            ),
            Self::AtomNotFound(id) => write!(
                f,
                "Atom not found: index {} generation {}",
                id.index(),
                id.generation()
            ),
            Self::ImpactDropped(msg) => write!(f, "Impact dropped: {msg}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Convenient Result alias for physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
