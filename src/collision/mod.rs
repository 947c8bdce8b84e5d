//! Collision detection: the broad-phase grid, ray queries and persistent atom contacts.

pub mod broadphase;
pub mod contact;
pub mod queries;

pub use broadphase::{CollisionGrid, GridCell, GridEntry, CELL_CAPACITY, GRID_PADDING};
pub use contact::{pair_within_margin, AtomContact, ContactKey, ContactSet, ContactTuning};
pub use queries::{Raycast, RaycastHit, RaycastQuery};
