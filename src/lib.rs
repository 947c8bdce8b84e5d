//! Atom Physics – a 2D composite rigid-body core.
//!
//! Bodies are rigid aggregates of circular atoms. Each frame the world
//! rebuilds a uniform broad-phase grid, keeps persistent atom contacts alive
//! across frames, resolves them with warm-started sequential impulses
//! (friction first, then the non-penetration row with Baumgarte bias) and
//! splits bodies whose contacts carried too much impulse.
//!
//! ```no_run
//! use atom_physics::{PhysicsWorld, SimulationConfig, Vec2};
//!
//! let mut world = PhysicsWorld::new(SimulationConfig::default()).unwrap();
//! let floor = world.create_body(false);
//! for i in 0..20 {
//!     world.add_atom(floor, Vec2::new(i as f32 * 16.0, 400.0), 8.0, 1.0).unwrap();
//! }
//! let ball = world.create_body(true);
//! world.add_atom(ball, Vec2::new(160.0, 100.0), 8.0, 1.0).unwrap();
//! world.step(1.0);
//! ```

pub mod audio;
pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod render;
pub mod utils;
pub mod world;

pub use glam::{IVec2, Vec2};

pub use audio::{ImpactSink, PolyphonicImpacts, SilentImpacts};
pub use collision::{
    broadphase::{CollisionGrid, GridEntry, CELL_CAPACITY, GRID_PADDING},
    contact::{AtomContact, ContactSet},
    queries::{Raycast, RaycastHit, RaycastQuery},
};
pub use config::{FractureConfig, GridConfig, SimulationConfig};
pub use crate::core::{
    atom::Atom,
    rigidbody::RigidBody,
    types::{MassProperties, Velocity},
};
pub use dynamics::{
    forces::{AnchorSpring, DragForce, ForceGenerator, ForceRegistry, GravityForce},
    solver::{ContactSolver, ImpactEvent, SolverStepMetrics},
};
pub use error::{PhysicsError, Result};
pub use render::{AtomSprite, CellOverlay, NoopRenderer, RenderSink, RenderSnapshot};
pub use utils::allocator::{Arena, AtomId, BodyId, EntityId};
pub use world::PhysicsWorld;
