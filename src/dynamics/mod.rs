//! Simulation dynamics: forces, integration, the contact solver and fracture.

pub mod forces;
pub mod fracture;
pub mod friction;
pub mod integrator;
pub mod solver;

pub use forces::{AnchorSpring, DragForce, ForceGenerator, ForceRegistry, GravityForce};
pub use fracture::FractureRule;
pub use friction::apply_friction;
pub use integrator::Integrator;
pub use solver::{ContactSolver, ImpactEvent, SolverStepMetrics};
