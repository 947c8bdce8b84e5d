use crate::{
    config::SimulationConfig,
    dynamics::{
        forces::ForceRegistry, fracture::FractureRule, integrator::Integrator,
        solver::ContactSolver,
    },
};

/// Groups the velocity-level machinery of the pipeline.
pub struct DynamicsManager {
    pub solver: ContactSolver,
    pub integrator: Integrator,
    pub force_registry: ForceRegistry,
    pub fracture: FractureRule,
}

impl DynamicsManager {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            solver: ContactSolver::from_config(config),
            integrator: Integrator::new(config.linear_damping, config.angular_damping),
            force_registry: ForceRegistry::new(),
            fracture: FractureRule::new(config.fracture),
        }
    }
}
