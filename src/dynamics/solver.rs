use log::trace;

use crate::{
    collision::contact::{AtomContact, ContactSet},
    config::SimulationConfig,
    core::rigidbody::RigidBody,
    dynamics::friction::apply_friction,
    utils::allocator::{Arena, AtomId},
};

/// A contact whose impulse added this frame crossed the loudness threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEvent {
    pub atoms: (AtomId, AtomId),
    pub impulse: f32,
}

#[derive(Debug, Default, Clone)]
pub struct SolverStepMetrics {
    pub contacts_solved: usize,
    pub iterations: u32,
    pub normal_impulse_sum: f32,
    pub friction_impulse_sum: f32,
    pub impacts: Vec<ImpactEvent>,
}

impl SolverStepMetrics {
    fn record_contact(&mut self, contact: &AtomContact, loudness: f32) {
        self.contacts_solved += 1;
        self.normal_impulse_sum += contact.accumulated_impulse();
        if contact.frame_impulse() > loudness {
            self.impacts.push(ImpactEvent {
                atoms: contact.atoms(),
                impulse: contact.frame_impulse(),
            });
        }
    }
}

/// Sequential-impulse solver over the persistent contact set.
#[derive(Debug, Clone)]
pub struct ContactSolver {
    pub iterations: u32,
    pub friction: f32,
    pub max_impulse: f32,
    pub impact_loudness: f32,
}

impl ContactSolver {
    pub fn new(iterations: u32) -> Self {
        let defaults = SimulationConfig::default();
        Self {
            iterations,
            ..Self::from_config(&defaults)
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            iterations: config.solver_iterations,
            friction: config.friction,
            max_impulse: config.max_impulse,
            impact_loudness: config.impact_loudness,
        }
    }

    /// Runs the configured number of iterations. In every iteration each
    /// contact solves its friction row first, then its normal row, then the
    /// bias row that carries position correction.
    pub fn solve(
        &self,
        bodies: &mut Arena<RigidBody>,
        contacts: &mut ContactSet,
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics {
            iterations: self.iterations,
            ..Default::default()
        };

        for _ in 0..self.iterations {
            for contact in contacts.iter_mut() {
                let (id_a, id_b) = contact.bodies();
                let Some((body_a, body_b)) = bodies.get2_mut(id_a, id_b) else {
                    continue;
                };

                let friction = apply_friction(body_a, body_b, contact, self.friction);
                metrics.friction_impulse_sum += friction.abs();

                contact.solve_normal(body_a, body_b, self.max_impulse);
                contact.solve_bias(body_a, body_b, self.max_impulse);
            }
        }

        for contact in contacts.iter() {
            metrics.record_contact(contact, self.impact_loudness);
        }

        trace!(
            "solved {} contacts, {} iterations, normal sum {:.3}",
            metrics.contacts_solved,
            metrics.iterations,
            metrics.normal_impulse_sum
        );
        metrics
    }
}
