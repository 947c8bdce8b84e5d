use log::debug;

use crate::{
    collision::{
        broadphase::CollisionGrid,
        contact::{pair_within_margin, AtomContact, ContactSet, ContactTuning},
    },
    config::SimulationConfig,
    core::{atom::Atom, rigidbody::RigidBody},
    utils::allocator::Arena,
};

/// Contacts created and destroyed by one contact update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContactChanges {
    pub created: usize,
    pub destroyed: usize,
}

/// Owns the broad-phase grid and the persistent contact set.
pub struct CollisionManager {
    pub grid: CollisionGrid,
    pub contacts: ContactSet,
    pub persistence_margin: f32,
}

impl CollisionManager {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            grid: CollisionGrid::from_config(&config.grid),
            contacts: ContactSet::new(),
            persistence_margin: config.persistence_margin,
        }
    }

    /// Clears the grid and re-inserts every atom at its current position,
    /// caching each atom's home cell. Returns `(dropped, out_of_bounds)`.
    pub fn rebuild_grid(&mut self, atoms: &mut Arena<Atom>) -> (usize, usize) {
        self.grid.clear();
        for (id, atom) in atoms.iter_mut() {
            atom.cell = self.grid.insert(id, atom);
        }
        (self.grid.overflow_count(), self.grid.out_of_bounds_count())
    }

    /// Keeps, warm-starts and refreshes contacts that still pass the margin
    /// test, then creates contacts for new pairs found in the grid.
    pub fn update_contacts(
        &mut self,
        atoms: &Arena<Atom>,
        bodies: &mut Arena<RigidBody>,
        tuning: &ContactTuning,
    ) -> ContactChanges {
        let margin = self.persistence_margin;
        let destroyed = self.contacts.retain(|contact| {
            let (id_a, id_b) = contact.atoms();
            let (Some(a), Some(b)) = (atoms.get(id_a), atoms.get(id_b)) else {
                return false;
            };
            if a.body == b.body || !pair_within_margin(a, b, margin) {
                return false;
            }
            contact.warm_start(atoms, bodies);
            contact.refresh(atoms, bodies, tuning)
        });

        let mut created = 0;
        for (id, atom) in atoms.iter() {
            let atom_moving = bodies.get(atom.body).is_some_and(RigidBody::is_moving);
            for entry in self.grid.query(atom) {
                if entry.atom <= id || entry.body == atom.body {
                    continue;
                }
                let other_moving = bodies.get(entry.body).is_some_and(RigidBody::is_moving);
                if !atom_moving && !other_moving {
                    continue;
                }
                let Some(other) = atoms.get(entry.atom) else {
                    continue;
                };
                if !pair_within_margin(atom, other, margin)
                    || self.contacts.contains(id, entry.atom)
                {
                    continue;
                }

                let mut contact = AtomContact::new(id, entry.atom, atom.body, other.body);
                if contact.refresh(atoms, bodies, tuning) {
                    self.contacts.insert(contact);
                    created += 1;
                }
            }
        }

        if created > 0 || destroyed > 0 {
            debug!(
                "contacts: {} live, {} created, {} destroyed",
                self.contacts.len(),
                created,
                destroyed
            );
        }
        ContactChanges { created, destroyed }
    }
}
