//! Read-only frame snapshots for an external renderer.
//!
//! The core never draws. After each frame the world copies atom circles and
//! the grid overlay into a [`RenderSnapshot`] and hands it to a [`RenderSink`].

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    collision::broadphase::{CollisionGrid, GRID_PADDING},
    core::{atom::Atom, rigidbody::RigidBody},
    utils::allocator::{Arena, AtomId, BodyId},
};

/// One circle to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtomSprite {
    pub atom: AtomId,
    pub body: BodyId,
    pub position: Vec2,
    pub radius: f32,
    pub moving: bool,
}

/// Diagnostic state of a grid cell that is occupied or marked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellOverlay {
    pub index: usize,
    /// Padded cell coordinates.
    pub coords: IVec2,
    pub occupancy: usize,
    pub marked: bool,
}

impl CellOverlay {
    /// World-space corner of the cell with the smallest coordinates.
    pub fn world_min(&self, cell_size: f32) -> Vec2 {
        (self.coords - IVec2::splat(GRID_PADDING)).as_vec2() * cell_size
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub atoms: Vec<AtomSprite>,
    pub cells: Vec<CellOverlay>,
    pub cell_size: f32,
    /// Padded grid dimensions in cells.
    pub grid_dims: (usize, usize),
}

impl RenderSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current simulation state, reusing the buffers.
    pub fn sync(
        &mut self,
        frame: u64,
        atoms: &Arena<Atom>,
        bodies: &Arena<RigidBody>,
        grid: &CollisionGrid,
    ) {
        self.frame = frame;
        self.atoms.clear();
        self.cells.clear();

        for (id, atom) in atoms.iter() {
            self.atoms.push(AtomSprite {
                atom: id,
                body: atom.body,
                position: atom.position,
                radius: atom.radius(),
                moving: bodies.get(atom.body).is_some_and(RigidBody::is_moving),
            });
        }

        let (width, height) = grid.dims();
        self.cell_size = grid.cell_size();
        self.grid_dims = (width, height);
        for (index, occupancy, marked) in grid.occupancy() {
            if occupancy == 0 && !marked {
                continue;
            }
            self.cells.push(CellOverlay {
                index,
                coords: IVec2::new((index % width) as i32, (index / width) as i32),
                occupancy,
                marked,
            });
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }
}

/// Receiver of per-frame snapshots.
pub trait RenderSink: Send {
    fn name(&self) -> &str;

    fn present(&mut self, snapshot: &RenderSnapshot);
}

/// Default sink that discards every frame.
#[derive(Debug, Default)]
pub struct NoopRenderer;

impl NoopRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSink for NoopRenderer {
    fn name(&self) -> &str {
        "noop"
    }

    fn present(&mut self, _snapshot: &RenderSnapshot) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_atoms_and_touched_cells() {
        let mut atoms = Arena::new();
        let mut bodies = Arena::new();
        let body = bodies.insert(RigidBody::fixed(BodyId::default()));
        bodies.get_mut(body).unwrap().id = body;
        let atom = atoms.insert(Atom::new(Vec2::new(40.0, 40.0), 8.0, 1.0).unwrap());
        bodies.get_mut(body).unwrap().add_atom(atom, &mut atoms);

        let mut grid = CollisionGrid::new(16.0, 10, 10);
        grid.insert(atom, atoms.get(atom).unwrap());
        grid.mark_cell(0);

        let mut snapshot = RenderSnapshot::new();
        snapshot.sync(7, &atoms, &bodies, &grid);

        assert_eq!(snapshot.frame, 7);
        assert_eq!(snapshot.atoms.len(), 1);
        assert!(!snapshot.atoms[0].moving);
        assert_eq!(snapshot.cells.len(), 10);
        let home = snapshot
            .cells
            .iter()
            .find(|cell| cell.coords == IVec2::new(4, 4))
            .expect("home cell in overlay");
        assert_eq!(home.world_min(16.0), Vec2::new(32.0, 32.0));
        assert!(snapshot.cells.iter().any(|cell| cell.index == 0 && cell.marked));
    }
}
