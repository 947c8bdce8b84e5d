use glam::{IVec2, Vec2};

use crate::{
    config::GridConfig,
    core::atom::Atom,
    utils::allocator::{AtomId, BodyId},
};

/// Cells of padding on every side of the configured grid.
pub const GRID_PADDING: i32 = 2;

/// Occupants a single cell can hold before inserts are dropped.
pub const CELL_CAPACITY: usize = 16;

/// Snapshot of an atom taken when the grid was rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridEntry {
    pub atom: AtomId,
    pub body: BodyId,
    pub position: Vec2,
    pub radius: f32,
}

impl GridEntry {
    pub fn new(atom: AtomId, source: &Atom) -> Self {
        Self {
            atom,
            body: source.body,
            position: source.position,
            radius: source.radius(),
        }
    }
}

/// Fixed-capacity occupant list of one cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridCell {
    entries: [GridEntry; CELL_CAPACITY],
    len: usize,
    /// Debug flag set by marked ray casts, cleared on rebuild.
    pub marked: bool,
}

impl GridCell {
    pub fn entries(&self) -> &[GridEntry] {
        &self.entries[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, entry: GridEntry) -> bool {
        if self.len == CELL_CAPACITY {
            return false;
        }
        self.entries[self.len] = entry;
        self.len += 1;
        true
    }
}

/// Uniform broad-phase grid with splat insertion.
///
/// Each atom is written into its home cell and the eight cells around it, so
/// the candidate set of an atom is the occupant list of its home cell alone.
/// With a cell size of at least one atom diameter every overlapping pair
/// shows up in both home cells.
pub struct CollisionGrid {
    cell_size: f32,
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
    overflow: usize,
    out_of_bounds: usize,
}

impl CollisionGrid {
    pub fn new(cell_size: f32, width: usize, height: usize) -> Self {
        let padded_width = width + 2 * GRID_PADDING as usize;
        let padded_height = height + 2 * GRID_PADDING as usize;
        Self {
            cell_size,
            width: padded_width,
            height: padded_height,
            cells: vec![GridCell::default(); padded_width * padded_height],
            overflow: 0,
            out_of_bounds: 0,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.cell_size, config.width, config.height)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Padded dimensions in cells.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Empties every cell and clears debug marks and counters, keeping storage.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.len = 0;
            cell.marked = false;
        }
        self.overflow = 0;
        self.out_of_bounds = 0;
    }

    /// Padded cell coordinates containing a world position.
    pub fn cell_coords(&self, position: Vec2) -> IVec2 {
        (position / self.cell_size).floor().as_ivec2() + IVec2::splat(GRID_PADDING)
    }

    pub fn cell_index(&self, coords: IVec2) -> Option<usize> {
        if coords.x < 0
            || coords.y < 0
            || coords.x >= self.width as i32
            || coords.y >= self.height as i32
        {
            return None;
        }
        Some(coords.y as usize * self.width + coords.x as usize)
    }

    /// Home cell of a position, or `None` when its 3x3 neighbourhood would
    /// leave the padded grid.
    pub fn home_cell(&self, position: Vec2) -> Option<usize> {
        let coords = self.cell_coords(position);
        let inner = coords.x >= 1
            && coords.y >= 1
            && coords.x <= self.width as i32 - 2
            && coords.y <= self.height as i32 - 2;
        if inner {
            self.cell_index(coords)
        } else {
            None
        }
    }

    /// Splats the atom into its home cell and the eight neighbours. Returns
    /// the home cell index, or `None` when the atom lies outside the grid.
    pub fn insert(&mut self, id: AtomId, atom: &Atom) -> Option<usize> {
        let Some(home) = self.home_cell(atom.position) else {
            self.out_of_bounds += 1;
            return None;
        };

        let entry = GridEntry::new(id, atom);
        let row = self.width as isize;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let index = (home as isize + dy * row + dx) as usize;
                if !self.cells[index].push(entry) {
                    self.overflow += 1;
                }
            }
        }
        Some(home)
    }

    /// Occupants of a cell; empty for an unknown index.
    pub fn query_cell(&self, index: usize) -> &[GridEntry] {
        self.cells
            .get(index)
            .map(GridCell::entries)
            .unwrap_or(&[])
    }

    /// Broad-phase candidates of an atom: the occupants of its home cell.
    pub fn query(&self, atom: &Atom) -> &[GridEntry] {
        match atom.cell {
            Some(index) => self.query_cell(index),
            None => &[],
        }
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.cells.get(index).is_some_and(|cell| !cell.is_empty())
    }

    pub fn mark_cell(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.marked = true;
        }
    }

    /// Inserts dropped because a cell was full since the last `clear`.
    pub fn overflow_count(&self) -> usize {
        self.overflow
    }

    /// Atoms rejected because they were outside the grid since the last `clear`.
    pub fn out_of_bounds_count(&self) -> usize {
        self.out_of_bounds
    }

    /// `(index, occupant count, marked)` for every cell, row-major.
    pub fn occupancy(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (index, cell.len, cell.marked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom_at(x: f32, y: f32) -> Atom {
        Atom::new(Vec2::new(x, y), 8.0, 1.0).unwrap()
    }

    #[test]
    fn insert_splats_into_neighbourhood() {
        let mut grid = CollisionGrid::new(16.0, 10, 10);
        let id = AtomId::new(0, 0);
        let home = grid.insert(id, &atom_at(40.0, 40.0)).expect("inside grid");

        let (width, _) = grid.dims();
        assert_eq!(home, 4 * width + 4);
        for index in [home - width - 1, home, home + width + 1, home + 1] {
            assert_eq!(grid.query_cell(index)[0].atom, id);
        }
        assert!(grid.query_cell(home + 2).is_empty());
        assert_eq!(grid.occupancy().filter(|(_, n, _)| *n > 0).count(), 9);
    }

    #[test]
    fn outer_ring_and_beyond_are_rejected() {
        let mut grid = CollisionGrid::new(16.0, 4, 4);
        assert!(grid.insert(AtomId::new(0, 0), &atom_at(-100.0, 0.0)).is_none());
        // Padded coordinate 1 is still inside: its neighbourhood touches ring 0.
        assert!(grid.insert(AtomId::new(1, 0), &atom_at(-10.0, -10.0)).is_some());
        assert!(grid.insert(AtomId::new(2, 0), &atom_at(-20.0, 0.0)).is_none());
        assert_eq!(grid.out_of_bounds_count(), 2);
    }

    #[test]
    fn full_cells_drop_and_count() {
        let mut grid = CollisionGrid::new(16.0, 8, 8);
        let atom = atom_at(50.0, 50.0);
        for i in 0..(CELL_CAPACITY as u32 + 3) {
            grid.insert(AtomId::new(i, 0), &atom);
        }
        let home = grid.home_cell(atom.position).unwrap();
        assert_eq!(grid.query_cell(home).len(), CELL_CAPACITY);
        assert_eq!(grid.overflow_count(), 3 * 9);

        grid.clear();
        assert!(grid.query_cell(home).is_empty());
        assert_eq!(grid.overflow_count(), 0);
    }
}
