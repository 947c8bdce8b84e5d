use glam::{IVec2, Vec2};

use crate::{collision::broadphase::CollisionGrid, utils::allocator::AtomId};

/// First occupied grid cell along a ray.
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastHit {
    /// Index of the hit cell in the padded grid.
    pub cell: usize,
    /// Padded cell coordinates of the hit cell.
    pub coords: IVec2,
    /// First occupant of the hit cell.
    pub atom: AtomId,
    /// Ray entry point into the hit cell.
    pub point: Vec2,
    /// Distance along the ray to `point`.
    pub distance: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastQuery {
    pub origin: Vec2,
    pub direction: Vec2,
    pub max_distance: f32,
}

impl RaycastQuery {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            max_distance,
        }
    }
}

/// Grid traversal ray queries.
pub struct Raycast;

impl Raycast {
    /// Walks the grid cell by cell along the ray and reports the first
    /// occupied cell, starting with the cell containing the origin.
    pub fn cast(grid: &CollisionGrid, query: &RaycastQuery) -> Option<RaycastHit> {
        Self::traverse(grid, query, |_| {})
    }

    /// Same as [`cast`](Self::cast) but marks every visited cell for the
    /// debug overlay.
    pub fn cast_marked(grid: &mut CollisionGrid, query: &RaycastQuery) -> Option<RaycastHit> {
        let mut visited = Vec::new();
        let hit = Self::traverse(grid, query, |index| visited.push(index));
        for index in visited {
            grid.mark_cell(index);
        }
        hit
    }

    fn traverse(
        grid: &CollisionGrid,
        query: &RaycastQuery,
        mut visit: impl FnMut(usize),
    ) -> Option<RaycastHit> {
        let direction = query.direction.try_normalize()?;
        let cell_size = grid.cell_size();

        let mut coords = grid.cell_coords(query.origin);
        let grid_origin = query.origin / cell_size;
        let step = IVec2::new(
            direction.x.signum() as i32,
            direction.y.signum() as i32,
        );

        // Distance along the ray needed to cross one cell on each axis.
        let t_delta = Vec2::new(
            axis_delta(direction.x, cell_size),
            axis_delta(direction.y, cell_size),
        );
        let cell_floor = grid_origin.floor();
        let mut t_max = Vec2::new(
            first_crossing(grid_origin.x, cell_floor.x, direction.x, t_delta.x),
            first_crossing(grid_origin.y, cell_floor.y, direction.y, t_delta.y),
        );

        let mut t = 0.0;
        loop {
            if t > query.max_distance {
                return None;
            }
            let index = grid.cell_index(coords)?;
            visit(index);

            if let Some(entry) = grid.query_cell(index).first() {
                return Some(RaycastHit {
                    cell: index,
                    coords,
                    atom: entry.atom,
                    point: query.origin + direction * t,
                    distance: t,
                });
            }

            if t_max.x < t_max.y {
                t = t_max.x;
                t_max.x += t_delta.x;
                coords.x += step.x;
            } else {
                t = t_max.y;
                t_max.y += t_delta.y;
                coords.y += step.y;
            }
        }
    }
}

fn axis_delta(direction: f32, cell_size: f32) -> f32 {
    if direction == 0.0 {
        f32::INFINITY
    } else {
        cell_size / direction.abs()
    }
}

fn first_crossing(origin: f32, cell_floor: f32, direction: f32, t_delta: f32) -> f32 {
    if direction > 0.0 {
        (cell_floor + 1.0 - origin) * t_delta
    } else if direction < 0.0 {
        (origin - cell_floor) * t_delta
    } else {
        f32::INFINITY
    }
}
