//! Broad-phase spatial grid
//!
//! Partitions the world into a fixed row/column lattice and maps each body to
//! every cell its AABB overlaps, so the narrow phase only tests pairs that
//! share a cell. One margin cell on every side keeps off-screen activity -
//! blocks dropping in from above the visible world, bodies nudged past the
//! side walls - inside the lattice.
//!
//! Cells hold integer body handles and are themselves addressed by index into
//! one contiguous vector: the same grid coordinate always resolves to the
//! same cell, so add/remove stays consistent.

use std::collections::HashMap;

use super::body::BodyId;
use super::rect::RectF;

/// One lattice cell
#[derive(Debug, Clone)]
pub struct GridCell {
    pub column: i32,
    pub row: i32,
    pub bounds: RectF,
    bodies: Vec<BodyId>,
}

impl GridCell {
    /// Bodies currently overlapping this cell
    pub fn bodies(&self) -> &[BodyId] {
        &self.bodies
    }

    fn add(&mut self, id: BodyId) {
        if !self.bodies.contains(&id) {
            self.bodies.push(id);
        }
    }

    fn remove(&mut self, id: BodyId) {
        self.bodies.retain(|&b| b != id);
    }
}

/// The broad-phase lattice
#[derive(Debug)]
pub struct SpatialGrid {
    rows: u32,
    columns: u32,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<GridCell>,
    /// Reverse index: body -> indices of the cells it occupies
    occupancy: HashMap<BodyId, Vec<usize>>,
}

impl SpatialGrid {
    /// Build a grid of `rows x columns` interior cells over the given world
    /// region, plus the margin ring.
    pub fn new(rows: u32, columns: u32, world_width: f32, world_height: f32) -> Self {
        let mut grid = Self {
            rows: rows.max(1),
            columns: columns.max(1),
            cell_width: 0.0,
            cell_height: 0.0,
            cells: Vec::new(),
            occupancy: HashMap::new(),
        };
        grid.rebuild(world_width, world_height);
        grid
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell indices a body occupies, if registered
    pub fn cells_of(&self, id: BodyId) -> Option<&[usize]> {
        self.occupancy.get(&id).map(|v| v.as_slice())
    }

    /// Recompute the lattice for a resized world.
    ///
    /// All cell contents are dropped; the world re-registers every body
    /// immediately afterwards, so no stale membership survives the resize.
    pub fn rebuild(&mut self, world_width: f32, world_height: f32) {
        debug_assert!(world_width > 0.0 && world_height > 0.0, "degenerate world size");
        self.cell_width = (world_width / self.columns as f32).max(1.0);
        self.cell_height = (world_height / self.rows as f32).max(1.0);
        self.occupancy.clear();
        self.cells.clear();

        // margin ring: rows -1..=rows, columns -1..=columns
        for row in -1..=self.rows as i32 {
            for column in -1..=self.columns as i32 {
                self.cells.push(GridCell {
                    column,
                    row,
                    bounds: RectF::new(
                        column as f32 * self.cell_width,
                        row as f32 * self.cell_height,
                        self.cell_width,
                        self.cell_height,
                    ),
                    bodies: Vec::new(),
                });
            }
        }
    }

    fn cell_index(&self, column: i32, row: i32) -> Option<usize> {
        if column < -1 || column > self.columns as i32 || row < -1 || row > self.rows as i32 {
            return None;
        }
        let stride = self.columns as i32 + 2;
        Some(((row + 1) * stride + (column + 1)) as usize)
    }

    /// Every cell whose bounds intersect `rect`, walking one cell stride at a
    /// time from the cell containing the rect's top-left corner. Parts of the
    /// rect outside the margin ring simply contribute no cells.
    pub fn cells_overlapping(&self, rect: RectF) -> Vec<usize> {
        let col_lo = (rect.left() / self.cell_width).floor() as i32;
        let col_hi = (rect.right() / self.cell_width).floor() as i32;
        let row_lo = (rect.top() / self.cell_height).floor() as i32;
        let row_hi = (rect.bottom() / self.cell_height).floor() as i32;

        let mut found = Vec::new();
        for row in row_lo.max(-1)..=row_hi.min(self.rows as i32) {
            for column in col_lo.max(-1)..=col_hi.min(self.columns as i32) {
                if let Some(idx) = self.cell_index(column, row) {
                    found.push(idx);
                }
            }
        }
        found
    }

    /// Register (or re-register) a body's membership from its bounds.
    /// Idempotent: registering an already-present body just refreshes it.
    pub fn register(&mut self, id: BodyId, bounds: RectF) {
        if self.occupancy.contains_key(&id) {
            self.unregister(id);
        }
        let overlapped = self.cells_overlapping(bounds);
        for &idx in &overlapped {
            self.cells[idx].add(id);
        }
        self.occupancy.insert(id, overlapped);
    }

    /// Remove a body from every cell it occupies; unknown ids are a no-op
    pub fn unregister(&mut self, id: BodyId) {
        if let Some(occupied) = self.occupancy.remove(&id) {
            for idx in occupied {
                self.cells[idx].remove(id);
            }
        }
    }
}
