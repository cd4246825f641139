//! Flat row-major cell storage
//!
//! Row 0 is the bottom of the asteroid. Every read is bounds-checked and
//! resolves to [`Cell::VOID`] outside the grid, so neighbourhood scans near
//! the edge need no special-casing.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, FloorMaterial, WallMaterial};

/// 8-connected neighbour offsets
pub const NEIGHBORS_8: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// 4-connected neighbour offsets
pub const NEIGHBORS_4: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
];

/// Square grid of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with void cells
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::VOID; size * size],
        }
    }

    /// Edge length in cells
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total cell count
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    /// Flat index of a position, `None` outside the grid
    #[inline]
    pub fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.size + pos.x as usize)
    }

    /// Position of a flat index
    #[inline]
    pub fn position(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.size) as i32, (index / self.size) as i32)
    }

    /// Cell at a position, or the void cell outside the grid
    #[inline]
    pub fn cell(&self, pos: IVec2) -> &Cell {
        match self.index(pos) {
            Some(i) => &self.cells[i],
            None => &Cell::VOID,
        }
    }

    #[inline]
    pub fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        Some(&mut self.cells[i])
    }

    #[inline]
    pub fn at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    pub fn wall(&self, pos: IVec2) -> WallMaterial {
        self.cell(pos).wall
    }

    pub fn floor(&self, pos: IVec2) -> FloorMaterial {
        self.cell(pos).floor
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable rows, bottom row first
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, Cell> {
        self.cells.chunks_exact_mut(self.size)
    }

    /// Mutable cell slice, for batch passes that must not go through accessors
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// In-bounds cells within `radius` of `center` (center excluded), with their distance
    ///
    /// The scan is clipped to the grid, so any center and any radius are
    /// accepted. A non-finite or negative radius covers nothing.
    pub fn cells_in_radius(&self, center: IVec2, radius: f32) -> Vec<(IVec2, f32)> {
        let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
        let last = self.size as i64 - 1;
        let reach = radius.floor().min(self.size as f32) as i64;
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));

        let mut out = Vec::new();
        for y in (cy - reach).max(0)..=(cy + reach).min(last) {
            for x in (cx - reach).max(0)..=(cx + reach).min(last) {
                let (dx, dy) = (x - cx, y - cy);
                if dx == 0 && dy == 0 {
                    continue;
                }
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist <= radius {
                    out.push((IVec2::new(x as i32, y as i32), dist));
                }
            }
        }
        out
    }

    /// Text dump, top row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.size + 1) * self.size);
        for row in self.cells.chunks_exact(self.size).rev() {
            out.extend(row.iter().map(Cell::glyph));
            out.push('\n');
        }
        out
    }
}
