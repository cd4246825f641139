//! Fog of war: distance-to-explored-floor propagation
//!
//! Every non-void cell tracks how many 8-connected hops separate it from
//! floor the player has already reached. Open floor touching explored floor
//! is itself explored (distance 0); everything else is one hop farther than
//! its best neighbour, up to the visibility cap. Distances only ever shrink,
//! so a re-run seeded at a freshly cleared wall only revisits cells whose
//! distance actually improves.

use std::collections::VecDeque;

use glam::IVec2;

use super::cell::Cell;
use super::events::SimEvent;
use super::grid::{Grid, NEIGHBORS_8};
use crate::settings::FogSettings;

/// How newly revealed cells lose their fog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// Opacity drops to 0 immediately (initial generation pass)
    Snap,
    /// Opacity animates toward 0 over subsequent ticks
    Fade,
}

/// Cells whose fog is animating toward clear
#[derive(Debug, Clone, Default)]
pub struct FogFades {
    cells: Vec<usize>,
}

impl FogFades {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn push(&mut self, index: usize) {
        self.cells.push(index);
    }

    /// Fade every registered cell; drops cells that became fully clear
    pub fn advance(&mut self, grid: &mut Grid, elapsed_ms: f32, fade_per_ms: f32) {
        let step = (elapsed_ms * fade_per_ms).max(0.0);
        self.cells.retain(|&i| {
            let cell = grid.at_mut(i);
            cell.fog_opacity = (cell.fog_opacity - step).max(0.0);
            cell.fog_opacity > 0.0
        });
    }
}

/// Bookkeeping shared by one propagation run
pub struct Propagation<'a> {
    pub grid: &'a mut Grid,
    pub fog: &'a FogSettings,
    pub mode: RevealMode,
    pub fades: &'a mut FogFades,
    pub events: &'a mut Vec<SimEvent>,
}

impl Propagation<'_> {
    /// Mark an open floor cell as explored, then propagate from it
    ///
    /// Walls and void cells are left alone. Returns the number of cells whose
    /// distance changed.
    pub fn explore(&mut self, pos: IVec2) -> usize {
        let Some(index) = self.grid.index(pos) else {
            return 0;
        };
        if !self.grid.at(index).is_open_floor() {
            return 0;
        }
        let mut changed = 0;
        if self.grid.at(index).distance != 0 {
            self.set_distance(index, 0);
            changed += 1;
        }
        changed + self.mark_distances(pos)
    }

    /// Re-evaluate distances seeded at `seed`
    ///
    /// The seed first settles against its neighbours' existing distances,
    /// then improvements flow outward (0-1 BFS: zero-cost hops between open
    /// floor go to the front of the queue). Returns the number of cells whose
    /// distance changed.
    pub fn mark_distances(&mut self, seed: IVec2) -> usize {
        let Some(seed_index) = self.grid.index(seed) else {
            return 0;
        };
        if self.grid.at(seed_index).is_void() {
            return 0;
        }

        let cap = self.fog.visibility_cap;
        let mut changed = 0;

        if let Some(best) = self.settle(seed) {
            if improves(self.grid.at(seed_index).distance, best) {
                self.set_distance(seed_index, best);
                changed += 1;
            }
        }
        if self.grid.at(seed_index).distance == Cell::UNEXPLORED {
            return changed;
        }

        let mut queue = VecDeque::new();
        queue.push_back(seed_index);

        while let Some(index) = queue.pop_front() {
            let pos = self.grid.position(index);
            let current = self.grid.at(index).distance;

            for offset in NEIGHBORS_8 {
                let Some(n) = self.grid.index(pos + offset) else {
                    continue;
                };
                let neighbor = self.grid.at(n);
                if neighbor.is_void() {
                    continue;
                }
                let connected = current == 0 && neighbor.is_open_floor();
                let candidate = if connected { 0 } else { current + 1 };
                if candidate > cap || !improves(neighbor.distance, candidate) {
                    continue;
                }
                self.set_distance(n, candidate);
                changed += 1;
                if connected {
                    queue.push_front(n);
                } else {
                    queue.push_back(n);
                }
            }
        }

        changed
    }

    /// Best distance `pos` could take from its neighbours, within the cap
    fn settle(&self, pos: IVec2) -> Option<i32> {
        let open = self.grid.cell(pos).is_open_floor();
        NEIGHBORS_8
            .iter()
            .map(|&offset| self.grid.cell(pos + offset))
            .filter(|n| !n.is_void() && n.distance != Cell::UNEXPLORED)
            .map(|n| {
                if n.distance == 0 && open {
                    0
                } else {
                    n.distance + 1
                }
            })
            .min()
            .filter(|&d| d <= self.fog.visibility_cap)
    }

    fn set_distance(&mut self, index: usize, distance: i32) {
        let reveal = self.fog.reveal_distance;
        let cell = self.grid.at_mut(index);
        let was_hidden = cell.distance == Cell::UNEXPLORED || cell.distance > reveal;
        cell.distance = distance;

        if !was_hidden || distance > reveal || cell.fog_opacity <= 0.0 {
            return;
        }
        match self.mode {
            RevealMode::Snap => cell.fog_opacity = 0.0,
            RevealMode::Fade => {
                self.fades.push(index);
                let pos = self.grid.position(index);
                self.events.push(SimEvent::FogFade { pos });
            }
        }
    }
}

#[inline]
fn improves(existing: i32, candidate: i32) -> bool {
    existing == Cell::UNEXPLORED || candidate < existing
}
