//! Deterministic simulation module
//!
//! All cell-level logic lives here. This module must be pure and deterministic:
//! - Caller-supplied elapsed time only
//! - Stable iteration order (registry order, then grid order)
//! - No rendering or platform dependencies

pub mod automaton;
pub mod cell;
pub mod events;
pub mod fog;
pub mod grid;
pub mod state;
pub mod tick;

pub use automaton::{ActiveCell, ActiveKind, ActiveSet, CellAutomaton, SparseSet};
pub use cell::{Cell, FloorMaterial, Layer, WallMaterial};
pub use events::SimEvent;
pub use fog::{FogFades, Propagation, RevealMode};
pub use grid::{Grid, NEIGHBORS_4, NEIGHBORS_8};
pub use state::{Asteroid, Census};
pub use tick::{StressSource, TickInput, detonate, tick};
