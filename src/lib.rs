//! Asteroid Sim - procedural asteroid terrain and cell automaton
//!
//! Core modules:
//! - `generation`: Seeded noise, terrain rules and asteroid layout
//! - `sim`: Deterministic grid state, fog of war and the cell automaton
//! - `settings`: Data-driven tunables
//! - `error`: Generation and configuration errors

pub mod error;
pub mod generation;
pub mod settings;
pub mod sim;

pub use error::{GenerationError, SettingsError};
pub use generation::{AsteroidGenerator, RuleSet};
pub use settings::Settings;
pub use sim::{Asteroid, FloorMaterial, SimEvent, TickInput, WallMaterial, tick};
