//! Procedural asteroid terrain
//!
//! Generation is a pure function of (settings, rule table, seed). Nothing
//! here touches simulation state beyond producing the initial grid.

pub mod asteroid;
pub mod noise;
pub mod rules;

pub use asteroid::{AsteroidGenerator, GeneratedAsteroid, RadiusProfile};
pub use self::noise::{NoiseField, NoiseSeed};
pub use rules::{
    Assignment, Classification, NoiseWindow, RuleSet, TerrainRule, TerrainSample, Window,
};
