//! Simulation settings
//!
//! Tunables for generation, fog of war and the cell automaton. Loaded from a
//! JSON file when present; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Smallest grid that can hold an asteroid plus its landing pad
pub const MIN_GRID_SIZE: usize = 16;
/// Largest grid accepted (cell ids stay well inside `u32`)
pub const MAX_GRID_SIZE: usize = 4096;
/// Most noise octaves per field
pub const MAX_OCTAVES: u32 = 8;
/// Largest blast or blast-stress radius, in cells
pub const MAX_EFFECT_RADIUS: f32 = 64.0;

/// Asteroid shape and terrain noise parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Grid edge length in cells
    pub grid_size: usize,
    /// Fewest angular segments in the radius profile
    pub segments_min: u32,
    /// Most angular segments in the radius profile
    pub segments_max: u32,
    /// Average rock radius as a fraction of the grid size
    pub average_radius: f32,
    /// Maximum radius deviation from the average (fraction of grid size)
    pub max_deviation: f32,
    /// Largest per-segment step of the radius random walk (fraction of grid size)
    pub walk_step: f32,
    /// Half-width of the box filter applied across segments
    pub smoothing_window: usize,
    /// Narrowest floor band past the rock boundary, in cells
    pub perimeter_min: f32,
    /// Widest floor band past the rock boundary, in cells
    pub perimeter_max: f32,
    /// Fine noise frequency (cycles per cell)
    pub fine_frequency: f32,
    /// Fine noise octave count
    pub fine_octaves: u32,
    /// Coarse noise frequency (cycles per cell)
    pub coarse_frequency: f32,
    /// Coarse noise octave count
    pub coarse_octaves: u32,
    /// Landing pad width in cells
    pub pad_width: usize,
    /// Landing pad height in cells
    pub pad_height: usize,
    /// Contiguous non-empty cells a row needs to host the pad
    pub min_landing_run: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            grid_size: 200,
            segments_min: 90,
            segments_max: 140,
            average_radius: 0.40,
            max_deviation: 0.05,
            walk_step: 0.01,
            smoothing_window: 4,
            perimeter_min: 1.0,
            perimeter_max: 3.0,
            fine_frequency: 0.15,
            fine_octaves: 2,
            coarse_frequency: 0.04,
            coarse_octaves: 1,
            pad_width: 3,
            pad_height: 2,
            min_landing_run: 3,
        }
    }
}

/// Fog-of-war parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    /// Largest BFS distance tracked; farther cells stay at the sentinel
    pub visibility_cap: i32,
    /// Cells at or under this distance are revealed
    pub reveal_distance: i32,
    /// Opacity removed per millisecond while a cell fades in
    pub fade_per_ms: f32,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            visibility_cap: 6,
            reveal_distance: 2,
            fade_per_ms: 1.0 / 400.0,
        }
    }
}

/// Explosion, collapse and stability parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonSettings {
    /// Blast radius in cells
    pub explosion_radius: f32,
    /// Fuse for explosive rock set off by drilling
    pub explosion_fuse_ms: f32,
    /// Fuse for explosive rock caught in another blast
    pub chain_fuse_ms: f32,
    /// Delay before a destabilised cracked floor turns to lava
    pub collapse_delay_ms: f32,
    /// Stability at or under which a fragile cell turns critical
    pub critical_threshold: f32,
    /// Stability drained per millisecond from critical cells
    pub critical_drain_per_ms: f32,
    /// Stability damage a blast deals at its center
    pub explosion_stability_damage: f32,
    /// Radius of the blast's stability damage
    pub explosion_stress_radius: f32,
    /// Stability damage applied to orthogonal neighbours of a cell that turns to lava
    pub lava_neighbor_penalty: f32,
}

impl Default for AutomatonSettings {
    fn default() -> Self {
        Self {
            explosion_radius: 2.5,
            explosion_fuse_ms: 1500.0,
            chain_fuse_ms: 150.0,
            collapse_delay_ms: 600.0,
            critical_threshold: 0.5,
            critical_drain_per_ms: 0.0005,
            explosion_stability_damage: 0.6,
            explosion_stress_radius: 4.0,
            lava_neighbor_penalty: 0.25,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub fog: FogSettings,
    pub automaton: AutomatonSettings,
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a file, validating them
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.generation.validate()?;
        self.fog.validate()?;
        self.automaton.validate()
    }
}

// Range checks are written as `!range.contains(..)` so NaN is rejected too.

impl GenerationSettings {
    /// Check shape, noise and landing pad parameters
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(invalid("generation.grid_size", "must be between 16 and 4096"));
        }
        if self.segments_min < 3 || self.segments_min > self.segments_max {
            return Err(invalid(
                "generation.segments_min",
                "must be at least 3 and not above segments_max",
            ));
        }
        if !(f32::MIN_POSITIVE..0.5).contains(&self.average_radius) {
            return Err(invalid("generation.average_radius", "must be in (0, 0.5)"));
        }
        if !(0.0..self.average_radius).contains(&self.max_deviation) {
            return Err(invalid(
                "generation.max_deviation",
                "must be non-negative and below average_radius",
            ));
        }
        if !(0.0..=0.5).contains(&self.walk_step) {
            return Err(invalid("generation.walk_step", "must be in [0, 0.5]"));
        }
        if !self.perimeter_max.is_finite() || !(0.0..=self.perimeter_max).contains(&self.perimeter_min) {
            return Err(invalid(
                "generation.perimeter_min",
                "must be non-negative and not above a finite perimeter_max",
            ));
        }
        if !(f32::MIN_POSITIVE..=1.0).contains(&self.fine_frequency)
            || !(f32::MIN_POSITIVE..=1.0).contains(&self.coarse_frequency)
        {
            return Err(invalid("generation.fine_frequency", "noise frequencies must be in (0, 1]"));
        }
        if !(1..=MAX_OCTAVES).contains(&self.fine_octaves)
            || !(1..=MAX_OCTAVES).contains(&self.coarse_octaves)
        {
            return Err(invalid("generation.fine_octaves", "octave counts must be between 1 and 8"));
        }
        if self.pad_width == 0 || self.pad_height == 0 || self.min_landing_run == 0 {
            return Err(invalid("generation.pad_width", "landing pad dimensions must be positive"));
        }
        if self.pad_width > MIN_GRID_SIZE || self.pad_height > MIN_GRID_SIZE {
            return Err(invalid("generation.pad_width", "landing pad must fit the smallest grid"));
        }
        Ok(())
    }
}

impl FogSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.visibility_cap < 1 {
            return Err(invalid("fog.visibility_cap", "must be at least 1"));
        }
        if !(0..=self.visibility_cap).contains(&self.reveal_distance) {
            return Err(invalid("fog.reveal_distance", "must be within [0, visibility_cap]"));
        }
        if !(f32::MIN_POSITIVE..=1.0).contains(&self.fade_per_ms) {
            return Err(invalid("fog.fade_per_ms", "must be in (0, 1]"));
        }
        Ok(())
    }
}

impl AutomatonSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(f32::MIN_POSITIVE..1.0).contains(&self.critical_threshold) {
            return Err(invalid("automaton.critical_threshold", "must be in (0, 1)"));
        }
        if !(f32::MIN_POSITIVE..=1.0).contains(&self.critical_drain_per_ms) {
            return Err(invalid("automaton.critical_drain_per_ms", "must be in (0, 1]"));
        }
        if !(1.0..=MAX_EFFECT_RADIUS).contains(&self.explosion_radius) {
            return Err(invalid("automaton.explosion_radius", "must be between 1 and 64"));
        }
        if !(0.0..=MAX_EFFECT_RADIUS).contains(&self.explosion_stress_radius) {
            return Err(invalid("automaton.explosion_stress_radius", "must be between 0 and 64"));
        }
        let timers = [self.explosion_fuse_ms, self.chain_fuse_ms, self.collapse_delay_ms];
        if timers.iter().any(|t| !(0.0..f32::MAX).contains(t)) {
            return Err(invalid(
                "automaton.explosion_fuse_ms",
                "timers must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.explosion_stability_damage)
            || !(0.0..=1.0).contains(&self.lava_neighbor_penalty)
        {
            return Err(invalid(
                "automaton.explosion_stability_damage",
                "damage constants must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "generation": { "grid_size": 64 } }"#).unwrap();
        assert_eq!(settings.generation.grid_size, 64);
        assert_eq!(settings.generation.pad_width, 3);
        assert_eq!(settings.fog.visibility_cap, FogSettings::default().visibility_cap);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Settings::from_json(r#"{ "automaton": { "critical_threshold": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid { field: "automaton.critical_threshold", .. }
        ));
    }

    #[test]
    fn rejects_tiny_grid() {
        let err = Settings::from_json(r#"{ "generation": { "grid_size": 4 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "generation.grid_size", .. }));
    }

    #[test]
    fn nan_fields_are_rejected() {
        let mut settings = Settings::default();
        settings.generation.walk_step = f32::NAN;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "generation.walk_step", .. })
        ));

        let mut settings = Settings::default();
        settings.automaton.critical_threshold = f32::NAN;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "automaton.critical_threshold", .. })
        ));

        let mut settings = Settings::default();
        settings.fog.fade_per_ms = f32::NAN;
        assert!(settings.fog.validate().is_err());
    }

    #[test]
    fn groups_validate_independently() {
        let mut generation = GenerationSettings::default();
        assert!(generation.validate().is_ok());
        generation.fine_octaves = 0;
        assert!(matches!(
            generation.validate(),
            Err(SettingsError::Invalid { field: "generation.fine_octaves", .. })
        ));
        assert!(AutomatonSettings::default().validate().is_ok());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut settings = Settings::default();
        settings.fog.reveal_distance = 1;
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.fog.reveal_distance, 1);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let settings = Settings::load("/definitely/not/here.json");
        assert_eq!(settings.generation.grid_size, 200);
    }
}
