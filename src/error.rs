//! Error types
//!
//! Only generation and configuration can fail. Grid queries and automaton
//! activations never error: out-of-range reads resolve to a void cell and
//! failed preconditions are silent no-ops.

use thiserror::Error;

/// Errors raised while generating an asteroid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Grid is too small for a landing pad or too large for packed cell ids.
    #[error("invalid grid size {size}: must be between {min} and {max}")]
    InvalidGridSize {
        /// Requested edge length.
        size: usize,
        /// Smallest accepted edge length.
        min: usize,
        /// Largest accepted edge length.
        max: usize,
    },

    /// A tunable was out of range, so generation never started.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSettings {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable constraint.
        reason: &'static str,
    },

    /// No row had enough contiguous terrain to carve a landing pad.
    #[error("no landing site found for seed {seed} on a {size}x{size} grid")]
    NoLandingSite {
        /// Seed that produced the unplayable asteroid.
        seed: u64,
        /// Grid edge length.
        size: usize,
    },
}

impl GenerationError {
    /// Settings that failed validation
    ///
    /// Validation only ever produces [`SettingsError::Invalid`]; other
    /// variants are reported under a placeholder field.
    pub fn from_settings(err: SettingsError) -> Self {
        match err {
            SettingsError::Invalid { field, reason } => Self::InvalidSettings { field, reason },
            _ => Self::InvalidSettings {
                field: "settings",
                reason: "could not be read",
            },
        }
    }
}

/// Errors raised while loading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings JSON was malformed.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was out of its accepted range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable constraint.
        reason: &'static str,
    },
}
