//! Seeded noise fields
//!
//! Thin wrapper over `noise`'s fractal value noise. Generation needs two
//! independently seeded fields (fine and coarse) sampled on grid
//! coordinates, remapped from the library's [-1, 1] into [0, 1).

use noise::{Fbm, MultiFractal, NoiseFn, Value};
use serde::{Deserialize, Serialize};

use crate::settings::MAX_OCTAVES;

/// Largest `f32` strictly below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Seed for one noise field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    #[inline]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Independent sub-seed for a specific purpose
    #[inline]
    pub const fn derive(self, purpose: u64) -> Self {
        Self(mix(self.0 ^ purpose.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }

    /// Seed in the width the noise library takes
    #[inline]
    pub const fn to_u32(self) -> u32 {
        (self.0 ^ (self.0 >> 32)) as u32
    }
}

/// SplitMix64 finaliser
#[inline]
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic 2D scalar field
#[derive(Clone, Debug)]
pub struct NoiseField {
    fbm: Fbm<Value>,
}

impl NoiseField {
    /// `frequency` is in lattice cycles per grid cell (smaller = longer wavelength)
    pub fn new(seed: NoiseSeed, frequency: f32, octaves: u32) -> Self {
        let fbm = Fbm::<Value>::new(seed.to_u32())
            .set_octaves(octaves.clamp(1, MAX_OCTAVES) as usize)
            .set_frequency(f64::from(frequency))
            .set_lacunarity(2.0)
            .set_persistence(0.5);
        Self { fbm }
    }

    /// Sample the field at grid coordinates; always in [0, 1)
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let raw = self.fbm.get([f64::from(x), f64::from(y)]) as f32;
        let v = raw * 0.5 + 0.5;
        if v.is_nan() {
            return 0.0;
        }
        v.clamp(0.0, BELOW_ONE)
    }
}
