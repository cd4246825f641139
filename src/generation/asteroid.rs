//! Asteroid generation
//!
//! Shape comes from a smoothed random radius per angular segment plus a thin
//! band of bare floor just past the rock boundary. Inside the boundary every
//! cell is classified independently by the rule table from its normalised
//! distance and two noise samples. A landing pad is then carved near the
//! bottom of the asteroid.

use std::f32::consts::{PI, TAU};

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::noise::{NoiseField, NoiseSeed};
use super::rules::{RuleSet, TerrainSample};
use crate::error::GenerationError;
use crate::settings::{GenerationSettings, MAX_GRID_SIZE, MIN_GRID_SIZE};
use crate::sim::cell::{Cell, FloorMaterial, Layer, WallMaterial};
use crate::sim::grid::Grid;

/// Irregular outline: rock radius and floor band width per angular segment
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusProfile {
    radii: Vec<f32>,
    perimeter: Vec<f32>,
}

impl RadiusProfile {
    /// Random outline in grid cells
    pub fn generate(rng: &mut Pcg32, settings: &GenerationSettings) -> Self {
        let size = settings.grid_size as f32;
        let lo = settings.segments_min.min(settings.segments_max).max(3);
        let hi = settings.segments_max.max(lo);
        let segments = rng.random_range(lo..=hi) as usize;

        let average = settings.average_radius * size;
        let deviation = settings.max_deviation.abs() * size;
        let step = settings.walk_step.abs() * size;

        let mut radius = average;
        let mut radii = Vec::with_capacity(segments);
        for _ in 0..segments {
            radius = (radius + rng.random_range(-step..=step))
                .clamp(average - deviation, average + deviation);
            radii.push(radius);
        }

        let band_lo = settings.perimeter_min.min(settings.perimeter_max).max(0.0);
        let band_hi = settings.perimeter_max.max(band_lo);
        let perimeter: Vec<f32> = (0..segments)
            .map(|_| rng.random_range(band_lo..=band_hi))
            .collect();

        let window = settings.smoothing_window;
        Self {
            radii: smooth_wrapping(&radii, window),
            perimeter: smooth_wrapping(&perimeter, window),
        }
    }

    pub fn segments(&self) -> usize {
        self.radii.len()
    }

    /// Rock radius and band width at an angle in radians
    pub fn at(&self, angle: f32) -> (f32, f32) {
        let n = self.radii.len();
        let t = (angle + PI).rem_euclid(TAU) / TAU * n as f32;
        let i0 = (t.floor() as usize) % n;
        let i1 = (i0 + 1) % n;
        let frac = t - t.floor();
        (
            self.radii[i0] + (self.radii[i1] - self.radii[i0]) * frac,
            self.perimeter[i0] + (self.perimeter[i1] - self.perimeter[i0]) * frac,
        )
    }
}

/// Box filter of half-width `window` over a ring of values
fn smooth_wrapping(values: &[f32], window: usize) -> Vec<f32> {
    let n = values.len() as isize;
    let w = window as isize;
    (0..n)
        .map(|i| {
            let sum: f32 = (i - w..=i + w)
                .map(|j| values[j.rem_euclid(n) as usize])
                .sum();
            sum / (2 * w + 1) as f32
        })
        .collect()
}

/// Finished terrain plus its landing site
#[derive(Debug, Clone)]
pub struct GeneratedAsteroid {
    pub grid: Grid,
    /// Center of the landing pad
    pub spawn: IVec2,
    /// Every cell of the landing pad
    pub pad: Vec<IVec2>,
}

pub struct AsteroidGenerator {
    settings: GenerationSettings,
    rules: RuleSet,
}

impl AsteroidGenerator {
    pub fn new(settings: GenerationSettings) -> Self {
        Self::with_rules(settings, RuleSet::asteroid_default())
    }

    pub fn with_rules(settings: GenerationSettings, rules: RuleSet) -> Self {
        Self { settings, rules }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build the terrain for a seed; same seed and settings give the same grid
    pub fn generate(&self, seed: u64) -> Result<GeneratedAsteroid, GenerationError> {
        let size = self.settings.grid_size;
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            return Err(GenerationError::InvalidGridSize {
                size,
                min: MIN_GRID_SIZE,
                max: MAX_GRID_SIZE,
            });
        }
        self.settings
            .validate()
            .map_err(GenerationError::from_settings)?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let profile = RadiusProfile::generate(&mut rng, &self.settings);
        let base = NoiseSeed::new(seed);
        let fine = NoiseField::new(
            base.derive(1),
            self.settings.fine_frequency,
            self.settings.fine_octaves,
        );
        let coarse = NoiseField::new(
            base.derive(2),
            self.settings.coarse_frequency,
            self.settings.coarse_octaves,
        );

        let mut grid = Grid::new(size);
        let fill = |(y, row): (usize, &mut [Cell])| {
            self.classify_row(y, row, &profile, &fine, &coarse);
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            grid.cells_mut().par_chunks_mut(size).enumerate().for_each(fill);
        }
        #[cfg(not(feature = "parallel"))]
        grid.rows_mut().enumerate().for_each(fill);

        let (spawn, pad) = self
            .carve_landing_pad(&mut grid)
            .ok_or(GenerationError::NoLandingSite { seed, size })?;

        log::debug!(
            "Generated {}x{} terrain from seed {} ({} segments, pad of {} cells)",
            size,
            size,
            seed,
            profile.segments(),
            pad.len()
        );

        Ok(GeneratedAsteroid { grid, spawn, pad })
    }

    fn classify_row(
        &self,
        y: usize,
        row: &mut [Cell],
        profile: &RadiusProfile,
        fine: &NoiseField,
        coarse: &NoiseField,
    ) {
        let center = Vec2::splat(self.settings.grid_size as f32 / 2.0);
        for (x, cell) in row.iter_mut().enumerate() {
            let offset = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            let dist = offset.length();
            let (radius, band) = profile.at(offset.y.atan2(offset.x));

            *cell = if dist > radius + band {
                Cell::VOID
            } else if dist > radius {
                Cell::new(WallMaterial::Empty, FloorMaterial::Floor, Layer::Crust)
            } else {
                let c = self.rules.classify(&TerrainSample {
                    distance: dist / radius,
                    noise1: fine.sample(x as f32, y as f32),
                    noise2: coarse.sample(x as f32, y as f32),
                });
                Cell::new(c.wall, c.floor, c.layer)
            };
        }
    }

    /// Clear a pad over the first run of solid ground, scanning up from row 0
    fn carve_landing_pad(&self, grid: &mut Grid) -> Option<(IVec2, Vec<IVec2>)> {
        let size = grid.size();
        let min_run = self.settings.min_landing_run.max(1);
        let width = self.settings.pad_width.clamp(1, size);
        let height = self.settings.pad_height.clamp(1, size);

        let (cx, y) = (0..size).find_map(|y| {
            let row = &grid.cells()[y * size..(y + 1) * size];
            first_run(row, min_run).map(|(start, len)| (start + len / 2, y))
        })?;

        let x0 = cx.saturating_sub(width / 2).min(size - width);
        let y0 = y.min(size - height);
        let mut pad = Vec::with_capacity(width * height);
        for py in y0..y0 + height {
            for px in x0..x0 + width {
                let pos = IVec2::new(px as i32, py as i32);
                if let Some(cell) = grid.cell_mut(pos) {
                    let layer = match cell.layer {
                        Layer::None => Layer::Crust,
                        layer => layer,
                    };
                    *cell = Cell::new(WallMaterial::Empty, FloorMaterial::Floor, layer);
                    pad.push(pos);
                }
            }
        }

        Some((IVec2::new(cx as i32, y as i32), pad))
    }
}

/// Start and length of the first run of at least `min_len` non-void cells
fn first_run(row: &[Cell], min_len: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    let mut len = 0;
    for (x, cell) in row.iter().enumerate() {
        if cell.is_void() {
            if len >= min_len {
                return Some((start, len));
            }
            len = 0;
        } else {
            if len == 0 {
                start = x;
            }
            len += 1;
        }
    }
    (len >= min_len).then_some((start, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::rules::{Assignment, TerrainRule, Window};

    fn small(size: usize) -> GenerationSettings {
        GenerationSettings {
            grid_size: size,
            ..Default::default()
        }
    }

    #[test]
    fn same_seed_same_asteroid() {
        let generator = AsteroidGenerator::new(small(64));
        let a = generator.generate(1234).unwrap();
        let b = generator.generate(1234).unwrap();
        assert_eq!(a.spawn, b.spawn);
        assert_eq!(a.pad, b.pad);
        assert_eq!(a.grid.cells(), b.grid.cells());

        let c = generator.generate(1235).unwrap();
        assert_ne!(a.grid.cells(), c.grid.cells());
    }

    #[test]
    fn seed_42_lands_on_clear_floor() {
        let generated = AsteroidGenerator::new(small(50)).generate(42).unwrap();
        let grid = &generated.grid;

        assert_eq!(grid.floor(generated.spawn), FloorMaterial::Floor);
        assert_eq!(grid.wall(generated.spawn), WallMaterial::Empty);
        assert_eq!(generated.pad.len(), 6);
        assert!(generated.pad.contains(&generated.spawn));
        for &pos in &generated.pad {
            assert_eq!(grid.floor(pos), FloorMaterial::Floor);
            assert_eq!(grid.wall(pos), WallMaterial::Empty);
            assert_ne!(grid.cell(pos).layer, Layer::None);
        }
        // Footprint is 3 wide, 2 tall
        let xs: Vec<i32> = generated.pad.iter().map(|p| p.x).collect();
        let ys: Vec<i32> = generated.pad.iter().map(|p| p.y).collect();
        assert_eq!(xs.iter().max().unwrap() - xs.iter().min().unwrap(), 2);
        assert_eq!(ys.iter().max().unwrap() - ys.iter().min().unwrap(), 1);
    }

    #[test]
    fn asteroid_is_surrounded_by_void() {
        let generated = AsteroidGenerator::new(small(80)).generate(7).unwrap();
        let grid = &generated.grid;
        let size = grid.size() as i32;
        for i in 0..size {
            for pos in [IVec2::new(i, 0), IVec2::new(i, size - 1), IVec2::new(0, i), IVec2::new(size - 1, i)] {
                if !generated.pad.contains(&pos) {
                    assert!(grid.cell(pos).is_void(), "edge cell {pos} is not void");
                }
            }
        }
        let center = IVec2::splat(size / 2);
        assert!(!grid.cell(center).is_void());
    }

    #[test]
    fn rejects_out_of_range_grid_sizes() {
        for size in [0, MIN_GRID_SIZE - 1, MAX_GRID_SIZE + 1] {
            let err = AsteroidGenerator::new(small(size)).generate(1).unwrap_err();
            assert_eq!(
                err,
                GenerationError::InvalidGridSize {
                    size,
                    min: MIN_GRID_SIZE,
                    max: MAX_GRID_SIZE
                }
            );
        }
    }

    #[test]
    fn nan_settings_are_an_error_not_a_panic() {
        let settings = GenerationSettings {
            grid_size: 50,
            walk_step: f32::NAN,
            ..Default::default()
        };
        let err = AsteroidGenerator::new(settings).generate(42).unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidSettings {
                field: "generation.walk_step",
                reason: "must be in [0, 0.5]",
            }
        );

        let settings = GenerationSettings {
            grid_size: 50,
            perimeter_max: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            AsteroidGenerator::new(settings).generate(42),
            Err(GenerationError::InvalidSettings { field: "generation.perimeter_min", .. })
        ));
    }

    #[test]
    fn custom_rules_drive_classification() {
        let rules = RuleSet::new(vec![TerrainRule::new(
            "all gold",
            Layer::Mantle,
            Window::UNIT,
            Assignment::Both {
                wall: WallMaterial::Gold,
                floor: FloorMaterial::Floor,
            },
        )]);
        let generated = AsteroidGenerator::with_rules(small(40), rules).generate(3).unwrap();
        let grid = &generated.grid;

        let center = IVec2::splat(20);
        assert_eq!(grid.wall(center), WallMaterial::Gold);
        assert_eq!(grid.cell(center).layer, Layer::Mantle);
        assert!(grid
            .cells()
            .iter()
            .all(|c| matches!(c.wall, WallMaterial::Gold | WallMaterial::Empty)));
    }

    #[test]
    fn all_void_terrain_has_no_landing_site() {
        let settings = GenerationSettings {
            grid_size: 32,
            perimeter_min: 0.0,
            perimeter_max: 0.0,
            ..Default::default()
        };
        let err = AsteroidGenerator::with_rules(settings, RuleSet::new(Vec::new()))
            .generate(9)
            .unwrap_err();
        assert_eq!(err, GenerationError::NoLandingSite { seed: 9, size: 32 });
    }

    #[test]
    fn radius_profile_stays_within_deviation() {
        let settings = small(200);
        let mut rng = Pcg32::seed_from_u64(5);
        let profile = RadiusProfile::generate(&mut rng, &settings);
        assert!((90..=140).contains(&profile.segments()));

        let average = settings.average_radius * 200.0;
        let deviation = settings.max_deviation * 200.0;
        for i in 0..360 {
            let angle = (i as f32).to_radians() - PI;
            let (radius, band) = profile.at(angle);
            assert!((radius - average).abs() <= deviation + 1e-3);
            assert!(band >= settings.perimeter_min - 1e-4 && band <= settings.perimeter_max + 1e-4);
        }
    }

    #[test]
    fn radius_profile_wraps_around() {
        let settings = small(100);
        let mut rng = Pcg32::seed_from_u64(11);
        let profile = RadiusProfile::generate(&mut rng, &settings);
        let (below, _) = profile.at(PI - 1e-4);
        let (above, _) = profile.at(-PI);
        assert!((below - above).abs() < 0.1);
    }

    #[test]
    fn first_run_finds_leftmost_long_enough_run() {
        let solid = Cell::new(WallMaterial::Rock, FloorMaterial::Floor, Layer::Mantle);
        let row = [Cell::VOID, solid, solid, Cell::VOID, solid, solid, solid, solid, Cell::VOID];
        assert_eq!(first_run(&row, 3), Some((4, 4)));
        assert_eq!(first_run(&row, 2), Some((1, 2)));
        assert_eq!(first_run(&row, 5), None);
        assert_eq!(first_run(&[solid; 3], 3), Some((0, 3)));
    }
}
