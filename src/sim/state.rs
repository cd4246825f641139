//! Asteroid state and grid mutations
//!
//! `Asteroid` exclusively owns the cell grid. Every mutation goes through its
//! methods so fog propagation and automaton bookkeeping stay in step with the
//! cells: clearing a wall re-runs fog propagation seeded at that cell and
//! cancels any explosion pending there.

use glam::IVec2;

use super::automaton::CellAutomaton;
use super::cell::{Cell, FloorMaterial, Layer, WallMaterial};
use super::events::SimEvent;
use super::fog::{FogFades, Propagation, RevealMode};
use super::grid::Grid;
use crate::error::GenerationError;
use crate::generation::AsteroidGenerator;
use crate::settings::Settings;

/// Material counts across the grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    walls: [usize; WallMaterial::ALL.len()],
    floors: [usize; FloorMaterial::ALL.len()],
}

impl Census {
    pub fn walls(&self, material: WallMaterial) -> usize {
        self.walls[material as usize]
    }

    pub fn floors(&self, material: FloorMaterial) -> usize {
        self.floors[material as usize]
    }
}

/// A generated asteroid and its evolving simulation state
#[derive(Debug, Clone)]
pub struct Asteroid {
    /// Seed the terrain was generated from
    pub seed: u64,
    /// Player spawn position (center of the landing pad)
    pub spawn: IVec2,
    /// Simulated time in milliseconds
    pub time_ms: f64,
    pub(crate) settings: Settings,
    pub(crate) grid: Grid,
    pub(crate) automaton: CellAutomaton,
    pub(crate) fades: FogFades,
    pub(crate) events: Vec<SimEvent>,
}

impl Asteroid {
    /// Wrap an existing grid; nothing is explored yet
    pub fn from_grid(grid: Grid, settings: Settings) -> Self {
        let cell_count = grid.len();
        Self {
            seed: 0,
            spawn: IVec2::ZERO,
            time_ms: 0.0,
            settings,
            grid,
            automaton: CellAutomaton::new(cell_count),
            fades: FogFades::default(),
            events: Vec::new(),
        }
    }

    /// Generate a new asteroid and reveal the area around its landing pad
    pub fn generate(seed: u64, settings: Settings) -> Result<Self, GenerationError> {
        settings
            .fog
            .validate()
            .and_then(|()| settings.automaton.validate())
            .map_err(GenerationError::from_settings)?;
        let generated = AsteroidGenerator::new(settings.generation.clone()).generate(seed)?;
        let mut asteroid = Self::from_grid(generated.grid, settings);
        asteroid.seed = seed;
        asteroid.spawn = generated.spawn;

        let mut revealed = 0;
        for pos in generated.pad {
            revealed += asteroid.propagation(RevealMode::Snap).explore(pos);
        }
        log::info!(
            "Asteroid {}: spawn at ({}, {}), {} cells within sight",
            seed,
            asteroid.spawn.x,
            asteroid.spawn.y,
            revealed
        );
        Ok(asteroid)
    }

    pub(crate) fn propagation(&mut self, mode: RevealMode) -> Propagation<'_> {
        Propagation {
            grid: &mut self.grid,
            fog: &self.settings.fog,
            mode,
            fades: &mut self.fades,
            events: &mut self.events,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn automaton(&self) -> &CellAutomaton {
        &self.automaton
    }

    /// Cells currently fading out of the fog
    pub fn fading_cells(&self) -> usize {
        self.fades.len()
    }

    // --- Queries (out of range resolves to the void cell) ---

    pub fn cell(&self, pos: IVec2) -> &Cell {
        self.grid.cell(pos)
    }

    pub fn get_wall(&self, pos: IVec2) -> WallMaterial {
        self.grid.cell(pos).wall
    }

    pub fn get_floor(&self, pos: IVec2) -> FloorMaterial {
        self.grid.cell(pos).floor
    }

    pub fn get_layer(&self, pos: IVec2) -> Layer {
        self.grid.cell(pos).layer
    }

    pub fn get_stability(&self, pos: IVec2) -> f32 {
        self.grid.cell(pos).stability
    }

    pub fn get_fog_opacity(&self, pos: IVec2) -> f32 {
        self.grid.cell(pos).fog_opacity
    }

    pub fn get_distance(&self, pos: IVec2) -> i32 {
        self.grid.cell(pos).distance
    }

    /// True if a pending explosion is registered at `pos`
    pub fn is_explosion_pending(&self, pos: IVec2) -> bool {
        self.grid
            .index(pos)
            .is_some_and(|i| self.automaton.explosions.contains(i))
    }

    /// True if a pending floor collapse is registered at `pos`
    pub fn is_collapse_pending(&self, pos: IVec2) -> bool {
        self.grid
            .index(pos)
            .is_some_and(|i| self.automaton.collapses.contains(i))
    }

    pub fn is_critical(&self, pos: IVec2) -> bool {
        self.grid
            .index(pos)
            .is_some_and(|i| self.automaton.critical.contains(i))
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for cell in self.grid.cells() {
            census.walls[cell.wall as usize] += 1;
            census.floors[cell.floor as usize] += 1;
        }
        census
    }

    // --- Mutations ---

    /// Drill out a wall
    ///
    /// No-op for empty walls and SolidRock. Returns the removed material so
    /// the mining collaborator can handle drops.
    pub fn mine_wall(&mut self, pos: IVec2) -> Option<WallMaterial> {
        if !self.get_wall(pos).is_mineable() {
            return None;
        }
        self.clear_wall(pos)
    }

    /// Remove a wall regardless of mineability
    ///
    /// Cancels a pending explosion at the cell and re-runs fog propagation
    /// from it. No-op (and no propagation) if the wall is already empty.
    pub fn clear_wall(&mut self, pos: IVec2) -> Option<WallMaterial> {
        let index = self.grid.index(pos)?;
        let material = self.grid.at(index).wall;
        if material == WallMaterial::Empty {
            return None;
        }
        self.grid.at_mut(index).wall = WallMaterial::Empty;
        self.automaton.explosions.cancel(index);
        self.events.push(SimEvent::WallCleared { pos, material });
        self.propagation(RevealMode::Fade).mark_distances(pos);
        Some(material)
    }

    /// Turn a floor to lava
    ///
    /// Void cells stay void. Cancels a pending collapse at the cell.
    /// Returns false if nothing changed.
    pub fn set_floor_to_lava(&mut self, pos: IVec2) -> bool {
        let Some(index) = self.grid.index(pos) else {
            return false;
        };
        self.automaton.collapses.cancel(index);
        let cell = self.grid.at_mut(index);
        if cell.floor == FloorMaterial::Empty || cell.floor == FloorMaterial::Lava {
            return false;
        }
        cell.floor = FloorMaterial::Lava;
        self.events.push(SimEvent::FloorCollapsed { pos });
        true
    }

    /// Light the fuse on explosive rock
    ///
    /// No-op unless the wall is ExplosiveRock. A fuse already burning keeps
    /// the shorter of the two timers.
    pub fn activate_explosive_cell(&mut self, pos: IVec2, timeout_ms: f32) -> bool {
        let Some(index) = self.grid.index(pos) else {
            return false;
        };
        if self.grid.at(index).wall != WallMaterial::ExplosiveRock {
            return false;
        }
        self.automaton.explosions.register(index, timeout_ms.max(0.0));
        true
    }

    /// Schedule a cracked floor to collapse into lava
    ///
    /// No-op unless the floor is cracked and no wall sits on it.
    pub fn activate_collapsing_floor_cell(&mut self, pos: IVec2) -> bool {
        let Some(index) = self.grid.index(pos) else {
            return false;
        };
        let cell = self.grid.at(index);
        if cell.wall != WallMaterial::Empty || !cell.floor.is_cracked() {
            return false;
        }
        let delay = self.settings.automaton.collapse_delay_ms;
        self.automaton.collapses.register(index, delay);
        true
    }

    /// Weaken fragile cells around `center`
    ///
    /// Each cell within `radius` (center included) loses
    /// `amount / (1 + distance)` stability.
    pub fn apply_stress(&mut self, center: IVec2, amount: f32, radius: f32) {
        if amount <= 0.0 {
            return;
        }
        self.damage_cell(center, amount);
        for (pos, dist) in self.grid.cells_in_radius(center, radius) {
            self.damage_cell(pos, amount / (1.0 + dist));
        }
    }

    /// Remove stability from a single fragile cell
    ///
    /// Crossing the critical threshold marks the cell critical (once) and
    /// turns LavaCracks into CollapsingLavaCracks. Returns false for cells
    /// that are not fragile.
    pub fn damage_cell(&mut self, pos: IVec2, amount: f32) -> bool {
        let Some(index) = self.grid.index(pos) else {
            return false;
        };
        let threshold = self.settings.automaton.critical_threshold;
        let cell = self.grid.at_mut(index);
        if !cell.is_fragile() {
            return false;
        }
        cell.stability = (cell.stability - amount.max(0.0)).clamp(0.0, 1.0);
        if cell.stability > threshold || self.automaton.critical.contains(index) {
            return true;
        }
        if cell.wall == WallMaterial::Empty && cell.floor == FloorMaterial::LavaCracks {
            cell.floor = FloorMaterial::CollapsingLavaCracks;
        }
        self.automaton.critical.insert(index, ());
        self.events.push(SimEvent::CellCritical { pos });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Open floor everywhere, explored from the middle
    fn open_asteroid(size: usize) -> Asteroid {
        let mut grid = Grid::new(size);
        for cell in grid.cells_mut() {
            *cell = Cell::new(WallMaterial::Empty, FloorMaterial::Floor, Layer::Mantle);
        }
        Asteroid::from_grid(grid, Settings::default())
    }

    fn set(asteroid: &mut Asteroid, pos: IVec2, wall: WallMaterial, floor: FloorMaterial) {
        let cell = asteroid.grid.cell_mut(pos).unwrap();
        cell.wall = wall;
        cell.floor = floor;
    }

    #[test]
    fn out_of_range_queries_are_void() {
        let asteroid = open_asteroid(4);
        let outside = IVec2::new(-3, 9);
        assert_eq!(asteroid.get_wall(outside), WallMaterial::Empty);
        assert_eq!(asteroid.get_floor(outside), FloorMaterial::Empty);
        assert_eq!(asteroid.get_stability(outside), 1.0);
        assert_eq!(asteroid.get_distance(outside), Cell::UNEXPLORED);
    }

    #[test]
    fn mining_empty_wall_is_a_no_op() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(2, 2);
        asteroid.propagation(RevealMode::Snap).explore(pos);
        let before = asteroid.grid.clone();

        assert_eq!(asteroid.mine_wall(pos), None);
        assert_eq!(asteroid.mine_wall(IVec2::new(50, 50)), None);
        assert!(asteroid.events().is_empty());
        assert_eq!(asteroid.grid.cells(), before.cells());
    }

    #[test]
    fn solid_rock_cannot_be_mined_but_can_be_cleared() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(1, 1);
        set(&mut asteroid, pos, WallMaterial::SolidRock, FloorMaterial::Floor);

        assert_eq!(asteroid.mine_wall(pos), None);
        assert_eq!(asteroid.get_wall(pos), WallMaterial::SolidRock);
        assert_eq!(asteroid.clear_wall(pos), Some(WallMaterial::SolidRock));
        assert_eq!(asteroid.get_wall(pos), WallMaterial::Empty);
    }

    #[test]
    fn mining_reveals_and_connects_floor() {
        let mut asteroid = open_asteroid(5);
        let wall = IVec2::new(2, 2);
        for y in 0..5 {
            set(&mut asteroid, IVec2::new(2, y), WallMaterial::Rock, FloorMaterial::Floor);
        }
        asteroid.propagation(RevealMode::Snap).explore(IVec2::new(0, 2));
        assert_eq!(asteroid.get_distance(IVec2::new(3, 2)), 2);
        assert_eq!(asteroid.get_distance(IVec2::new(4, 2)), 3);

        assert_eq!(asteroid.mine_wall(wall), Some(WallMaterial::Rock));
        assert_eq!(asteroid.get_distance(wall), 0);
        assert_eq!(asteroid.get_distance(IVec2::new(4, 2)), 0);
        assert!(matches!(
            asteroid.events()[0],
            SimEvent::WallCleared { material: WallMaterial::Rock, .. }
        ));
    }

    #[test]
    fn mining_cancels_pending_explosion() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(3, 3);
        set(&mut asteroid, pos, WallMaterial::ExplosiveRock, FloorMaterial::Floor);

        assert!(asteroid.activate_explosive_cell(pos, 1000.0));
        assert!(asteroid.is_explosion_pending(pos));
        assert_eq!(asteroid.mine_wall(pos), Some(WallMaterial::ExplosiveRock));
        assert!(!asteroid.is_explosion_pending(pos));
    }

    #[test]
    fn explosive_activation_requires_explosive_rock() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(1, 3);
        assert!(!asteroid.activate_explosive_cell(pos, 100.0));
        set(&mut asteroid, pos, WallMaterial::Rock, FloorMaterial::Floor);
        assert!(!asteroid.activate_explosive_cell(pos, 100.0));
        assert!(asteroid.automaton().explosions.is_empty());
    }

    #[test]
    fn double_activation_keeps_shorter_fuse() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(1, 3);
        set(&mut asteroid, pos, WallMaterial::ExplosiveRock, FloorMaterial::Floor);
        asteroid.activate_explosive_cell(pos, 800.0);
        asteroid.activate_explosive_cell(pos, 300.0);
        asteroid.activate_explosive_cell(pos, 900.0);

        let index = asteroid.grid.index(pos).unwrap();
        assert_eq!(asteroid.automaton().explosions.remaining(index), Some(300.0));
        assert_eq!(asteroid.automaton().explosions.len(), 1);
    }

    #[test]
    fn collapse_activation_requires_open_cracked_floor() {
        let mut asteroid = open_asteroid(5);
        let plain = IVec2::new(0, 0);
        let buried = IVec2::new(1, 0);
        let cracked = IVec2::new(2, 0);
        set(&mut asteroid, buried, WallMaterial::Rock, FloorMaterial::LavaCracks);
        set(&mut asteroid, cracked, WallMaterial::Empty, FloorMaterial::LavaCracks);

        assert!(!asteroid.activate_collapsing_floor_cell(plain));
        assert!(!asteroid.activate_collapsing_floor_cell(buried));
        assert!(!asteroid.activate_collapsing_floor_cell(IVec2::new(-1, 0)));
        assert!(asteroid.activate_collapsing_floor_cell(cracked));
        assert!(asteroid.is_collapse_pending(cracked));
    }

    #[test]
    fn lava_conversion_cancels_pending_collapse() {
        let mut asteroid = open_asteroid(5);
        let pos = IVec2::new(2, 2);
        set(&mut asteroid, pos, WallMaterial::Empty, FloorMaterial::LavaCracks);
        asteroid.activate_collapsing_floor_cell(pos);

        assert!(asteroid.set_floor_to_lava(pos));
        assert_eq!(asteroid.get_floor(pos), FloorMaterial::Lava);
        assert!(!asteroid.is_collapse_pending(pos));
        assert!(!asteroid.set_floor_to_lava(pos));
    }

    #[test]
    fn stress_marks_fragile_cells_critical_once() {
        let mut asteroid = open_asteroid(7);
        let cracked = IVec2::new(3, 3);
        set(&mut asteroid, cracked, WallMaterial::Empty, FloorMaterial::LavaCracks);

        asteroid.apply_stress(cracked, 0.3, 2.0);
        assert!((asteroid.get_stability(cracked) - 0.7).abs() < 1e-6);
        assert!(!asteroid.is_critical(cracked));

        asteroid.apply_stress(cracked, 0.3, 2.0);
        assert!(asteroid.is_critical(cracked));
        assert_eq!(asteroid.get_floor(cracked), FloorMaterial::CollapsingLavaCracks);

        asteroid.apply_stress(cracked, 0.3, 2.0);
        let criticals = asteroid
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::CellCritical { .. }))
            .count();
        assert_eq!(criticals, 1);
        assert_eq!(asteroid.automaton().critical.len(), 1);
    }

    #[test]
    fn stress_falls_off_with_distance_and_skips_sturdy_cells() {
        let mut asteroid = open_asteroid(7);
        let near = IVec2::new(4, 3);
        set(&mut asteroid, near, WallMaterial::ExplosiveRock, FloorMaterial::Floor);

        asteroid.apply_stress(IVec2::new(3, 3), 0.4, 3.0);
        assert!((asteroid.get_stability(near) - 0.8).abs() < 1e-6);
        assert_eq!(asteroid.get_stability(IVec2::new(3, 3)), 1.0);
    }

    #[test]
    fn census_counts_materials() {
        let mut asteroid = open_asteroid(3);
        set(&mut asteroid, IVec2::new(0, 0), WallMaterial::Gold, FloorMaterial::Floor);
        set(&mut asteroid, IVec2::new(1, 0), WallMaterial::Empty, FloorMaterial::Lava);
        let census = asteroid.census();
        assert_eq!(census.walls(WallMaterial::Gold), 1);
        assert_eq!(census.walls(WallMaterial::Empty), 8);
        assert_eq!(census.floors(FloorMaterial::Lava), 1);
        assert_eq!(census.floors(FloorMaterial::Floor), 8);
    }

    #[test]
    fn generate_rejects_invalid_runtime_settings() {
        let mut settings = Settings::default();
        settings.generation.grid_size = 32;
        settings.automaton.critical_drain_per_ms = f32::NAN;
        let err = Asteroid::generate(1, settings).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidSettings { field: "automaton.critical_drain_per_ms", .. }
        ));
    }

    #[test]
    fn stress_with_huge_radius_or_far_center_is_clamped() {
        let mut asteroid = open_asteroid(5);
        set(&mut asteroid, IVec2::new(0, 0), WallMaterial::Empty, FloorMaterial::LavaCracks);
        set(&mut asteroid, IVec2::new(4, 4), WallMaterial::Empty, FloorMaterial::LavaCracks);

        asteroid.apply_stress(IVec2::new(3, 3), 0.1, 60_000.0);
        assert!(asteroid.get_stability(IVec2::new(0, 0)) < 1.0);
        assert!(asteroid.get_stability(IVec2::new(4, 4)) < 1.0);

        let before = asteroid.get_stability(IVec2::new(4, 4));
        asteroid.apply_stress(IVec2::new(i32::MAX, 0), 0.5, 2.0);
        asteroid.apply_stress(IVec2::new(i32::MIN, i32::MIN), 0.5, f32::INFINITY);
        asteroid.apply_stress(IVec2::new(2, 2), 0.5, f32::NAN);
        assert_eq!(asteroid.get_stability(IVec2::new(4, 4)), before);
    }
}
