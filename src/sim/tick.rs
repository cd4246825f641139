//! Per-frame simulation step
//!
//! Order within a tick: explosion fuses, floor collapses, caller stress,
//! critical drain, fog fades. A fuse primed by a detonation, or a collapse
//! scheduled by another collapse, starts counting down on the next tick.

use glam::IVec2;

use super::cell::WallMaterial;
use super::events::SimEvent;
use super::grid::NEIGHBORS_4;
use super::state::Asteroid;

/// Stability damage from activity near a position (drilling, footsteps)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressSource {
    pub pos: IVec2,
    /// Damage at the source; falls off as `amount / (1 + distance)`
    pub amount: f32,
    pub radius: f32,
}

/// Caller-supplied input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub stress: Vec<StressSource>,
}

/// Advance the asteroid by `elapsed_ms`
pub fn tick(asteroid: &mut Asteroid, input: &TickInput, elapsed_ms: f32) {
    let elapsed_ms = elapsed_ms.max(0.0);
    asteroid.time_ms += f64::from(elapsed_ms);

    for index in asteroid.automaton.explosions.advance(elapsed_ms) {
        let pos = asteroid.grid.position(index);
        detonate(asteroid, pos);
    }

    for index in asteroid.automaton.collapses.advance(elapsed_ms) {
        let pos = asteroid.grid.position(index);
        collapse(asteroid, pos);
    }

    for source in &input.stress {
        asteroid.apply_stress(source.pos, source.amount, source.radius);
    }

    drain_critical(asteroid, elapsed_ms);

    let fade_per_ms = asteroid.settings.fog.fade_per_ms;
    asteroid
        .fades
        .advance(&mut asteroid.grid, elapsed_ms, fade_per_ms);
}

/// Blow up the cell at `pos`
///
/// Explosive rock in the blast radius gets a short fuse; every other
/// destructible wall is destroyed outright and the floor underneath is
/// scheduled to collapse.
pub fn detonate(asteroid: &mut Asteroid, pos: IVec2) {
    let radius = asteroid.settings.automaton.explosion_radius;
    let chain_fuse = asteroid.settings.automaton.chain_fuse_ms;
    let damage = asteroid.settings.automaton.explosion_stability_damage;
    let stress_radius = asteroid.settings.automaton.explosion_stress_radius;

    asteroid.clear_wall(pos);
    asteroid.events.push(SimEvent::Explosion { pos, radius });
    asteroid.activate_collapsing_floor_cell(pos);

    let mut chained = 0;
    for (target, _) in asteroid.grid.cells_in_radius(pos, radius) {
        let wall = asteroid.get_wall(target);
        if wall == WallMaterial::ExplosiveRock {
            if asteroid.activate_explosive_cell(target, chain_fuse) {
                chained += 1;
            }
            continue;
        }
        if wall.is_destructible() {
            asteroid.clear_wall(target);
        }
        asteroid.activate_collapsing_floor_cell(target);
    }
    log::debug!(
        "Detonation at ({}, {}): {} explosive neighbours primed",
        pos.x,
        pos.y,
        chained
    );

    asteroid.apply_stress(pos, damage, stress_radius);
}

/// Collapse the floor at `pos` into lava and spread along floor seams
fn collapse(asteroid: &mut Asteroid, pos: IVec2) {
    asteroid.set_floor_to_lava(pos);
    for offset in NEIGHBORS_4 {
        asteroid.activate_collapsing_floor_cell(pos + offset);
    }
}

/// Drain every critical cell and resolve the ones that hit zero
fn drain_critical(asteroid: &mut Asteroid, elapsed_ms: f32) {
    let drain = asteroid.settings.automaton.critical_drain_per_ms * elapsed_ms;
    let mut resolved = Vec::new();
    for index in asteroid.automaton.critical.indices() {
        let cell = asteroid.grid.at_mut(index);
        cell.stability = (cell.stability - drain).max(0.0);
        if cell.stability <= 0.0 {
            resolved.push(index);
        }
    }

    for index in resolved {
        asteroid.automaton.critical.remove(index);
        let pos = asteroid.grid.position(index);
        resolve_critical(asteroid, pos);
    }
}

/// A critical cell ran out of stability
fn resolve_critical(asteroid: &mut Asteroid, pos: IVec2) {
    let cell = *asteroid.cell(pos);
    if cell.wall == WallMaterial::ExplosiveRock {
        log::debug!("Unstable explosive rock at ({}, {}) detonated", pos.x, pos.y);
        detonate(asteroid, pos);
    } else if cell.wall == WallMaterial::Empty && cell.floor.is_cracked() {
        asteroid.set_floor_to_lava(pos);
        let penalty = asteroid.settings.automaton.lava_neighbor_penalty;
        for offset in NEIGHBORS_4 {
            asteroid.damage_cell(pos + offset, penalty);
        }
    }
}
