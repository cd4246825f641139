//! Asteroid Sim demo
//!
//! Usage: `asteroid-sim [seed] [size] [settings.json]`
//!
//! Generates an asteroid, prints it, lights the explosive rock nearest the
//! landing pad and runs the automaton until everything settles.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use asteroid_sim::{Asteroid, FloorMaterial, Settings, SimEvent, TickInput, WallMaterial, tick};

/// Frame length used to drive the automaton
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Give up after this many frames (ten simulated minutes)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 36_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        None => 42,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let size = match args.next().map(|s| s.parse::<usize>()) {
        None => None,
        Some(Ok(size)) => Some(size),
        Some(Err(e)) => {
            log::error!("Invalid grid size: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut settings = args.next().map(Settings::load).unwrap_or_default();
    if let Some(size) = size {
        settings.generation.grid_size = size;
    }

    let mut asteroid = match Asteroid::generate(seed, settings) {
        Ok(asteroid) => asteroid,
        Err(e) => {
            log::error!("Generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print!("{}", asteroid.grid().to_ascii());
    print_census(&asteroid);

    let Some(target) = nearest_explosive(&asteroid) else {
        println!("\nNo explosive rock on this asteroid");
        return ExitCode::SUCCESS;
    };
    let fuse = asteroid.settings().automaton.explosion_fuse_ms;
    asteroid.activate_explosive_cell(target, fuse);
    println!("\nLit explosive rock at ({}, {}), fuse {} ms", target.x, target.y, fuse);

    let input = TickInput::default();
    let mut frames = 0;
    let mut counts = EventCounts::default();
    while frames < MAX_FRAMES {
        tick(&mut asteroid, &input, FRAME_MS);
        counts.record(&asteroid.drain_events());
        frames += 1;
        if asteroid.automaton().is_idle() && asteroid.fading_cells() == 0 {
            break;
        }
    }

    println!(
        "Settled after {:.1} s: {} explosions, {} walls cleared, {} floors collapsed, {} cells critical, {} fog fades",
        asteroid.time_ms / 1000.0,
        counts.explosions,
        counts.walls_cleared,
        counts.floors_collapsed,
        counts.critical,
        counts.fog_fades
    );
    if frames == MAX_FRAMES {
        log::warn!("Automaton still active after {} frames", MAX_FRAMES);
    }

    print!("\n{}", asteroid.grid().to_ascii());
    print_census(&asteroid);
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on the web
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct EventCounts {
    explosions: usize,
    walls_cleared: usize,
    floors_collapsed: usize,
    critical: usize,
    fog_fades: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl EventCounts {
    fn record(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::Explosion { .. } => self.explosions += 1,
                SimEvent::WallCleared { .. } => self.walls_cleared += 1,
                SimEvent::FloorCollapsed { .. } => self.floors_collapsed += 1,
                SimEvent::CellCritical { .. } => self.critical += 1,
                SimEvent::FogFade { .. } => self.fog_fades += 1,
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn nearest_explosive(asteroid: &Asteroid) -> Option<glam::IVec2> {
    let grid = asteroid.grid();
    grid.cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.wall == WallMaterial::ExplosiveRock)
        .map(|(index, _)| grid.position(index))
        .min_by_key(|pos| pos.distance_squared(asteroid.spawn))
}

#[cfg(not(target_arch = "wasm32"))]
fn print_census(asteroid: &Asteroid) {
    let census = asteroid.census();
    let walls: Vec<String> = WallMaterial::ALL
        .iter()
        .filter(|&&m| m != WallMaterial::Empty)
        .map(|&m| format!("{:?}={}", m, census.walls(m)))
        .collect();
    let floors: Vec<String> = FloorMaterial::ALL
        .iter()
        .filter(|&&m| m != FloorMaterial::Empty)
        .map(|&m| format!("{:?}={}", m, census.floors(m)))
        .collect();
    println!("walls: {}", walls.join(" "));
    println!("floors: {}", floors.join(" "));
}
