//! Terrain classification rules
//!
//! A rule table maps (distance from center, fine noise, coarse noise) to a
//! wall and a floor material. Rules are walked in order and the first rule
//! to match fills each slot; later rules only fill what is still unset.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::cell::{FloorMaterial, Layer, WallMaterial};

/// Inclusive interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub min: f32,
    pub max: f32,
}

impl Window {
    pub const UNIT: Window = Window { min: 0.0, max: 1.0 };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn lerp(&self, other: &Window, t: f32) -> Window {
        Window {
            min: self.min + (other.min - self.min) * t,
            max: self.max + (other.max - self.max) * t,
        }
    }
}

/// Constraint on one noise channel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum NoiseWindow {
    /// Unconstrained
    #[default]
    Any,
    Fixed(Window),
    /// Window interpolated linearly from `center` (distance 0) to `edge` (distance 1)
    Tapered { center: Window, edge: Window },
}

impl NoiseWindow {
    /// Concrete window at a distance, `None` when unconstrained
    pub fn at(&self, distance: f32) -> Option<Window> {
        match self {
            NoiseWindow::Any => None,
            NoiseWindow::Fixed(window) => Some(*window),
            NoiseWindow::Tapered { center, edge } => {
                Some(center.lerp(edge, distance.clamp(0.0, 1.0)))
            }
        }
    }

    pub fn matches(&self, distance: f32, value: f32) -> bool {
        self.at(distance).is_none_or(|w| w.contains(value))
    }
}

/// Materials a rule writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignment {
    Wall(WallMaterial),
    Floor(FloorMaterial),
    Both {
        wall: WallMaterial,
        floor: FloorMaterial,
    },
}

impl Assignment {
    fn wall(&self) -> Option<WallMaterial> {
        match *self {
            Assignment::Wall(wall) | Assignment::Both { wall, .. } => Some(wall),
            Assignment::Floor(_) => None,
        }
    }

    fn floor(&self) -> Option<FloorMaterial> {
        match *self {
            Assignment::Floor(floor) | Assignment::Both { floor, .. } => Some(floor),
            Assignment::Wall(_) => None,
        }
    }
}

/// One entry of the rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainRule {
    pub name: String,
    #[serde(default)]
    pub layer: Layer,
    pub distance: Window,
    #[serde(default)]
    pub noise1: NoiseWindow,
    #[serde(default)]
    pub noise2: NoiseWindow,
    pub assign: Assignment,
}

impl TerrainRule {
    pub fn new(name: &str, layer: Layer, distance: Window, assign: Assignment) -> Self {
        Self {
            name: name.to_string(),
            layer,
            distance,
            noise1: NoiseWindow::Any,
            noise2: NoiseWindow::Any,
            assign,
        }
    }

    pub fn with_noise1(mut self, window: NoiseWindow) -> Self {
        self.noise1 = window;
        self
    }

    pub fn with_noise2(mut self, window: NoiseWindow) -> Self {
        self.noise2 = window;
        self
    }

    pub fn matches(&self, sample: &TerrainSample) -> bool {
        self.distance.contains(sample.distance)
            && self.noise1.matches(sample.distance, sample.noise1)
            && self.noise2.matches(sample.distance, sample.noise2)
    }
}

/// Per-cell classifier input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    /// 0 at the asteroid center, 1 at its rock boundary
    pub distance: f32,
    /// Fine noise
    pub noise1: f32,
    /// Coarse noise
    pub noise2: f32,
}

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub wall: WallMaterial,
    pub floor: FloorMaterial,
    pub layer: Layer,
}

/// Ordered rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<TerrainRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<TerrainRule>) -> Self {
        Self { rules }
    }

    /// Parse a rule table from a JSON array
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rules(&self) -> &[TerrainRule] {
        &self.rules
    }

    /// Classify one cell; unassigned slots stay `Empty`
    pub fn classify(&self, sample: &TerrainSample) -> Classification {
        let mut wall = None;
        let mut floor = None;
        let mut layer = None;

        for rule in &self.rules {
            if !rule.matches(sample) {
                continue;
            }
            let mut contributed = false;
            if wall.is_none() {
                if let Some(w) = rule.assign.wall() {
                    wall = Some(w);
                    contributed = true;
                }
            }
            if floor.is_none() {
                if let Some(f) = rule.assign.floor() {
                    floor = Some(f);
                    contributed = true;
                }
            }
            if contributed && layer.is_none() {
                layer = Some(rule.layer);
            }
            if wall.is_some() && floor.is_some() {
                break;
            }
        }

        Classification {
            wall: wall.unwrap_or_default(),
            floor: floor.unwrap_or_default(),
            layer: layer.unwrap_or_default(),
        }
    }

    /// Standard asteroid: crust of loose rock and nickel, a mantle with ore
    /// veins and caves, and a core of lava lakes, cracks and diamonds
    pub fn asteroid_default() -> Self {
        use FloorMaterial as F;
        use WallMaterial as W;

        let fixed = |min, max| NoiseWindow::Fixed(Window::new(min, max));

        Self::new(vec![
            TerrainRule::new(
                "lava lake",
                Layer::Core,
                Window::new(0.0, 0.45),
                Assignment::Both { wall: W::Empty, floor: F::Lava },
            )
            .with_noise2(fixed(0.62, 1.0)),
            TerrainRule::new(
                "lava cracks",
                Layer::Core,
                Window::new(0.0, 0.5),
                Assignment::Both { wall: W::Empty, floor: F::LavaCracks },
            )
            .with_noise2(fixed(0.55, 0.62)),
            TerrainRule::new("diamond", Layer::Core, Window::new(0.0, 0.35), Assignment::Wall(W::Diamond))
                .with_noise1(fixed(0.0, 0.05)),
            TerrainRule::new("ruby", Layer::Mantle, Window::new(0.2, 0.65), Assignment::Wall(W::Ruby))
                .with_noise1(fixed(0.95, 1.0)),
            // Gold veins thin out toward the surface
            TerrainRule::new("gold", Layer::Mantle, Window::new(0.3, 0.85), Assignment::Wall(W::Gold))
                .with_noise1(NoiseWindow::Tapered {
                    center: Window::new(0.45, 0.53),
                    edge: Window::new(0.49, 0.51),
                }),
            TerrainRule::new("nickel", Layer::Crust, Window::new(0.55, 1.0), Assignment::Wall(W::Nickel))
                .with_noise1(fixed(0.12, 0.19)),
            TerrainRule::new(
                "explosive",
                Layer::Mantle,
                Window::new(0.15, 0.9),
                Assignment::Wall(W::ExplosiveRock),
            )
            .with_noise1(fixed(0.3, 0.7))
            .with_noise2(fixed(0.28, 0.32)),
            TerrainRule::new(
                "cave",
                Layer::Mantle,
                Window::new(0.1, 0.85),
                Assignment::Both { wall: W::Empty, floor: F::Floor },
            )
            .with_noise1(fixed(0.74, 0.8)),
            TerrainRule::new("solid outcrop", Layer::Crust, Window::new(0.88, 1.0), Assignment::Wall(W::SolidRock))
                .with_noise1(fixed(0.8, 1.0)),
            TerrainRule::new("loose crust", Layer::Crust, Window::new(0.8, 1.0), Assignment::Wall(W::LooseRock)),
            TerrainRule::new("mantle rock", Layer::Mantle, Window::new(0.35, 0.8), Assignment::Wall(W::Rock)),
            TerrainRule::new("core rock", Layer::Core, Window::new(0.0, 0.35), Assignment::Wall(W::Rock)),
            TerrainRule::new(
                "cracked core floor",
                Layer::Core,
                Window::new(0.0, 0.3),
                Assignment::Floor(F::LavaCracks),
            )
            .with_noise2(fixed(0.5, 0.55)),
            TerrainRule::new("floor", Layer::Crust, Window::UNIT, Assignment::Floor(F::Floor)),
        ])
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::asteroid_default()
    }
}
