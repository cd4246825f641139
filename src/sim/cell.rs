//! Cell materials and per-cell state

use serde::{Deserialize, Serialize};

/// Solid substance occupying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WallMaterial {
    #[default]
    Empty,
    Rock,
    SolidRock, // Cannot be mined or blasted
    LooseRock,
    Diamond,
    Ruby,
    Gold,
    Nickel,
    ExplosiveRock,
}

impl WallMaterial {
    pub const ALL: [WallMaterial; 9] = [
        WallMaterial::Empty,
        WallMaterial::Rock,
        WallMaterial::SolidRock,
        WallMaterial::LooseRock,
        WallMaterial::Diamond,
        WallMaterial::Ruby,
        WallMaterial::Gold,
        WallMaterial::Nickel,
        WallMaterial::ExplosiveRock,
    ];

    /// True if a drill can remove this wall
    pub fn is_mineable(self) -> bool {
        !matches!(self, WallMaterial::Empty | WallMaterial::SolidRock)
    }

    /// True if a blast can remove this wall
    pub fn is_destructible(self) -> bool {
        self.is_mineable()
    }

    /// Single-character glyph for debug dumps
    pub fn glyph(self) -> char {
        match self {
            WallMaterial::Empty => ' ',
            WallMaterial::Rock => '#',
            WallMaterial::SolidRock => '@',
            WallMaterial::LooseRock => '%',
            WallMaterial::Diamond => 'D',
            WallMaterial::Ruby => 'R',
            WallMaterial::Gold => 'G',
            WallMaterial::Nickel => 'N',
            WallMaterial::ExplosiveRock => '!',
        }
    }
}

/// Walkable surface under an empty wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FloorMaterial {
    #[default]
    Empty,
    Floor,
    Lava,
    LavaCracks,
    CollapsingLavaCracks,
}

impl FloorMaterial {
    pub const ALL: [FloorMaterial; 5] = [
        FloorMaterial::Empty,
        FloorMaterial::Floor,
        FloorMaterial::Lava,
        FloorMaterial::LavaCracks,
        FloorMaterial::CollapsingLavaCracks,
    ];

    /// Cracked floor that can collapse into lava
    pub fn is_cracked(self) -> bool {
        matches!(self, FloorMaterial::LavaCracks | FloorMaterial::CollapsingLavaCracks)
    }

    /// Glyph for an open (wall-less) cell
    pub fn glyph(self) -> char {
        match self {
            FloorMaterial::Empty => ' ',
            FloorMaterial::Floor => '.',
            FloorMaterial::Lava => '~',
            FloorMaterial::LavaCracks => ',',
            FloorMaterial::CollapsingLavaCracks => ';',
        }
    }
}

/// Generation provenance tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    #[default]
    None,
    Crust,
    Mantle,
    Core,
}

/// One grid position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub wall: WallMaterial,
    pub floor: FloorMaterial,
    pub layer: Layer,
    /// Structural stability in [0, 1]; only meaningful for fragile cells
    pub stability: f32,
    /// 1 = fully fogged, 0 = clear
    pub fog_opacity: f32,
    /// Hops to the nearest explored floor, or [`Cell::UNEXPLORED`]
    pub distance: i32,
}

impl Cell {
    /// Distance sentinel: unset or beyond the visibility cap
    pub const UNEXPLORED: i32 = -1;

    /// Canonical cell outside the asteroid (and outside the grid)
    pub const VOID: Cell = Cell {
        wall: WallMaterial::Empty,
        floor: FloorMaterial::Empty,
        layer: Layer::None,
        stability: 1.0,
        fog_opacity: 1.0,
        distance: Cell::UNEXPLORED,
    };

    pub fn new(wall: WallMaterial, floor: FloorMaterial, layer: Layer) -> Self {
        Self {
            wall,
            floor,
            layer,
            ..Self::VOID
        }
    }

    /// Neither wall nor floor
    pub fn is_void(&self) -> bool {
        self.wall == WallMaterial::Empty && self.floor == FloorMaterial::Empty
    }

    /// Empty wall over a real floor: somewhere an entity can stand
    pub fn is_open_floor(&self) -> bool {
        self.wall == WallMaterial::Empty && self.floor != FloorMaterial::Empty
    }

    /// Material that can lose stability and eventually resolve
    pub fn is_fragile(&self) -> bool {
        self.wall == WallMaterial::ExplosiveRock
            || (self.wall == WallMaterial::Empty && self.floor.is_cracked())
    }

    /// Glyph for debug dumps: wall if present, otherwise floor
    pub fn glyph(&self) -> char {
        if self.wall != WallMaterial::Empty {
            self.wall.glyph()
        } else {
            self.floor.glyph()
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::VOID
    }
}
