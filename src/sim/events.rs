//! Outbound notifications
//!
//! The simulation never calls collaborators directly. It queues events that
//! the host drains once per frame (explosion visuals/damage, fog fade
//! animation, audio). Nothing the host does with them feeds back into the core.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::cell::WallMaterial;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Spawn an explosion visual / damage area
    Explosion { pos: IVec2, radius: f32 },
    /// Fog over this cell should animate toward transparent
    FogFade { pos: IVec2 },
    /// A wall was removed (drilled, blasted)
    WallCleared { pos: IVec2, material: WallMaterial },
    /// A floor turned to lava
    FloorCollapsed { pos: IVec2 },
    /// A fragile cell crossed the critical threshold
    CellCritical { pos: IVec2 },
}

impl SimEvent {
    /// Grid position the event refers to
    pub fn pos(&self) -> IVec2 {
        match *self {
            SimEvent::Explosion { pos, .. }
            | SimEvent::FogFade { pos }
            | SimEvent::WallCleared { pos, .. }
            | SimEvent::FloorCollapsed { pos }
            | SimEvent::CellCritical { pos } => pos,
        }
    }
}
