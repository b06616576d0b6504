//! Wave Shooter - A single-screen arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world state, combat, session lifecycle)
//! - `tuning`: Data-driven game balance
//! - `hud`: Read-only status view for the hosting frontend

pub mod hud;
pub mod sim;
pub mod tuning;

pub use hud::HudView;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Highest playable level; clearing it wins the session
    pub const MAX_LEVEL: u32 = 10;
    /// Player health at session start
    pub const MAX_HEALTH: u32 = 100;
    /// Upper bound on obstacles per level
    pub const MAX_OBSTACLES: u32 = 7;
}

/// Step `pos` toward `target` by at most `max_step` units, never overshooting
#[inline]
pub fn step_toward(pos: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        target
    } else {
        pos + delta / dist * max_step
    }
}

/// Unit direction from `from` toward `to`, falling back to +x when they coincide
#[inline]
pub fn aim_direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or(Vec2::X)
}
