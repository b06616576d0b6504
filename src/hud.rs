//! HUD view
//!
//! Everything the host needs to draw the status overlay, computed from the
//! world on demand. Drawing it is the host's job.

use serde::Serialize;

use crate::consts::MAX_LEVEL;
use crate::sim::{Outcome, SessionPhase, Weapon, World};

/// Health bar pixels per point of health
pub const HEALTH_BAR_SCALE: u32 = 2;

pub const CONTROLS_HINT: &str = "(Keys 1, 2, 3 to switch)";

/// Snapshot of the status overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub health: u32,
    pub health_bar_width: u32,
    pub level: u32,
    pub max_level: u32,
    pub obstacles: u32,
    pub weapon: Weapon,
    pub weapon_name: &'static str,
    pub weapon_range: &'static str,
    pub outcome: Option<Outcome>,
    /// Shown on the end screen
    pub end_message: Option<&'static str>,
    pub restart_available: bool,
}

impl HudView {
    pub fn from_world(world: &World) -> Self {
        let player = world.player();
        let progression = world.progression();
        let outcome = world.phase().outcome();
        Self {
            health: player.health,
            health_bar_width: player.health * HEALTH_BAR_SCALE,
            level: progression.level,
            max_level: MAX_LEVEL,
            obstacles: progression.obstacles,
            weapon: player.weapon,
            weapon_name: player.weapon.name(),
            weapon_range: player.weapon.range(),
            outcome,
            end_message: outcome.map(end_message),
            restart_available: matches!(world.phase(), SessionPhase::Ended(_)),
        }
    }

    /// e.g. "Level: 3 / 10 | Obstacles: 5"
    pub fn status_line(&self) -> String {
        format!(
            "Level: {} / {} | Obstacles: {}",
            self.level, self.max_level, self.obstacles
        )
    }

    pub fn weapon_text(&self) -> String {
        format!(
            "Weapon: {}\nRange: {}\n{}",
            self.weapon_name, self.weapon_range, CONTROLS_HINT
        )
    }
}

pub fn end_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "You Win! Congratulations!",
        Outcome::Loss => "Game Over",
    }
}
