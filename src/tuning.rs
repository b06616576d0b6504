//! Data-driven game balance
//!
//! Every gameplay number the controller uses comes from a `Tuning`. Defaults
//! match the shipped game; hosts may override them from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_OBSTACLES;
use crate::sim::Region;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    /// Playfield width in world units
    pub arena_width: f32,
    /// Playfield height in world units
    pub arena_height: f32,
    /// Where the player appears on session start
    pub player_spawn: Vec2,
    /// Enemy spawn area, kept clear of the player spawn
    pub enemy_region: Region,

    // === Bodies ===
    pub player_radius: f32,
    pub enemy_radius: f32,
    pub projectile_radius: f32,

    // === Movement ===
    /// Enemy pursuit speed (units/s)
    pub enemy_speed: f32,
    /// Projectile speed (units/s)
    pub projectile_speed: f32,
    /// Distance a projectile may travel before it expires
    pub projectile_max_travel: f32,

    // === Combat & progression ===
    /// Health lost per enemy contact
    pub contact_damage: u32,
    /// Obstacles to clear per level
    pub obstacles_per_level: u32,
    /// Enemies spawned at session start and on each level-up
    pub enemies_per_wave: u32,
    /// Spawn another wave when the last enemy dies with obstacles left.
    /// Off by default: a level then stalls once its enemies are gone.
    pub reinforce_when_clear: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: 1200.0,
            arena_height: 600.0,
            player_spawn: Vec2::new(100.0, 300.0),
            enemy_region: Region::new(Vec2::new(400.0, 100.0), Vec2::new(1100.0, 500.0)),

            // 50x50 sprites
            player_radius: 25.0,
            enemy_radius: 25.0,
            projectile_radius: 5.0,

            enemy_speed: 50.0,
            projectile_speed: 1000.0,
            projectile_max_travel: 1100.0,

            contact_damage: 20,
            obstacles_per_level: 7,
            enemies_per_wave: 5,
            reinforce_when_clear: false,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Read tuning from a JSON file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    /// Check that the values describe a playable game
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("player_radius", self.player_radius),
            ("enemy_radius", self.enemy_radius),
            ("projectile_radius", self.projectile_radius),
            ("enemy_speed", self.enemy_speed),
            ("projectile_speed", self.projectile_speed),
            ("projectile_max_travel", self.projectile_max_travel),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.enemy_region.is_valid() {
            return Err(TuningError::Invalid(format!(
                "enemy_region is empty: {:?}",
                self.enemy_region
            )));
        }
        if self.enemy_region.contains(self.player_spawn) {
            return Err(TuningError::Invalid(format!(
                "enemy_region {:?} overlaps player_spawn {}",
                self.enemy_region, self.player_spawn
            )));
        }
        if !(1..=MAX_OBSTACLES).contains(&self.obstacles_per_level) {
            return Err(TuningError::Invalid(format!(
                "obstacles_per_level must be in 1..={MAX_OBSTACLES}, got {}",
                self.obstacles_per_level
            )));
        }
        // Zero damage would make the session impossible to lose
        if self.contact_damage == 0 {
            return Err(TuningError::Invalid("contact_damage must be at least 1".into()));
        }
        if self.enemies_per_wave == 0 {
            return Err(TuningError::Invalid("enemies_per_wave must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether `pos` lies inside the arena rectangle
    #[inline]
    pub fn in_arena(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.arena_width && pos.y <= self.arena_height
    }
}
