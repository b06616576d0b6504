//! World state and core simulation types
//!
//! The authoritative store for one session: player, enemies, projectiles and
//! progression counters. Only consistency-preserving primitives live here;
//! the rules that decide when to call them live in `tick`.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::session::{Outcome, SessionPhase};
use crate::consts::MAX_HEALTH;
use crate::tuning::Tuning;

/// Entity identifier, unique within a session
pub type EntityId = u32;

/// Selectable weapon. Only the HUD label changes between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    LongRange,
    ShortRange,
    Melee,
}

impl Weapon {
    /// Map a number-key slot (1, 2, 3) to a weapon
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(Weapon::LongRange),
            2 => Some(Weapon::ShortRange),
            3 => Some(Weapon::Melee),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weapon::LongRange => "Sniper Rifle",
            Weapon::ShortRange => "Short-Range Gun",
            Weapon::Melee => "Bomb/Bayonet",
        }
    }

    /// Range description shown next to the weapon name
    pub fn range(&self) -> &'static str {
        match self {
            Weapon::LongRange => "0-1100m",
            Weapon::ShortRange => "25-50m",
            Weapon::Melee => "0-25m",
        }
    }
}

/// Axis-aligned rectangle, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Region {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// True when the region contains at least one point
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Uniformly sample a point inside the region
    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }
}

/// The player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// 0..=MAX_HEALTH, never negative
    pub health: u32,
    pub weapon: Weapon,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            health: MAX_HEALTH,
            weapon: Weapon::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// A pursuing enemy; every enemy clears one obstacle when removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
}

/// A player shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub origin: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Distance covered since firing
    pub traveled: f32,
}

/// Level and obstacle counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    /// 1..=MAX_LEVEL
    pub level: u32,
    /// Obstacles left to clear on this level
    pub obstacles: u32,
}

/// Gameplay events for the host (audio, effects, HUD refresh)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ProjectileFired { projectile: EntityId },
    ProjectileExpired { projectile: EntityId },
    EnemyKilled { enemy: EntityId, projectile: EntityId },
    PlayerHit { enemy: EntityId, health: u32 },
    WeaponChanged(Weapon),
    Reinforcements { count: u32 },
    LevelUp { level: u32 },
    SessionEnded(Outcome),
}

/// Complete world state for one session (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct World {
    /// Seed this session was started with
    seed: u64,
    pub(crate) phase: SessionPhase,
    pub(crate) player: Player,
    /// Live enemies (sorted by id for determinism)
    pub(crate) enemies: Vec<Enemy>,
    /// Live projectiles (sorted by id for determinism)
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) progression: Progression,
    /// Ticks simulated while active
    pub(crate) time_ticks: u64,
    rng: Pcg32,
    next_id: EntityId,
}

impl World {
    /// Fresh world: player at the spawn point, full health, level 1 and a
    /// first wave of enemies in the enemy region
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        let mut world = Self {
            seed,
            phase: SessionPhase::Active,
            player: Player::new(tuning.player_spawn),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            progression: Progression {
                level: 1,
                obstacles: tuning.obstacles_per_level,
            },
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        world.spawn_enemies(tuning.enemies_per_wave, &tuning.enemy_region);

        world
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn progression(&self) -> Progression {
        self.progression
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Draw a seed for the session that follows this one
    pub(crate) fn next_session_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Add `count` enemies at uniformly random points in `region`.
    /// Returns the new ids; an empty region spawns nothing.
    pub fn spawn_enemies(&mut self, count: u32, region: &Region) -> Vec<EntityId> {
        if !region.is_valid() {
            log::warn!("Not spawning {count} enemies into empty region {region:?}");
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.next_entity_id();
            let pos = region.sample(&mut self.rng);
            self.enemies.push(Enemy { id, pos });
            ids.push(id);
        }
        ids
    }

    /// Remove an enemy. Absent ids are a no-op and return `None`.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    /// Subtract `amount` from player health, clamped at zero.
    /// Returns the resulting health.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        self.player.health = self.player.health.saturating_sub(amount);
        self.player.health
    }

    /// Clear one obstacle, clamped at zero. Returns true only when this call
    /// took the count from 1 to 0.
    pub fn decrement_obstacles(&mut self) -> bool {
        if self.progression.obstacles == 0 {
            return false;
        }
        self.progression.obstacles -= 1;
        self.progression.obstacles == 0
    }

    pub(crate) fn spawn_projectile(&mut self, origin: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            origin,
            pos: origin,
            vel,
            traveled: 0.0,
        });
        id
    }

    pub(crate) fn remove_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        let idx = self.projectiles.iter().position(|p| p.id == id)?;
        Some(self.projectiles.remove(idx))
    }

    /// Move to a terminal phase. Only valid while active.
    pub(crate) fn end(&mut self, outcome: Outcome) -> bool {
        self.phase.end(outcome)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
