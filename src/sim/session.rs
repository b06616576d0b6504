//! Session lifecycle
//!
//! A session runs from `start` until it ends in a win or a loss. An ended
//! session ignores every tick and event until it is restarted, which builds
//! a brand-new world and controller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CircleOverlap, OverlapQuery};
use super::state::{EntityId, GameEvent, Weapon, World};
use super::tick::Controller;
use crate::hud::HudView;
use crate::tuning::{Tuning, TuningError};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ticks and events are processed
    Active,
    /// Terminal; only restart does anything
    Ended(Outcome),
}

impl SessionPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Active)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            SessionPhase::Active => None,
            SessionPhase::Ended(outcome) => Some(*outcome),
        }
    }

    /// Active -> Ended(outcome). Returns false (and changes nothing) if
    /// already ended.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        match self {
            SessionPhase::Active => {
                *self = SessionPhase::Ended(outcome);
                true
            }
            SessionPhase::Ended(_) => false,
        }
    }
}

/// A discrete input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer press at a world position
    Fire { target: Vec2 },
    /// Number key 1/2/3
    SelectWeapon(Weapon),
    /// Physics reported the player touching an enemy
    Contact { enemy: EntityId },
    /// Physics reported a projectile overlapping an enemy
    ProjectileHit { projectile: EntityId, enemy: EntityId },
}

/// One play-through: a world plus the controller that drives it
pub struct Session<Q: OverlapQuery + Clone = CircleOverlap> {
    world: World,
    controller: Controller<Q>,
    /// Sessions started so far, including this one
    runs: u32,
}

impl Session<CircleOverlap> {
    /// Start a session using circle overlap tests sized from `tuning`
    pub fn start(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        let overlap = CircleOverlap::from_tuning(&tuning);
        Self::with_overlap(tuning, seed, overlap)
    }
}

impl<Q: OverlapQuery + Clone> Session<Q> {
    /// Start a session with a caller-supplied overlap query.
    /// Fails if `tuning` does not pass [`Tuning::validate`].
    pub fn with_overlap(tuning: Tuning, seed: u64, overlap: Q) -> Result<Self, TuningError> {
        tuning.validate()?;
        log::info!("Session starting (seed {seed})");
        Ok(Self {
            world: World::new(&tuning, seed),
            controller: Controller::new(tuning, overlap),
            runs: 1,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        self.controller.tuning()
    }

    pub fn phase(&self) -> SessionPhase {
        self.world.phase()
    }

    pub fn is_active(&self) -> bool {
        self.world.is_active()
    }

    /// Number of sessions started, counting restarts
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// End the session. No-op once ended.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        self.controller.finish(&mut self.world, outcome)
    }

    /// Replace the ended session with a fresh one. Ignored while active.
    pub fn restart(&mut self) -> bool {
        if self.world.is_active() {
            log::debug!("Restart ignored: session still active");
            return false;
        }

        let seed = self.world.next_session_seed();
        let tuning = self.controller.tuning().clone();
        let overlap = self.controller.overlap().clone();
        log::info!("Session restarting (run {}, seed {seed})", self.runs + 1);

        self.world = World::new(&tuning, seed);
        self.controller = Controller::new(tuning, overlap);
        self.runs += 1;
        true
    }

    /// Advance one frame
    pub fn on_tick(&mut self, dt: f32) {
        self.controller.on_tick(&mut self.world, dt);
    }

    pub fn on_fire(&mut self, target: Vec2) -> Option<EntityId> {
        self.controller.on_fire(&mut self.world, target)
    }

    pub fn on_weapon_select(&mut self, weapon: Weapon) -> bool {
        self.controller.on_weapon_select(&mut self.world, weapon)
    }

    pub fn on_contact(&mut self, enemy: EntityId) -> bool {
        self.controller.on_contact(&mut self.world, enemy)
    }

    pub fn on_projectile_hit(&mut self, projectile: EntityId, enemy: EntityId) -> bool {
        self.controller.on_projectile_hit(&mut self.world, projectile, enemy)
    }

    /// Dispatch a host input. Returns whether it changed anything.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Fire { target } => self.on_fire(target).is_some(),
            InputEvent::SelectWeapon(weapon) => self.on_weapon_select(weapon),
            InputEvent::Contact { enemy } => self.on_contact(enemy),
            InputEvent::ProjectileHit { projectile, enemy } => {
                self.on_projectile_hit(projectile, enemy)
            }
        }
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.controller.drain_events()
    }

    pub fn hud(&self) -> HudView {
        HudView::from_world(&self.world)
    }
}
