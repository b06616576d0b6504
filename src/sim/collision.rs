//! Overlap detection
//!
//! The controller never owns physics bodies. It asks an `OverlapQuery` which
//! entities touch after movement, then resolves the answers itself. Hosts
//! with their own physics can plug in `ExternalOverlap` and deliver
//! contacts and hits as events instead.

use glam::Vec2;

use super::state::{Enemy, EntityId, Player, Projectile};
use crate::tuning::Tuning;

/// Physics capability consulted once per tick, after movement
pub trait OverlapQuery {
    /// First enemy (in slice order) overlapping the projectile, if any
    fn projectile_hit(&self, projectile: &Projectile, enemies: &[Enemy]) -> Option<EntityId>;

    /// Every enemy touching the player, in slice order
    fn player_contacts(&self, player: &Player, enemies: &[Enemy]) -> Vec<EntityId>;
}

/// Check whether two circles overlap (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}

/// Round bodies with fixed radii
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleOverlap {
    pub player_radius: f32,
    pub enemy_radius: f32,
    pub projectile_radius: f32,
}

impl CircleOverlap {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            player_radius: tuning.player_radius,
            enemy_radius: tuning.enemy_radius,
            projectile_radius: tuning.projectile_radius,
        }
    }
}

impl OverlapQuery for CircleOverlap {
    fn projectile_hit(&self, projectile: &Projectile, enemies: &[Enemy]) -> Option<EntityId> {
        enemies
            .iter()
            .find(|e| {
                circles_overlap(
                    projectile.pos,
                    self.projectile_radius,
                    e.pos,
                    self.enemy_radius,
                )
            })
            .map(|e| e.id)
    }

    fn player_contacts(&self, player: &Player, enemies: &[Enemy]) -> Vec<EntityId> {
        enemies
            .iter()
            .filter(|e| circles_overlap(player.pos, self.player_radius, e.pos, self.enemy_radius))
            .map(|e| e.id)
            .collect()
    }
}

/// Reports nothing; overlaps arrive from the host as events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalOverlap;

impl OverlapQuery for ExternalOverlap {
    fn projectile_hit(&self, _projectile: &Projectile, _enemies: &[Enemy]) -> Option<EntityId> {
        None
    }

    fn player_contacts(&self, _player: &Player, _enemies: &[Enemy]) -> Vec<EntityId> {
        Vec::new()
    }
}
