//! Combat and progression controller
//!
//! Turns frame ticks and discrete host events into world mutations. Every
//! entry point checks the session phase first; an ended session ignores
//! everything.

use glam::Vec2;

use super::collision::OverlapQuery;
use super::session::Outcome;
use super::state::{EntityId, GameEvent, Weapon, World};
use crate::consts::MAX_LEVEL;
use crate::tuning::Tuning;
use crate::{aim_direction, step_toward};

/// Rules layer for one session
#[derive(Debug, Clone)]
pub struct Controller<Q> {
    tuning: Tuning,
    overlap: Q,
    /// Events recorded since the last drain
    events: Vec<GameEvent>,
}

impl<Q: OverlapQuery> Controller<Q> {
    /// `tuning` must pass [`Tuning::validate`]; `Session::start` checks it
    pub fn new(tuning: Tuning, overlap: Q) -> Self {
        debug_assert!(tuning.validate().is_ok(), "invalid tuning: {tuning:?}");
        Self {
            tuning,
            overlap,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn overlap(&self) -> &Q {
        &self.overlap
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the world by one frame.
    ///
    /// Movement for every entity is applied first; overlaps are queried and
    /// resolved afterwards, projectile hits before player contacts.
    pub fn on_tick(&mut self, world: &mut World, dt: f32) {
        if !world.is_active() {
            return;
        }

        world.time_ticks += 1;

        // Movement phase
        let target = world.player.pos;
        let step = self.tuning.enemy_speed * dt;
        for enemy in &mut world.enemies {
            enemy.pos = step_toward(enemy.pos, target, step);
        }
        for projectile in &mut world.projectiles {
            let delta = projectile.vel * dt;
            projectile.pos += delta;
            projectile.traveled += delta.length();
        }

        // Expire shots that left the arena or flew past their range
        let expired: Vec<EntityId> = world
            .projectiles
            .iter()
            .filter(|p| {
                !self.tuning.in_arena(p.pos) || p.traveled > self.tuning.projectile_max_travel
            })
            .map(|p| p.id)
            .collect();
        for id in expired {
            world.remove_projectile(id);
            log::debug!("Projectile {id} expired");
            self.events.push(GameEvent::ProjectileExpired { projectile: id });
        }

        // Resolution phase: query against post-movement positions, then apply
        let hits: Vec<(EntityId, EntityId)> = world
            .projectiles
            .iter()
            .filter_map(|p| {
                self.overlap
                    .projectile_hit(p, &world.enemies)
                    .map(|enemy| (p.id, enemy))
            })
            .collect();
        let contacts = self.overlap.player_contacts(&world.player, &world.enemies);

        // A hit may already have removed an enemy that also touched the
        // player; the later resolution is then a no-op.
        for (projectile, enemy) in hits {
            self.on_projectile_hit(world, projectile, enemy);
        }
        for enemy in contacts {
            self.on_contact(world, enemy);
        }

        // Ensure deterministic ordering
        world.normalize_order();
    }

    /// Fire from the player toward `target`. Returns the new projectile id.
    pub fn on_fire(&mut self, world: &mut World, target: Vec2) -> Option<EntityId> {
        if !world.is_active() {
            return None;
        }

        // Weapon choice is cosmetic; every shot is the same projectile
        let origin = world.player.pos;
        let vel = aim_direction(origin, target) * self.tuning.projectile_speed;
        let id = world.spawn_projectile(origin, vel);
        self.events.push(GameEvent::ProjectileFired { projectile: id });
        Some(id)
    }

    pub fn on_weapon_select(&mut self, world: &mut World, weapon: Weapon) -> bool {
        if !world.is_active() {
            return false;
        }
        world.player.weapon = weapon;
        self.events.push(GameEvent::WeaponChanged(weapon));
        true
    }

    /// Resolve a projectile overlapping an enemy: both are destroyed and one
    /// obstacle is cleared. Returns false if either is already gone.
    pub fn on_projectile_hit(
        &mut self,
        world: &mut World,
        projectile: EntityId,
        enemy: EntityId,
    ) -> bool {
        if !world.is_active() {
            return false;
        }
        if world.projectile(projectile).is_none() || world.remove_enemy(enemy).is_none() {
            return false;
        }
        world.remove_projectile(projectile);

        log::debug!("Enemy {enemy} killed by projectile {projectile}");
        self.events.push(GameEvent::EnemyKilled { enemy, projectile });

        self.clear_obstacle(world);
        true
    }

    /// Resolve the player touching an enemy: damage, destroy the enemy and
    /// clear one obstacle. Level-up is checked before death, so a lethal
    /// contact that also clears the level still advances it before the loss.
    ///
    /// On the final level that order decides the outcome: a lethal contact
    /// that clears level `MAX_LEVEL` ends the session in [`Outcome::Win`],
    /// since the win is recorded first and a session ends only once.
    pub fn on_contact(&mut self, world: &mut World, enemy: EntityId) -> bool {
        if !world.is_active() {
            return false;
        }
        if world.remove_enemy(enemy).is_none() {
            return false;
        }

        let health = world.apply_damage(self.tuning.contact_damage);
        log::debug!("Player hit by enemy {enemy}, health {health}");
        self.events.push(GameEvent::PlayerHit { enemy, health });

        self.clear_obstacle(world);
        if world.player.is_dead() {
            self.finish(world, Outcome::Loss);
        }
        true
    }

    /// Count one obstacle as cleared; the call that reaches zero levels up
    fn clear_obstacle(&mut self, world: &mut World) {
        if world.decrement_obstacles() {
            self.level_up(world);
        } else if self.tuning.reinforce_when_clear && world.enemies.is_empty() {
            let count = self.tuning.enemies_per_wave;
            world.spawn_enemies(count, &self.tuning.enemy_region);
            log::debug!(
                "Reinforcements: {count} enemies, {} obstacles left",
                world.progression.obstacles
            );
            self.events.push(GameEvent::Reinforcements { count });
        }
    }

    /// Advance to the next level, or win if the last level was just cleared
    fn level_up(&mut self, world: &mut World) {
        if world.progression.level >= MAX_LEVEL {
            self.finish(world, Outcome::Win);
            return;
        }

        world.progression.level += 1;
        world.progression.obstacles = self.tuning.obstacles_per_level;
        world.spawn_enemies(self.tuning.enemies_per_wave, &self.tuning.enemy_region);

        let level = world.progression.level;
        log::info!("Level {level} / {MAX_LEVEL}");
        self.events.push(GameEvent::LevelUp { level });
    }

    /// Enter a terminal phase. Returns false if the session had already ended.
    pub fn finish(&mut self, world: &mut World, outcome: Outcome) -> bool {
        if !world.end(outcome) {
            return false;
        }
        log::info!(
            "Session ended: {:?} at level {} (health {})",
            outcome,
            world.progression.level,
            world.player.health
        );
        self.events.push(GameEvent::SessionEnded(outcome));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::collision::{CircleOverlap, ExternalOverlap};
    use crate::sim::session::SessionPhase;

    fn setup() -> (World, Controller<ExternalOverlap>) {
        let tuning = Tuning::default();
        (World::new(&tuning, 42), Controller::new(tuning, ExternalOverlap))
    }

    fn first_enemy(world: &World) -> EntityId {
        world.enemies()[0].id
    }

    #[test]
    fn test_enemies_pursue_player() {
        let (mut world, mut ctl) = setup();
        let player = world.player().pos;
        let before: Vec<f32> = world.enemies().iter().map(|e| e.pos.distance(player)).collect();

        ctl.on_tick(&mut world, SIM_DT);

        let step = ctl.tuning().enemy_speed * SIM_DT;
        for (enemy, d0) in world.enemies().iter().zip(before) {
            let d1 = enemy.pos.distance(player);
            assert!((d0 - d1 - step).abs() < 1e-3, "moved {} expected {}", d0 - d1, step);
        }
        assert_eq!(world.time_ticks(), 1);
    }

    #[test]
    fn test_fire_aims_at_target() {
        let (mut world, mut ctl) = setup();
        let origin = world.player().pos;
        let id = ctl.on_fire(&mut world, origin + Vec2::new(0.0, 10.0)).unwrap();
        let shot = world.projectile(id).unwrap();
        assert_eq!(shot.pos, origin);
        assert!(shot.vel.x.abs() < 1e-3);
        assert!((shot.vel.y - ctl.tuning().projectile_speed).abs() < 1e-3);
        assert_eq!(ctl.drain_events(), vec![GameEvent::ProjectileFired { projectile: id }]);
    }

    #[test]
    fn test_weapon_does_not_change_shot() {
        let (mut world, mut ctl) = setup();
        let target = Vec2::new(700.0, 120.0);
        let a = ctl.on_fire(&mut world, target).unwrap();
        ctl.on_weapon_select(&mut world, Weapon::Melee);
        let b = ctl.on_fire(&mut world, target).unwrap();
        assert_eq!(world.projectile(a).unwrap().vel, world.projectile(b).unwrap().vel);
    }

    #[test]
    fn test_projectile_expires_out_of_bounds() {
        let (mut world, mut ctl) = setup();
        let id = ctl.on_fire(&mut world, Vec2::new(-100.0, 300.0)).unwrap();
        // 1000 units/s leftward from x=100 leaves the arena within 7 frames
        for _ in 0..7 {
            ctl.on_tick(&mut world, SIM_DT);
        }
        assert!(world.projectile(id).is_none());
        assert!(
            ctl.drain_events()
                .contains(&GameEvent::ProjectileExpired { projectile: id })
        );
    }

    #[test]
    fn test_projectile_hit_clears_obstacle() {
        let (mut world, mut ctl) = setup();
        let enemy = first_enemy(&world);
        let shot = ctl.on_fire(&mut world, Vec2::new(600.0, 300.0)).unwrap();

        assert!(ctl.on_projectile_hit(&mut world, shot, enemy));
        assert!(world.enemy(enemy).is_none());
        assert!(world.projectile(shot).is_none());
        assert_eq!(world.progression().obstacles, 6);

        // Second resolution of the same pair is a no-op
        assert!(!ctl.on_projectile_hit(&mut world, shot, enemy));
        assert_eq!(world.progression().obstacles, 6);
    }

    #[test]
    fn test_hit_on_dead_enemy_keeps_projectile() {
        let (mut world, mut ctl) = setup();
        let enemy = first_enemy(&world);
        let shot = ctl.on_fire(&mut world, Vec2::new(600.0, 300.0)).unwrap();
        assert!(ctl.on_contact(&mut world, enemy));
        assert!(!ctl.on_projectile_hit(&mut world, shot, enemy));
        assert!(world.projectile(shot).is_some());
        assert_eq!(world.progression().obstacles, 6);
    }

    #[test]
    fn test_contact_damages_and_clears() {
        let (mut world, mut ctl) = setup();
        let enemy = first_enemy(&world);
        assert!(ctl.on_contact(&mut world, enemy));
        assert_eq!(world.player().health, 80);
        assert_eq!(world.enemies().len(), 4);
        assert_eq!(world.progression().obstacles, 6);
        assert!(!ctl.on_contact(&mut world, enemy));
        assert_eq!(world.player().health, 80);
    }

    #[test]
    fn test_lethal_contact_levels_up_before_loss() {
        let (mut world, mut ctl) = setup();
        world.player.health = 20;
        world.progression.obstacles = 1;
        let enemy = first_enemy(&world);

        assert!(ctl.on_contact(&mut world, enemy));
        assert_eq!(world.progression().level, 2);
        assert_eq!(world.progression().obstacles, 7);
        assert_eq!(world.phase(), SessionPhase::Ended(Outcome::Loss));
        let events = ctl.drain_events();
        let level_up = events.iter().position(|e| *e == GameEvent::LevelUp { level: 2 });
        let ended = events
            .iter()
            .position(|e| *e == GameEvent::SessionEnded(Outcome::Loss));
        assert!(level_up.unwrap() < ended.unwrap());
    }

    #[test]
    fn test_lethal_contact_on_final_level_wins() {
        let (mut world, mut ctl) = setup();
        world.player.health = 20;
        world.progression.level = MAX_LEVEL;
        world.progression.obstacles = 1;
        let enemy = first_enemy(&world);

        ctl.on_contact(&mut world, enemy);
        assert_eq!(world.phase(), SessionPhase::Ended(Outcome::Win));
        assert_eq!(world.progression().level, MAX_LEVEL);
        assert_eq!(world.player().health, 0);
        assert!(
            !ctl.drain_events()
                .contains(&GameEvent::SessionEnded(Outcome::Loss))
        );
    }

    #[test]
    fn test_ended_world_ignores_everything() {
        let (mut world, mut ctl) = setup();
        ctl.finish(&mut world, Outcome::Loss);
        ctl.drain_events();
        let snapshot = (world.enemies().to_vec(), world.player().clone());

        ctl.on_tick(&mut world, SIM_DT);
        assert!(ctl.on_fire(&mut world, Vec2::ZERO).is_none());
        assert!(!ctl.on_weapon_select(&mut world, Weapon::ShortRange));
        assert!(!ctl.on_contact(&mut world, snapshot.0[0].id));

        assert_eq!(world.enemies(), snapshot.0.as_slice());
        assert_eq!(world.player(), &snapshot.1);
        assert_eq!(world.time_ticks(), 0);
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn test_level_stalls_without_reinforcements() {
        let (mut world, mut ctl) = setup();
        let ids: Vec<_> = world.enemies().iter().map(|e| e.id).collect();
        for id in ids {
            let shot = ctl.on_fire(&mut world, Vec2::ZERO).unwrap();
            ctl.on_projectile_hit(&mut world, shot, id);
        }
        assert!(world.enemies().is_empty());
        assert_eq!(
            world.progression(),
            crate::sim::Progression {
                level: 1,
                obstacles: 2
            }
        );
    }

    #[test]
    fn test_reinforcements_when_enabled() {
        let tuning = Tuning {
            reinforce_when_clear: true,
            ..Tuning::default()
        };
        let mut world = World::new(&tuning, 42);
        let mut ctl = Controller::new(tuning, ExternalOverlap);

        let ids: Vec<_> = world.enemies().iter().map(|e| e.id).collect();
        for id in ids {
            ctl.on_contact(&mut world, id);
        }
        assert_eq!(world.enemies().len(), 5);
        assert_eq!(world.progression().obstacles, 2);
        assert!(
            ctl.drain_events()
                .contains(&GameEvent::Reinforcements { count: 5 })
        );
        // Five contacts at 20 damage each
        assert_eq!(world.phase(), SessionPhase::Ended(Outcome::Loss));
    }

    #[test]
    fn test_tick_resolves_overlaps() {
        let tuning = Tuning::default();
        let mut world = World::new(&tuning, 42);
        let mut ctl = Controller::new(tuning.clone(), CircleOverlap::from_tuning(&tuning));

        // One enemy sitting on the player, one in a shot's path
        let player = world.player().pos;
        world.enemies[0].pos = player + Vec2::new(10.0, 0.0);
        world.enemies[1].pos = Vec2::new(400.0, 300.0);
        for enemy in &mut world.enemies[2..] {
            enemy.pos = Vec2::new(1100.0, 550.0);
        }
        let touching = world.enemies[0].id;
        let target = world.enemies[1].id;
        let shot = ctl.on_fire(&mut world, Vec2::new(400.0, 300.0)).unwrap();

        // 300 units at 1000 u/s: overlap within 18 frames, before the rest arrive
        for _ in 0..18 {
            ctl.on_tick(&mut world, SIM_DT);
        }

        assert!(world.enemy(touching).is_none());
        assert!(world.enemy(target).is_none());
        assert!(world.projectile(shot).is_none());
        assert_eq!(world.player().health, 80);
        assert_eq!(world.progression().obstacles, 5);
    }
}
