//! Headless native driver
//!
//! Plays a session with a simple autopilot on a fixed-timestep loop, the way
//! a rendering host would drive it, and prints the final HUD as JSON.
//!
//! Usage: `wave-shooter [tuning.json]`, seed from `WAVE_SHOOTER_SEED`.

use std::path::Path;

use wave_shooter::Tuning;
use wave_shooter::consts::{MAX_SUBSTEPS, SIM_DT};
use wave_shooter::sim::{GameEvent, InputEvent, Outcome, Session, Weapon};

/// Host frame length (a 30 FPS display runs two sim steps per frame)
const FRAME_DT: f32 = 1.0 / 30.0;
/// Give up after ten simulated minutes
const MAX_FRAMES: u32 = 30 * 60 * 10;
/// Sim steps between autopilot shots
const FIRE_COOLDOWN_TICKS: u32 = 9;
/// Restarts allowed after a loss
const MAX_RESTARTS: u32 = 1;

const DEFAULT_SEED: u64 = 0x5EED;

struct Game {
    session: Session,
    accumulator: f32,
    fire_cooldown: u32,
    restarts: u32,
    kills: u32,
}

impl Game {
    fn new(session: Session) -> Self {
        Self {
            session,
            accumulator: 0.0,
            fire_cooldown: 0,
            restarts: 0,
            kills: 0,
        }
    }

    /// Run simulation ticks for one host frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.autopilot();
            self.session.on_tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.process_events();
    }

    /// Aim at the nearest enemy, pick a weapon label for the distance, fire
    fn autopilot(&mut self) {
        if !self.session.is_active() {
            return;
        }
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);

        let player = self.session.world().player().pos;
        let Some(target) = self
            .session
            .world()
            .enemies()
            .iter()
            .map(|e| e.pos)
            .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))
        else {
            return;
        };

        let weapon = weapon_for_distance(target.distance(player));
        if weapon != self.session.world().player().weapon {
            self.session.handle(InputEvent::SelectWeapon(weapon));
        }

        if self.fire_cooldown == 0 {
            self.session.handle(InputEvent::Fire { target });
            self.fire_cooldown = FIRE_COOLDOWN_TICKS;
        }
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::EnemyKilled { .. } => self.kills += 1,
                GameEvent::PlayerHit { health, .. } => {
                    log::info!("Ouch! health {health}");
                }
                GameEvent::LevelUp { .. } => {
                    log::info!("{}", self.session.hud().status_line());
                }
                GameEvent::SessionEnded(outcome) => {
                    let hud = self.session.hud();
                    log::info!(
                        "{} ({:?}, {} kills)",
                        hud.end_message.unwrap_or_default(),
                        outcome,
                        self.kills
                    );
                }
                _ => {}
            }
        }
    }

    /// Restart after a loss while restarts remain. Returns true if playing on.
    fn maybe_restart(&mut self) -> bool {
        if self.session.is_active() {
            return true;
        }
        let lost = self.session.phase().outcome() == Some(Outcome::Loss);
        if lost && self.restarts < MAX_RESTARTS && self.session.restart() {
            self.restarts += 1;
            self.accumulator = 0.0;
            self.fire_cooldown = 0;
            return true;
        }
        false
    }
}

/// Cosmetic only: every weapon fires the same shot
fn weapon_for_distance(distance: f32) -> Weapon {
    if distance > 50.0 {
        Weapon::LongRange
    } else if distance > 25.0 {
        Weapon::ShortRange
    } else {
        Weapon::Melee
    }
}

fn main() {
    env_logger::init();
    log::info!("Wave Shooter (headless) starting...");

    let mut tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load_or_default(Path::new(&path)),
        None => Tuning::default(),
    };
    // The autopilot needs enemies to keep coming to finish a level
    tuning.reinforce_when_clear = true;

    let seed = std::env::var("WAVE_SHOOTER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    // A file that failed validation already fell back to defaults
    let session = match Session::start(tuning, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut game = Game::new(session);
    let mut frames = 0;
    while frames < MAX_FRAMES && game.maybe_restart() {
        game.update(FRAME_DT);
        frames += 1;
    }

    let hud = game.session.hud();
    log::info!(
        "Finished after {frames} frames, {} run(s): {}",
        game.session.runs(),
        hud.status_line()
    );
    match serde_json::to_string_pretty(&hud) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize HUD: {e}"),
    }
}
