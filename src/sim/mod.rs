//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod session;
pub mod state;
pub mod tick;

pub use collision::{CircleOverlap, ExternalOverlap, OverlapQuery, circles_overlap};
pub use session::{InputEvent, Outcome, Session, SessionPhase};
pub use state::{
    Enemy, EntityId, GameEvent, Player, Progression, Projectile, Region, Weapon, World,
};
pub use tick::Controller;
