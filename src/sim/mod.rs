//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod avatar;
pub mod boss;
pub mod collision;
pub mod director;
pub mod hostile;
pub mod pickup;
pub mod progression;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod status;
pub mod telegraph;
pub mod tick;
pub mod timer;

pub use avatar::{Avatar, AvatarStats, HitOutcome};
pub use boss::{AttackPattern, Boss, BossPhase};
pub use collision::resolve_collisions;
pub use director::{DirectorAction, WaveDirector, WavePlan};
pub use hostile::{Hostile, HostileKind};
pub use pickup::{Pickup, PickupKind};
pub use progression::{PERK_POOL, Perk, xp_to_next};
pub use projectile::{Owner, Projectile};
pub use snapshot::Snapshot;
pub use state::{Carryover, GameEvent, GamePhase, GameState};
pub use status::{OnHitStatus, StatusEffects};
pub use telegraph::{Telegraph, TelegraphKind, TelegraphSource};
pub use tick::{TickInput, tick};
pub use timer::Cooldown;
