//! Twin Guardians - A top-down arena boss-fight game
//!
//! Core modules:
//! - `sim`: Deterministic combat simulation (avatar, hostiles, boss, waves, perks)
//! - `settings`: Run configuration and difficulty presets

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (origin bottom-left, y up)
    pub const ARENA_WIDTH: f32 = 900.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Gap kept between bodies and the arena edge
    pub const ARENA_MARGIN: f32 = 10.0;

    /// Avatar defaults
    pub const AVATAR_RADIUS: f32 = 20.0;
    pub const AVATAR_MAX_HP: f32 = 8.0;
    pub const AVATAR_SPEED: f32 = 240.0;
    /// Diagonal input scale (1/sqrt(2))
    pub const DIAGONAL_SCALE: f32 = 0.7071;
    pub const FIRE_COOLDOWN: f32 = 0.35;
    pub const MELEE_COOLDOWN: f32 = 0.6;
    pub const MELEE_RANGE: f32 = 36.0;
    pub const MELEE_DAMAGE: f32 = 2.0;
    pub const SHOT_DAMAGE: f32 = 3.0;
    pub const CRIT_CHANCE: f32 = 0.05;
    pub const CRIT_MULTIPLIER: f32 = 2.0;

    /// Dash
    pub const DASH_COOLDOWN: f32 = 1.0;
    pub const DASH_DURATION: f32 = 0.18;
    /// Invulnerability granted by a dash (never shorter than the dash itself)
    pub const DASH_INVULN: f32 = 0.3;
    pub const DASH_SPEED: f32 = 720.0;
    /// Instant displacement along the aim vector when a dash starts
    pub const DASH_IMPULSE: f32 = 30.0;

    /// Spread shot
    pub const SPREAD_PELLETS: u32 = 3;
    pub const SPREAD_HALF_ANGLE: f32 = 0.26; // ~15 degrees
    /// Damage multiplier applied to spread pellets
    pub const PELLET_NERF: f32 = 0.6;

    /// Post-hit grace window for contact damage
    pub const CONTACT_GRACE: f32 = 0.6;
    pub const CONTACT_DAMAGE: f32 = 1.0;
    pub const KNOCKBACK_DISTANCE: f32 = 24.0;

    /// Combo multiplier
    pub const COMBO_MAX: u32 = 5;
    pub const COMBO_WINDOW: f32 = 2.0;

    /// Magnet / regen defaults
    pub const MAGNET_RADIUS: f32 = 60.0;
    pub const REGEN_INTERVAL: f32 = 6.0;

    /// Projectiles
    pub const AVATAR_SHOT_SPEED: f32 = 540.0;
    pub const AVATAR_SHOT_RADIUS: f32 = 3.0;
    pub const HOSTILE_SHOT_RADIUS: f32 = 5.0;
    pub const HOSTILE_SHOT_DAMAGE: f32 = 1.0;

    /// Status effects
    pub const SLOW_DURATION: f32 = 1.5;
    pub const SLOW_FACTOR: f32 = 0.5;
    pub const BURN_DURATION: f32 = 2.0;
    pub const BURN_TICK: f32 = 0.5;
    pub const BURN_DAMAGE: f32 = 1.0;

    /// Scoring
    pub const SCORE_HOSTILE_KILL: u64 = 12;
    pub const SCORE_BOSS_HIT: u64 = 10;
    pub const SCORE_BOSS_MELEE: u64 = 5;
    pub const SCORE_BOSS_KILL: u64 = 200;

    /// Drops
    pub const ORB_DROP_CHANCE: f64 = 0.9;
    pub const PICKUP_DROP_CHANCE: f64 = 0.12;
    pub const ORB_XP: u32 = 1;

    /// Waves
    pub const WAVES_PER_ENCOUNTER: u32 = 4;
    pub const WAVE_DELAY: f32 = 1.2;
    pub const WAVE_CLEAR_ORBS: u32 = 6;
    pub const ELITE_CHANCE: f64 = 0.15;

    /// Encounter intro freeze
    pub const INTRO_FREEZE: f32 = 0.6;
}

/// Normalize a direction, falling back to straight up for zero-length input
#[inline]
pub fn direction_or_up(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > f32::EPSILON { v / len } else { Vec2::Y }
}

/// Clamp a circle's center so the whole body stays inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32) -> Vec2 {
    use consts::{ARENA_HEIGHT, ARENA_MARGIN, ARENA_WIDTH};
    let min = Vec2::splat(ARENA_MARGIN + radius);
    let max = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) - min;
    pos.clamp(min, max)
}

/// Circle/circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
