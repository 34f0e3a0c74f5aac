//! Hostile entities and their per-tick steering
//!
//! Each variant's step is a function of the hostile itself, the avatar
//! position and dt (plus the session RNG for the Bomber's telegraph roll).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::status::StatusEffects;
use super::telegraph::{Telegraph, TelegraphKind, TelegraphSource};
use crate::consts::*;
use crate::{clamp_to_arena, direction_or_up};

/// Chaser base speed (px/s)
pub const CHASER_SPEED: f32 = 90.0;
/// Lateral wander amplitude (px/s) and frequency (rad/s)
pub const CHASER_WANDER: f32 = 35.0;
pub const CHASER_WANDER_FREQ: f32 = 3.0;
pub const ELITE_HP_MULT: f32 = 3.0;
pub const ELITE_SPEED_MULT: f32 = 1.35;

/// Shooter patrol extents around its anchor
pub const SHOOTER_PATROL_X: f32 = 90.0;
pub const SHOOTER_PATROL_Y: f32 = 30.0;
pub const SHOOTER_PATROL_FREQ: f32 = 1.2;

pub const BOMBER_DESCENT: f32 = 40.0;
pub const BOMBER_WOBBLE: f32 = 60.0;
/// Telegraphs per second (halved while slowed)
pub const BOMBER_TELEGRAPH_RATE: f32 = 0.3;

/// Hostile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    Chaser { elite: bool },
    Shooter,
    Bomber,
}

impl HostileKind {
    pub fn base_hp(self) -> f32 {
        match self {
            HostileKind::Chaser { elite: false } => 5.0,
            HostileKind::Chaser { elite: true } => 5.0 * ELITE_HP_MULT,
            HostileKind::Shooter => 6.0,
            HostileKind::Bomber => 4.0,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            HostileKind::Chaser { elite: false } => 12.0,
            HostileKind::Chaser { elite: true } => 16.0,
            HostileKind::Shooter => 14.0,
            HostileKind::Bomber => 14.0,
        }
    }

    /// Render tag for the snapshot
    pub fn tag(self) -> &'static str {
        match self {
            HostileKind::Chaser { elite: false } => "chaser",
            HostileKind::Chaser { elite: true } => "elite",
            HostileKind::Shooter => "shooter",
            HostileKind::Bomber => "bomber",
        }
    }
}

/// A hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub kind: HostileKind,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub status: StatusEffects,
    /// Chaser wander phase
    pub wander_phase: f32,
    /// Shooter patrol phase and origin
    pub patrol_phase: f32,
    pub anchor: Vec2,
    /// Bomber time-since-spawn, drives the wobble
    pub fall_acc: f32,
}

impl Hostile {
    pub fn new(id: u32, kind: HostileKind, pos: Vec2, phase: f32) -> Self {
        let radius = kind.radius();
        let pos = clamp_to_arena(pos, radius);
        Self {
            id,
            kind,
            pos,
            radius,
            hp: kind.base_hp(),
            hp_max: kind.base_hp(),
            status: StatusEffects::default(),
            wander_phase: phase,
            patrol_phase: phase,
            anchor: pos,
            fall_acc: 0.0,
        }
    }

    #[inline]
    pub fn dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Hp as shown to consumers (never negative)
    pub fn display_hp(&self) -> f32 {
        self.hp.max(0.0)
    }

    /// Run status timers, applying burn chip damage
    pub fn update_status(&mut self, dt: f32) {
        let mut burn = 0.0;
        self.status.update(dt, |d| burn += d);
        self.hp -= burn;
    }

    /// Move one tick. A Bomber may return a telegraph centred on itself.
    pub fn step(&mut self, avatar_pos: Vec2, dt: f32, rng: &mut impl Rng) -> Option<Telegraph> {
        let slow = self.status.speed_factor();
        let mut telegraph = None;

        match self.kind {
            HostileKind::Chaser { elite } => {
                let seek = direction_or_up(avatar_pos - self.pos);
                let side = seek.perp();
                let speed = if elite { CHASER_SPEED * ELITE_SPEED_MULT } else { CHASER_SPEED };
                self.wander_phase += dt * CHASER_WANDER_FREQ;
                let wander = side * self.wander_phase.sin() * CHASER_WANDER;
                self.pos += (seek * speed * slow + wander) * dt;
            }
            HostileKind::Shooter => {
                self.patrol_phase += dt * SHOOTER_PATROL_FREQ * slow;
                let p = self.patrol_phase;
                self.pos = self.anchor
                    + Vec2::new(p.sin() * SHOOTER_PATROL_X, (p * 2.0).sin() * SHOOTER_PATROL_Y);
            }
            HostileKind::Bomber => {
                self.fall_acc += dt;
                let wobble = (self.fall_acc * 4.0).sin() * BOMBER_WOBBLE;
                self.pos += Vec2::new(wobble, -BOMBER_DESCENT * slow) * dt;
                // Re-enter from the top after reaching the floor
                if self.pos.y <= ARENA_MARGIN + self.radius {
                    self.pos.y = ARENA_HEIGHT - ARENA_MARGIN - self.radius;
                }

                let rate = if self.status.slowed() {
                    BOMBER_TELEGRAPH_RATE * 0.5
                } else {
                    BOMBER_TELEGRAPH_RATE
                };
                let chance = (rate * dt).clamp(0.0, 1.0) as f64;
                if rng.random_bool(chance) {
                    telegraph = Some(Telegraph::new(
                        self.pos,
                        TelegraphKind::Ring,
                        TelegraphSource::Bomber(self.id),
                    ));
                }
            }
        }

        self.pos = clamp_to_arena(self.pos, self.radius);
        telegraph
    }
}
