//! Experience orbs and health/shield pickups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::direction_or_up;

/// Speed at which orbs home in on the avatar inside the magnet radius
pub const ORB_HOMING_SPEED: f32 = 260.0;
/// Downward drift for health/shield pickups
pub const PICKUP_FALL: f32 = 30.0;
/// Seconds before an uncollected health/shield pickup vanishes
pub const PICKUP_TTL: f32 = 10.0;
pub const PICKUP_RADIUS: f32 = 8.0;
pub const ORB_RADIUS: f32 = 5.0;
pub const HEALTH_RESTORE: f32 = 2.0;

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Shield,
    Xp,
}

/// A pickup entity (experience orbs included)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Time to live; orbs never expire
    pub ttl: Option<f32>,
}

impl Pickup {
    pub fn orb(pos: Vec2, vel: Vec2) -> Self {
        Self {
            kind: PickupKind::Xp,
            pos,
            vel,
            radius: ORB_RADIUS,
            ttl: None,
        }
    }

    pub fn item(kind: PickupKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::new(0.0, -PICKUP_FALL),
            radius: PICKUP_RADIUS,
            ttl: Some(PICKUP_TTL),
        }
    }

    #[inline]
    pub fn is_orb(&self) -> bool {
        self.kind == PickupKind::Xp
    }

    /// Drift one tick. Orbs inside `magnet_radius` home in on the avatar.
    pub fn drift(&mut self, avatar_pos: Vec2, magnet_radius: f32, dt: f32) {
        if self.is_orb() {
            if self.pos.distance(avatar_pos) <= magnet_radius {
                self.vel = direction_or_up(avatar_pos - self.pos) * ORB_HOMING_SPEED;
            } else {
                // Scatter velocity bleeds off
                self.vel *= (1.0 - 3.0 * dt).max(0.0);
            }
        }
        self.pos += self.vel * dt;
        let min = Vec2::splat(ARENA_MARGIN + self.radius);
        let max = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) - min;
        if !self.is_orb() && self.pos.y < min.y {
            self.vel = Vec2::ZERO;
        }
        self.pos = self.pos.clamp(min, max);
        if let Some(ttl) = self.ttl.as_mut() {
            *ttl -= dt;
        }
    }

    pub fn expired(&self) -> bool {
        self.ttl.is_some_and(|t| t <= 0.0)
    }
}
