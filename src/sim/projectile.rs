//! Projectile physics and burst patterns

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{direction_or_up, unit_from_angle};

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Avatar,
    Hostile,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub owner: Owner,
    /// Base damage per hit (before crit / pellet nerf)
    pub damage: f32,
    /// Spread pellet, damage is nerfed on hit
    pub pellet: bool,
    /// Additional bodies this projectile may pass through
    pub pierce: u32,
    /// Entity ids already struck (a body is never hit twice)
    #[serde(default)]
    pub struck: Vec<u32>,
}

impl Projectile {
    /// Avatar shot travelling along `dir`
    pub fn avatar_shot(pos: Vec2, dir: Vec2, damage: f32, pierce: u32, pellet: bool) -> Self {
        Self {
            pos,
            vel: direction_or_up(dir) * AVATAR_SHOT_SPEED,
            radius: AVATAR_SHOT_RADIUS,
            owner: Owner::Avatar,
            damage,
            pellet,
            pierce,
            struck: Vec::new(),
        }
    }

    /// Hostile/boss shot travelling along `dir` at `speed`
    pub fn hostile_shot(pos: Vec2, dir: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel: direction_or_up(dir) * speed,
            radius: HOSTILE_SHOT_RADIUS,
            owner: Owner::Hostile,
            damage: HOSTILE_SHOT_DAMAGE,
            pellet: false,
            pierce: 0,
            struck: Vec::new(),
        }
    }

    /// Advance position by velocity
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Fully outside the arena rectangle
    pub fn out_of_bounds(&self) -> bool {
        let r = self.radius;
        self.pos.x < -r
            || self.pos.x > ARENA_WIDTH + r
            || self.pos.y < -r
            || self.pos.y > ARENA_HEIGHT + r
    }

    pub fn has_struck(&self, id: u32) -> bool {
        self.struck.contains(&id)
    }

    /// Register a hit on `id`. Returns true if the projectile is spent.
    pub fn register_hit(&mut self, id: u32) -> bool {
        self.struck.push(id);
        if self.pierce == 0 {
            true
        } else {
            self.pierce -= 1;
            false
        }
    }
}

/// `count` hostile shots evenly spaced around a full circle
pub fn ring_burst(center: Vec2, count: u32, speed: f32, phase: f32) -> Vec<Projectile> {
    let count = count.max(1);
    let step = std::f32::consts::TAU / count as f32;
    (0..count)
        .map(|i| {
            let dir = unit_from_angle(phase + step * i as f32);
            Projectile::hostile_shot(center, dir, speed)
        })
        .collect()
}

/// `count` hostile shots spread over `spread` radians centred on `aim`
pub fn fan(center: Vec2, aim: Vec2, count: u32, spread: f32, speed: f32) -> Vec<Projectile> {
    let aim = direction_or_up(aim);
    if count <= 1 {
        return vec![Projectile::hostile_shot(center, aim, speed)];
    }
    let base = aim.y.atan2(aim.x);
    (0..count)
        .map(|i| {
            let t = i as f32 / (count - 1) as f32 - 0.5;
            Projectile::hostile_shot(center, unit_from_angle(base + spread * t), speed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_burst_evenly_spaced() {
        let shots = ring_burst(Vec2::new(100.0, 100.0), 8, 200.0, 0.0);
        assert_eq!(shots.len(), 8);
        let sum: Vec2 = shots.iter().map(|p| p.vel).sum();
        assert!(sum.length() < 0.01);
        assert!(shots.iter().all(|p| p.owner == Owner::Hostile));
    }

    #[test]
    fn test_fan_centered_on_aim() {
        let shots = fan(Vec2::ZERO, Vec2::X, 7, 1.0, 100.0);
        assert_eq!(shots.len(), 7);
        let middle = shots[3].vel.normalize();
        assert!((middle - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn test_pierce_counts_down() {
        let mut p = Projectile::avatar_shot(Vec2::ZERO, Vec2::Y, 3.0, 2, false);
        assert!(!p.register_hit(1));
        assert!(!p.register_hit(2));
        assert!(p.register_hit(3));
        assert!(p.has_struck(2));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut p = Projectile::hostile_shot(Vec2::new(5.0, 5.0), Vec2::new(-1.0, 0.0), 600.0);
        assert!(!p.out_of_bounds());
        p.integrate(1.0);
        assert!(p.out_of_bounds());
    }
}
