//! The player-controlled avatar
//!
//! `AvatarStats` is the power level that survives between encounters (copied
//! by value). `Avatar` adds the per-encounter transient state: position,
//! cooldowns, dash/invulnerability windows and combo.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::projectile::Projectile;
use super::status::OnHitStatus;
use super::timer::{Cooldown, TIME_EPSILON};
use crate::consts::*;
use crate::{clamp_to_arena, direction_or_up, unit_from_angle};

/// Stat record mutated by perks and carried across encounters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarStats {
    pub hp: f32,
    pub hp_max: f32,
    pub speed: f32,
    pub damage: f32,
    pub pierce: u32,
    pub crit_chance: f32,
    pub fire_cooldown: f32,
    pub melee_cooldown: f32,
    pub melee_damage: f32,
    pub melee_range: f32,
    pub dash_cooldown: f32,
    pub has_spread: bool,
    pub spread_pellets: u32,
    pub burn_on_hit: bool,
    pub burn_damage: f32,
    pub slow_on_hit: bool,
    pub slow_factor: f32,
    pub regen_on: bool,
    pub regen_interval: f32,
    pub magnet_radius: f32,
    pub shield: u32,
    pub xp: u32,
    pub level: u32,
}

impl Default for AvatarStats {
    fn default() -> Self {
        Self {
            hp: AVATAR_MAX_HP,
            hp_max: AVATAR_MAX_HP,
            speed: AVATAR_SPEED,
            damage: SHOT_DAMAGE,
            pierce: 0,
            crit_chance: CRIT_CHANCE,
            fire_cooldown: FIRE_COOLDOWN,
            melee_cooldown: MELEE_COOLDOWN,
            melee_damage: MELEE_DAMAGE,
            melee_range: MELEE_RANGE,
            dash_cooldown: DASH_COOLDOWN,
            has_spread: false,
            spread_pellets: SPREAD_PELLETS,
            burn_on_hit: false,
            burn_damage: BURN_DAMAGE,
            slow_on_hit: false,
            slow_factor: SLOW_FACTOR,
            regen_on: false,
            regen_interval: REGEN_INTERVAL,
            magnet_radius: MAGNET_RADIUS,
            shield: 0,
            xp: 0,
            level: 1,
        }
    }
}

impl AvatarStats {
    /// Status payload applied by this avatar's hits
    pub fn on_hit_status(&self) -> OnHitStatus {
        OnHitStatus {
            burn: self.burn_on_hit.then_some(self.burn_damage),
            slow: self.slow_on_hit.then_some(self.slow_factor),
        }
    }
}

/// Outcome of an incoming hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invulnerable, nothing happened
    Ignored,
    /// A shield charge soaked the hit
    Absorbed,
    /// Hp was lost
    Damaged,
}

impl HitOutcome {
    /// The hit connected (shield or hp)
    pub fn landed(self) -> bool {
        self != HitOutcome::Ignored
    }
}

/// The avatar entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    pub radius: f32,
    pub stats: AvatarStats,
    /// Unit aim vector
    pub aim: Vec2,
    pub fire_cd: Cooldown,
    pub melee_cd: Cooldown,
    pub dash_cd: Cooldown,
    /// Dash movement window
    pub dash_window: Cooldown,
    /// Invulnerability window (dash or post-hit grace)
    pub invuln: Cooldown,
    pub combo: u32,
    /// Time before the combo decays back to 1
    pub combo_window: Cooldown,
    pub regen_t: f32,
}

impl Avatar {
    /// Fresh avatar at the default spawn with the given power level
    pub fn new(stats: AvatarStats) -> Self {
        let mut avatar = Self {
            pos: Vec2::new(ARENA_WIDTH / 2.0, 100.0),
            radius: AVATAR_RADIUS,
            aim: Vec2::Y,
            fire_cd: Cooldown::new(stats.fire_cooldown),
            melee_cd: Cooldown::new(stats.melee_cooldown),
            dash_cd: Cooldown::new(stats.dash_cooldown),
            dash_window: Cooldown::new(DASH_DURATION),
            invuln: Cooldown::new(0.0),
            combo: 1,
            combo_window: Cooldown::new(COMBO_WINDOW),
            regen_t: stats.regen_interval,
            stats,
        };
        avatar.pos = clamp_to_arena(avatar.pos, avatar.radius);
        avatar
    }

    /// Push stat-derived cooldown durations into the live timers
    pub fn sync_timers(&mut self) {
        self.fire_cd.set_duration(self.stats.fire_cooldown);
        self.melee_cd.set_duration(self.stats.melee_cooldown);
        self.dash_cd.set_duration(self.stats.dash_cooldown);
    }

    #[inline]
    pub fn invulnerable(&self) -> bool {
        !self.invuln.ready()
    }

    #[inline]
    pub fn dashing(&self) -> bool {
        !self.dash_window.ready()
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.stats.hp > 0.0
    }

    /// Count down every avatar timer. Combo resets when its window elapses.
    pub fn update_timers(&mut self, dt: f32) {
        self.fire_cd.update(dt);
        self.melee_cd.update(dt);
        self.dash_cd.update(dt);
        self.dash_window.update(dt);
        self.invuln.update(dt);

        if !self.combo_window.ready() {
            self.combo_window.update(dt);
            if self.combo_window.ready() {
                self.combo = 1;
            }
        }

        if self.stats.regen_on {
            self.regen_t -= dt;
            if self.regen_t < TIME_EPSILON {
                self.regen_t += self.stats.regen_interval;
                self.heal(1.0);
            }
        }
    }

    /// Point the aim vector at a world position
    pub fn aim_at(&mut self, target: Vec2) {
        self.aim = direction_or_up(target - self.pos);
    }

    /// Apply axis input. Dash speed overrides walking speed while active.
    pub fn move_axes(&mut self, axis_x: f32, axis_y: f32, dt: f32) {
        let mut dir = Vec2::new(axis_x, axis_y);
        if axis_x != 0.0 && axis_y != 0.0 {
            dir *= DIAGONAL_SCALE;
        }

        let velocity = if self.dashing() {
            // Dash keeps going along input (or aim when standing still)
            let dash_dir = if dir == Vec2::ZERO { self.aim } else { direction_or_up(dir) };
            dash_dir * DASH_SPEED
        } else {
            dir * self.stats.speed
        };

        self.pos = clamp_to_arena(self.pos + velocity * dt, self.radius);
    }

    /// Fire along the aim vector. Returns nothing while on cooldown.
    pub fn shoot(&mut self) -> Vec<Projectile> {
        if !self.fire_cd.ready() {
            return Vec::new();
        }
        self.fire_cd.trigger();

        let origin = self.pos + self.aim * (self.radius * 0.5);
        let damage = self.stats.damage;
        let pierce = self.stats.pierce;

        if !self.stats.has_spread {
            return vec![Projectile::avatar_shot(origin, self.aim, damage, pierce, false)];
        }

        let pellets = self.stats.spread_pellets.max(2);
        let base = self.aim.y.atan2(self.aim.x);
        (0..pellets)
            .map(|i| {
                let t = i as f32 / (pellets - 1) as f32;
                let theta = base - SPREAD_HALF_ANGLE + 2.0 * SPREAD_HALF_ANGLE * t;
                Projectile::avatar_shot(origin, unit_from_angle(theta), damage, pierce, true)
            })
            .collect()
    }

    /// Start a dash. Returns false while on cooldown.
    pub fn dash(&mut self) -> bool {
        if !self.dash_cd.ready() {
            return false;
        }
        self.dash_cd.trigger();
        self.dash_window.trigger();
        self.invuln.extend(DASH_INVULN.max(DASH_DURATION));
        self.pos = clamp_to_arena(self.pos + self.aim * DASH_IMPULSE, self.radius);
        true
    }

    /// Gate a melee swing. Target selection happens in the resolver.
    pub fn try_melee(&mut self) -> bool {
        if !self.melee_cd.ready() {
            return false;
        }
        self.melee_cd.trigger();
        true
    }

    /// Whether a body at `target` with `target_radius` is within melee reach
    pub fn in_melee_range(&self, target: Vec2, target_radius: f32) -> bool {
        self.pos.distance(target) - target_radius <= self.stats.melee_range
    }

    /// Damage for a single landed hit, crit rolled independently
    pub fn roll_hit_damage(&self, base: f32, pellet: bool, rng: &mut impl Rng) -> f32 {
        let crit = rng.random_bool(self.stats.crit_chance.clamp(0.0, 1.0) as f64);
        let mut damage = base;
        if crit {
            damage *= CRIT_MULTIPLIER;
        }
        if pellet {
            damage *= PELLET_NERF;
        }
        damage
    }

    /// Incoming damage
    pub fn take_hit(&mut self, amount: f32) -> HitOutcome {
        if self.invulnerable() {
            return HitOutcome::Ignored;
        }
        if self.stats.shield > 0 {
            self.stats.shield -= 1;
            return HitOutcome::Absorbed;
        }
        self.stats.hp -= amount;
        self.combo = 1;
        self.combo_window.reset();
        HitOutcome::Damaged
    }

    /// Register a projectile hit on the boss: bump combo and refresh its window
    pub fn register_combo_hit(&mut self) {
        self.combo = (self.combo + 1).min(COMBO_MAX);
        self.combo_window.trigger();
    }

    pub fn heal(&mut self, amount: f32) {
        self.stats.hp = (self.stats.hp + amount).min(self.stats.hp_max);
    }

    /// Hp as shown to consumers (never negative)
    pub fn display_hp(&self) -> f32 {
        self.stats.hp.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_diagonal_movement_normalized() {
        let mut a = Avatar::new(AvatarStats::default());
        a.pos = Vec2::new(400.0, 300.0);
        a.move_axes(1.0, 1.0, 0.1);
        let moved = a.pos - Vec2::new(400.0, 300.0);
        let expected = AVATAR_SPEED * 0.1 * DIAGONAL_SCALE;
        assert!((moved.x - expected).abs() < 1e-3);
        assert!((moved.y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_movement_clamped() {
        let mut a = Avatar::new(AvatarStats::default());
        a.move_axes(-1.0, 0.0, 100.0);
        assert_eq!(a.pos.x, ARENA_MARGIN + AVATAR_RADIUS);
    }

    #[test]
    fn test_shoot_gated_by_cooldown() {
        let mut a = Avatar::new(AvatarStats::default());
        assert_eq!(a.shoot().len(), 1);
        assert!(a.shoot().is_empty());
        a.update_timers(FIRE_COOLDOWN);
        assert_eq!(a.shoot().len(), 1);
    }

    #[test]
    fn test_spread_shot_tags_pellets() {
        let mut stats = AvatarStats::default();
        stats.has_spread = true;
        let mut a = Avatar::new(stats);
        let shots = a.shoot();
        assert_eq!(shots.len(), SPREAD_PELLETS as usize);
        assert!(shots.iter().all(|p| p.pellet));
    }

    #[test]
    fn test_dash_grants_invulnerability() {
        let mut a = Avatar::new(AvatarStats::default());
        assert!(a.dash());
        assert!(a.dashing());
        assert!(a.invuln.remaining >= DASH_DURATION);
        assert!(!a.dash());
        assert_eq!(a.take_hit(1.0), HitOutcome::Ignored);
        assert_eq!(a.stats.hp, AVATAR_MAX_HP);
    }

    #[test]
    fn test_grace_window_ends_on_exact_tick() {
        let mut a = Avatar::new(AvatarStats::default());
        a.invuln.extend(CONTACT_GRACE);
        let ticks = (CONTACT_GRACE / SIM_DT).round() as u32;
        for _ in 1..ticks {
            a.update_timers(SIM_DT);
            assert!(a.invulnerable());
        }
        a.update_timers(SIM_DT);
        assert!(!a.invulnerable());
        assert_eq!(a.take_hit(1.0), HitOutcome::Damaged);
    }

    #[test]
    fn test_shield_absorbs() {
        let mut stats = AvatarStats::default();
        stats.shield = 1;
        let mut a = Avatar::new(stats);
        a.combo = 3;
        assert_eq!(a.take_hit(2.0), HitOutcome::Absorbed);
        assert_eq!(a.stats.hp, AVATAR_MAX_HP);
        assert_eq!(a.stats.shield, 0);
        assert_eq!(a.combo, 3);
        assert_eq!(a.take_hit(2.0), HitOutcome::Damaged);
        assert_eq!(a.stats.hp, AVATAR_MAX_HP - 2.0);
        assert_eq!(a.combo, 1);
    }

    #[test]
    fn test_combo_caps_and_decays() {
        let mut a = Avatar::new(AvatarStats::default());
        for _ in 0..10 {
            a.register_combo_hit();
        }
        assert_eq!(a.combo, COMBO_MAX);
        a.update_timers(COMBO_WINDOW - 0.5);
        assert_eq!(a.combo, COMBO_MAX);
        a.update_timers(0.5);
        assert_eq!(a.combo, 1);
    }

    #[test]
    fn test_melee_range_uses_target_radius() {
        let a = Avatar::new(AvatarStats::default());
        let target = a.pos + Vec2::new(MELEE_RANGE + 15.0, 0.0);
        assert!(a.in_melee_range(target, 15.0));
        assert!(!a.in_melee_range(target, 10.0));
    }

    #[test]
    fn test_roll_hit_damage_without_crit() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stats = AvatarStats::default();
        stats.crit_chance = 0.0;
        let a = Avatar::new(stats);
        assert_eq!(a.roll_hit_damage(3.0, false, &mut rng), 3.0);
        assert!((a.roll_hit_damage(3.0, true, &mut rng) - 3.0 * PELLET_NERF).abs() < 1e-6);
    }

    #[test]
    fn test_regen_heals() {
        let mut stats = AvatarStats::default();
        stats.regen_on = true;
        stats.hp = 4.0;
        let mut a = Avatar::new(stats);
        a.update_timers(REGEN_INTERVAL);
        assert_eq!(a.stats.hp, 5.0);
    }
}
