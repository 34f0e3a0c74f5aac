//! Boss entity and its phase state machine
//!
//! Phase selection is an explicit state machine: `BossPhase` names the state,
//! `BossPhase::next` is the transition predicate, and `AttackPattern` is the
//! per-state behavior table. The giant variant uses its own single-phase table.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::projectile::{Projectile, fan};
use super::telegraph::{Telegraph, TelegraphKind, TelegraphSource};
use super::timer::Cooldown;
use crate::consts::*;
use crate::{clamp_to_arena, direction_or_up, unit_from_angle};

/// Boss projectile base speed (px/s)
pub const BOSS_SHOT_SPEED: f32 = 350.0;
/// Hp fraction below which phase 1 turns into phase 2
pub const ENRAGE_THRESHOLD: f32 = 0.5;
/// Hostile population cap respected by reinforcement spawns
pub const REINFORCEMENT_CAP: usize = 6;
/// Giant telegraph warning radius
pub const GIANT_TELEGRAPH_RADIUS: f32 = 110.0;
/// Phase-2 dash cadence and post-dash fan
pub const DASH_INTERVAL: f32 = 3.0;
pub const DASH_FAN_COUNT: u32 = 9;
/// Phase-1 sway
pub const PATROL_SPEED: f32 = 72.0;

/// Boss phase state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Initial pattern: aimed shots and ring telegraphs
    One,
    /// Enraged: fans, big rings, reinforcements, dashes
    Two,
}

impl BossPhase {
    /// Transition predicate. Phase 2 is terminal.
    pub fn next(self, hp_fraction: f32, giant: bool) -> Option<BossPhase> {
        match self {
            BossPhase::One if !giant && hp_fraction < ENRAGE_THRESHOLD => Some(BossPhase::Two),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            BossPhase::One => 1,
            BossPhase::Two => 2,
        }
    }
}

/// Behavior table entry for one boss state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackPattern {
    /// Single aimed shot interval (0 = none)
    pub aimed_interval: f32,
    /// Chance that an aimed shot also queues a ring telegraph
    pub ring_chance: f64,
    /// Fan cadence (0 = none)
    pub fan_interval: f32,
    pub fan_count: u32,
    pub fan_spread: f32,
    /// Big-ring telegraph cadence (0 = none)
    pub big_ring_interval: f32,
    /// Reinforcements per second
    pub reinforce_rate: f32,
    /// Random-direction shot cadence (giant only)
    pub random_interval: f32,
    /// Relocate toward the avatar every `DASH_INTERVAL`
    pub dashes: bool,
}

const PHASE_ONE: AttackPattern = AttackPattern {
    aimed_interval: 1.0,
    ring_chance: 0.3,
    fan_interval: 0.0,
    fan_count: 0,
    fan_spread: 0.0,
    big_ring_interval: 0.0,
    reinforce_rate: 0.0,
    random_interval: 0.0,
    dashes: false,
};

const PHASE_TWO: AttackPattern = AttackPattern {
    aimed_interval: 0.0,
    ring_chance: 0.0,
    fan_interval: 1.8,
    fan_count: 7,
    fan_spread: 1.22, // ~70 degrees
    big_ring_interval: 2.5,
    reinforce_rate: 0.3,
    random_interval: 0.0,
    dashes: true,
};

const GIANT: AttackPattern = AttackPattern {
    aimed_interval: 0.0,
    ring_chance: 0.0,
    fan_interval: 0.0,
    fan_count: 0,
    fan_spread: 0.0,
    big_ring_interval: 1.6,
    reinforce_rate: 0.0,
    random_interval: 0.12,
    dashes: false,
};

impl AttackPattern {
    /// Behavior table lookup
    pub fn for_state(phase: BossPhase, giant: bool) -> &'static AttackPattern {
        if giant {
            return &GIANT;
        }
        match phase {
            BossPhase::One => &PHASE_ONE,
            BossPhase::Two => &PHASE_TWO,
        }
    }
}

/// Everything a boss step asks the session to create
#[derive(Debug, Default)]
pub struct BossActions {
    pub projectiles: Vec<Projectile>,
    pub telegraphs: Vec<Telegraph>,
    pub reinforcements: u32,
    /// The boss relocated this tick (start, end)
    pub dash: Option<(Vec2, Vec2)>,
}

/// The boss entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub phase: BossPhase,
    /// Time spent in the current phase cadence
    pub phase_timer: f32,
    pub giant: bool,
    /// Total time alive, drives the sway
    pub sway_t: f32,
    pub fan_cd: Cooldown,
    pub big_ring_cd: Cooldown,
    pub random_cd: Cooldown,
}

impl Boss {
    /// Standard two-phase boss for encounter `encounter` (0-based)
    pub fn new(encounter: u32, hp_mult: f32) -> Self {
        let radius = 36.0 + 8.0 * (encounter + 1) as f32;
        let hp = (30.0 + 20.0 * encounter as f32) * hp_mult;
        Self::build(radius, hp, false)
    }

    /// Single-phase giant boss
    pub fn giant(hp_mult: f32) -> Self {
        Self::build(64.0, 120.0 * hp_mult, true)
    }

    fn build(radius: f32, hp: f32, giant: bool) -> Self {
        let pos = clamp_to_arena(Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT - 120.0), radius);
        Self {
            pos,
            radius,
            hp,
            hp_max: hp,
            phase: BossPhase::One,
            phase_timer: 0.0,
            giant,
            sway_t: 0.0,
            fan_cd: Cooldown::primed(PHASE_TWO.fan_interval),
            big_ring_cd: Cooldown::primed(if giant { GIANT.big_ring_interval } else { PHASE_TWO.big_ring_interval }),
            random_cd: Cooldown::new(GIANT.random_interval),
        }
    }

    #[inline]
    pub fn dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.hp_max <= 0.0 {
            0.0
        } else {
            (self.hp / self.hp_max).clamp(0.0, 1.0)
        }
    }

    /// Hp as shown to consumers (never negative)
    pub fn display_hp(&self) -> f32 {
        self.hp.max(0.0)
    }

    pub fn pattern(&self) -> &'static AttackPattern {
        AttackPattern::for_state(self.phase, self.giant)
    }

    /// Evaluate the transition predicate. On entering a new phase the phase
    /// timer restarts; the new pattern runs from the next step.
    pub fn update_phase(&mut self) -> Option<BossPhase> {
        let next = self.phase.next(self.hp_fraction(), self.giant)?;
        log::info!("Boss enters phase {} at {:.0}% hp", next.number(), self.hp_fraction() * 100.0);
        self.phase = next;
        self.phase_timer = 0.0;
        self.fan_cd.trigger();
        self.big_ring_cd.trigger();
        Some(next)
    }

    /// Run one tick of movement and attacks
    pub fn step(&mut self, avatar_pos: Vec2, dt: f32, hostile_count: usize, rng: &mut impl Rng) -> BossActions {
        let mut out = BossActions::default();
        let pattern = *self.pattern();
        self.phase_timer += dt;
        self.sway_t += dt;
        self.fan_cd.update(dt);
        self.big_ring_cd.update(dt);
        self.random_cd.update(dt);

        let aim = direction_or_up(avatar_pos - self.pos);

        if self.phase == BossPhase::One || self.giant {
            // Sinusoidal sway around the spawn column
            self.pos.x += (self.sway_t * 0.9).sin() * PATROL_SPEED * dt;
        }

        if pattern.aimed_interval > 0.0 && self.phase_timer > pattern.aimed_interval {
            self.phase_timer = 0.0;
            out.projectiles.push(Projectile::hostile_shot(self.pos, aim, BOSS_SHOT_SPEED));
            if rng.random_bool(pattern.ring_chance.clamp(0.0, 1.0)) {
                out.telegraphs.push(Telegraph::new(avatar_pos, TelegraphKind::Ring, TelegraphSource::Boss));
            }
        }

        if pattern.fan_interval > 0.0 && self.fan_cd.ready() {
            self.fan_cd.trigger();
            out.projectiles.extend(fan(
                self.pos,
                aim,
                pattern.fan_count,
                pattern.fan_spread,
                BOSS_SHOT_SPEED * 1.08,
            ));
        }

        if pattern.big_ring_interval > 0.0 && self.big_ring_cd.ready() {
            self.big_ring_cd.trigger();
            let telegraph = if self.giant {
                let jitter = Vec2::new(rng.random_range(-80.0..80.0), rng.random_range(-80.0..80.0));
                Telegraph::with_radius(
                    clamp_to_arena(avatar_pos + jitter, 0.0),
                    TelegraphKind::BigRing,
                    TelegraphSource::Boss,
                    GIANT_TELEGRAPH_RADIUS,
                )
            } else {
                Telegraph::new(avatar_pos, TelegraphKind::BigRing, TelegraphSource::Boss)
            };
            out.telegraphs.push(telegraph);
        }

        if pattern.random_interval > 0.0 && self.random_cd.ready() {
            self.random_cd.trigger();
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            out.projectiles.push(Projectile::hostile_shot(self.pos, unit_from_angle(theta), BOSS_SHOT_SPEED));
        }

        if pattern.reinforce_rate > 0.0 && hostile_count < REINFORCEMENT_CAP {
            let chance = (pattern.reinforce_rate * dt).clamp(0.0, 1.0) as f64;
            if rng.random_bool(chance) {
                out.reinforcements = 1;
            }
        }

        if pattern.dashes && self.phase_timer > DASH_INTERVAL {
            self.phase_timer = 0.0;
            let start = self.pos;
            let target = Vec2::new(
                avatar_pos.x + rng.random_range(-40.0..40.0),
                (avatar_pos.y + 40.0).clamp(ARENA_HEIGHT / 2.0, ARENA_HEIGHT - 60.0),
            );
            self.pos = clamp_to_arena(target, self.radius);
            let aim = direction_or_up(avatar_pos - self.pos);
            out.projectiles.extend(fan(self.pos, aim, DASH_FAN_COUNT, 0.7, BOSS_SHOT_SPEED * 1.08));
            out.dash = Some((start, self.pos));
        }

        self.pos = clamp_to_arena(self.pos, self.radius);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_phase_transition_is_one_way() {
        assert_eq!(BossPhase::One.next(0.49, false), Some(BossPhase::Two));
        assert_eq!(BossPhase::One.next(0.5, false), None);
        assert_eq!(BossPhase::Two.next(0.1, false), None);
        assert_eq!(BossPhase::One.next(0.1, true), None);
    }

    #[test]
    fn test_update_phase_resets_timer() {
        let mut boss = Boss::new(0, 1.0);
        boss.phase_timer = 0.7;
        boss.hp = boss.hp_max * 0.4;
        assert_eq!(boss.update_phase(), Some(BossPhase::Two));
        assert_eq!(boss.phase, BossPhase::Two);
        assert_eq!(boss.phase_timer, 0.0);
        assert_eq!(boss.update_phase(), None);
    }

    #[test]
    fn test_phase_one_fires_aimed_shot_each_second() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut boss = Boss::new(0, 1.0);
        let avatar = Vec2::new(450.0, 100.0);
        let mut shots = 0;
        for _ in 0..(60 * 5) {
            shots += boss.step(avatar, 1.0 / 60.0, 0, &mut rng).projectiles.len();
        }
        assert!((4..=5).contains(&shots));
    }

    #[test]
    fn test_phase_two_fires_fans_and_big_rings() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut boss = Boss::new(0, 1.0);
        boss.hp = 1.0;
        boss.update_phase();
        let mut max_volley = 0;
        let mut big_rings = 0;
        for _ in 0..(60 * 6) {
            let out = boss.step(Vec2::new(450.0, 100.0), 1.0 / 60.0, 0, &mut rng);
            max_volley = max_volley.max(out.projectiles.len());
            big_rings += out.telegraphs.iter().filter(|t| t.kind == TelegraphKind::BigRing).count();
        }
        assert!(max_volley >= PHASE_TWO.fan_count as usize);
        assert!(big_rings >= 2);
    }

    #[test]
    fn test_reinforcements_respect_cap() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut boss = Boss::new(0, 1.0);
        boss.hp = 1.0;
        boss.update_phase();
        for _ in 0..(60 * 30) {
            let out = boss.step(Vec2::new(450.0, 100.0), 1.0 / 60.0, REINFORCEMENT_CAP, &mut rng);
            assert_eq!(out.reinforcements, 0);
        }
    }

    #[test]
    fn test_giant_never_enrages_and_fires_often() {
        let mut rng = Pcg32::seed_from_u64(14);
        let mut boss = Boss::giant(1.0);
        boss.hp = 1.0;
        assert_eq!(boss.update_phase(), None);
        let mut shots = 0;
        let mut telegraphs = Vec::new();
        for _ in 0..60 {
            let out = boss.step(Vec2::new(450.0, 100.0), 1.0 / 60.0, 0, &mut rng);
            shots += out.projectiles.len();
            telegraphs.extend(out.telegraphs);
        }
        assert!(shots >= 6);
        assert!(telegraphs.iter().all(|t| t.radius == GIANT_TELEGRAPH_RADIUS));
    }
}
