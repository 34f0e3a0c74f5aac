//! Session state and core simulation types
//!
//! One `GameState` is one encounter. Everything the tick mutates lives here;
//! advancing to the next encounter builds a fresh session from a by-value
//! `Carryover`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::avatar::{Avatar, AvatarStats};
use super::boss::Boss;
use super::director::{ENCOUNTER_MULTIPLIERS, WaveDirector, WavePlan, is_final_encounter};
use super::hostile::{Hostile, HostileKind};
use super::pickup::Pickup;
use super::progression::Perk;
use super::projectile::Projectile;
use super::telegraph::Telegraph;
use crate::consts::*;
use crate::settings::Settings;
use crate::unit_from_angle;

/// Id reserved for the boss in projectile hit bookkeeping
pub const BOSS_ID: u32 = 0;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Encounter start freeze
    Intro,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level-up: waiting for a perk choice (offer in `GameState::perk_offer`)
    PerkDraft,
    /// Boss down, waiting for the next encounter to be built
    EncounterComplete,
    /// Final boss down
    Victory,
    /// Avatar died
    Defeat,
}

impl GamePhase {
    /// Whether the run has ended
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Particle flavors for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Hit,
    Death,
    Dash,
    Burst,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Avatar state handed from one encounter to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carryover {
    /// Encounter to build (0-based)
    pub encounter: u32,
    pub stats: AvatarStats,
    pub score: u64,
    pub elapsed: f32,
    pub time_ticks: u64,
}

/// Events for the screen-transition layer, emitted during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { wave: u32, total: u32 },
    WaveCleared { wave: u32, orbs: u32 },
    BossSpawned { giant: bool },
    BossPhaseChanged { phase: u8 },
    BossDefeated { score_awarded: u64 },
    HostileKilled { id: u32, kind: HostileKind, dropped_orb: bool },
    AvatarHit { hp: f32, absorbed: bool },
    LevelUp { level: u32 },
    /// Show the perk-draft screen
    PerkDraft { perks: Vec<Perk> },
    PerkChosen { perk: Perk },
    /// Build the next encounter from this carryover
    AdvanceEncounter { carryover: Carryover },
    Victory { score: u64, elapsed: f32, ticks: u64 },
    Defeat { score: u64, elapsed: f32, ticks: u64 },
    Restarted,
    ReturnToMenu,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG, derived from the run seed and encounter index
    pub rng: Pcg32,
    pub settings: Settings,
    /// Current encounter (0-based)
    pub encounter: u32,
    pub phase: GamePhase,
    /// Intro freeze remaining (seconds)
    pub intro_t: f32,
    /// Run time in seconds (carried across encounters)
    pub elapsed: f32,
    /// Simulation tick counter (carried across encounters)
    pub time_ticks: u64,
    pub score: u64,
    pub avatar: Avatar,
    /// Active hostiles (sorted by id for determinism)
    pub hostiles: Vec<Hostile>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    /// Pending telegraphs from every source
    pub telegraphs: Vec<Telegraph>,
    pub pickups: Vec<Pickup>,
    pub director: WaveDirector,
    /// Perks on offer while in `GamePhase::PerkDraft`
    pub perk_offer: Vec<Perk>,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a fresh run at the first encounter
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut stats = AvatarStats::default();
        let bonus = settings.difficulty.avatar_bonus_hp();
        stats.hp_max += bonus;
        stats.hp += bonus;
        Self::build(
            seed,
            settings,
            Carryover {
                encounter: 0,
                stats,
                score: 0,
                elapsed: 0.0,
                time_ticks: 0,
            },
        )
    }

    /// Build an encounter session that inherits `carryover`
    pub fn with_carryover(seed: u64, settings: Settings, carryover: Carryover) -> Self {
        Self::build(seed, settings, carryover)
    }

    fn build(seed: u64, settings: Settings, carry: Carryover) -> Self {
        let encounter = carry.encounter.min(ENCOUNTER_MULTIPLIERS.len() as u32 - 1);
        let multiplier =
            ENCOUNTER_MULTIPLIERS[encounter as usize] * settings.difficulty.hostile_multiplier();
        let stream = seed.wrapping_add(u64::from(encounter).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let (phase, intro_t) = if settings.intro_freeze {
            (GamePhase::Intro, INTRO_FREEZE)
        } else {
            (GamePhase::Playing, 0.0)
        };

        log::info!(
            "Encounter {} (x{:.2}, {})",
            encounter + 1,
            multiplier,
            settings.difficulty.as_str()
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(stream),
            settings,
            encounter,
            phase,
            intro_t,
            elapsed: carry.elapsed,
            time_ticks: carry.time_ticks,
            score: carry.score,
            avatar: Avatar::new(carry.stats),
            hostiles: Vec::new(),
            boss: None,
            projectiles: Vec::new(),
            telegraphs: Vec::new(),
            pickups: Vec::new(),
            director: WaveDirector::new(multiplier),
            perk_offer: Vec::new(),
            events: Vec::new(),
            particles: Vec::new(),
            next_id: BOSS_ID + 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events of the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_final_encounter(&self) -> bool {
        is_final_encounter(self.encounter)
    }

    /// Snapshot of what the next encounter inherits
    pub fn carryover(&self) -> Carryover {
        Carryover {
            encounter: self.encounter + 1,
            stats: self.avatar.stats.clone(),
            score: self.score,
            elapsed: self.elapsed,
            time_ticks: self.time_ticks,
        }
    }

    /// Build the next encounter once this one is complete
    pub fn advance_encounter(&self) -> Option<GameState> {
        if self.phase != GamePhase::EncounterComplete {
            return None;
        }
        Some(Self::with_carryover(self.seed, self.settings.clone(), self.carryover()))
    }

    /// Discard everything and start the run over
    pub fn restart(&mut self) {
        log::info!("Restarting run (seed {})", self.seed);
        *self = GameState::new(self.seed, self.settings.clone());
    }

    /// Spawn one hostile at `pos`
    pub fn spawn_hostile(&mut self, kind: HostileKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.hostiles.push(Hostile::new(id, kind, pos, phase));
        id
    }

    /// Spawn an ordinary wave in the upper part of the arena
    pub fn spawn_wave(&mut self, plan: &WavePlan) {
        let upper = |rng: &mut Pcg32| {
            Vec2::new(
                rng.random_range(60.0..ARENA_WIDTH - 60.0),
                rng.random_range(ARENA_HEIGHT * 0.55..ARENA_HEIGHT - 40.0),
            )
        };
        for _ in 0..plan.chasers {
            let pos = upper(&mut self.rng);
            self.spawn_hostile(HostileKind::Chaser { elite: false }, pos);
        }
        for _ in 0..plan.shooters {
            let pos = upper(&mut self.rng);
            self.spawn_hostile(HostileKind::Shooter, pos);
        }
        for _ in 0..plan.bombers {
            let x = self.rng.random_range(60.0..ARENA_WIDTH - 60.0);
            self.spawn_hostile(HostileKind::Bomber, Vec2::new(x, ARENA_HEIGHT - 40.0));
        }
        if plan.elite {
            let pos = upper(&mut self.rng);
            self.spawn_hostile(HostileKind::Chaser { elite: true }, pos);
        }
    }

    /// Spawn this encounter's boss (the giant in the final encounter)
    pub fn spawn_boss(&mut self) {
        let hp_mult = self.settings.difficulty.boss_hp_multiplier();
        let boss = if self.is_final_encounter() {
            Boss::giant(hp_mult)
        } else {
            Boss::new(self.encounter, hp_mult)
        };
        log::info!("Boss spawned: {:.0} hp{}", boss.hp_max, if boss.giant { " (giant)" } else { "" });
        self.emit(GameEvent::BossSpawned { giant: boss.giant });
        self.boss = Some(boss);
    }

    /// Scatter `count` experience orbs in a ring around `center`
    pub fn scatter_orbs(&mut self, center: Vec2, count: u32, spread: f32) {
        for i in 0..count {
            let theta = std::f32::consts::TAU * i as f32 / count.max(1) as f32;
            let dir = unit_from_angle(theta);
            self.pickups.push(Pickup::orb(center + dir * spread, dir * 40.0));
        }
    }

    /// Emit a ring of visual particles
    pub fn spawn_particles(&mut self, pos: Vec2, kind: ParticleKind, count: usize, speed: f32) {
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        let count = count.min(room);
        // Angle offset from the tick counter; visuals never touch the session RNG
        let phase = (self.time_ticks % 97) as f32 * 0.37;
        for i in 0..count {
            let theta = phase + std::f32::consts::TAU * i as f32 / count.max(1) as f32;
            self.particles.push(Particle {
                pos,
                vel: unit_from_angle(theta) * speed,
                kind,
                life: 1.0,
                size: if kind == ParticleKind::Death { 4.0 } else { 2.5 },
            });
        }
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.hostiles.sort_by_key(|h| h.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    #[test]
    fn test_new_state() {
        let state = GameState::new(42, Settings::default());
        assert_eq!(state.encounter, 0);
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(state.hostiles.is_empty());
        assert!(state.boss.is_none());
        assert_eq!(state.avatar.stats.level, 1);
    }

    #[test]
    fn test_easy_grants_bonus_hp() {
        let state = GameState::new(42, Settings::from_preset(Difficulty::Easy));
        assert_eq!(state.avatar.stats.hp_max, AVATAR_MAX_HP + Difficulty::Easy.avatar_bonus_hp());
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(1, Settings::default());
        let a = state.spawn_hostile(HostileKind::Shooter, Vec2::new(100.0, 400.0));
        let b = state.spawn_hostile(HostileKind::Bomber, Vec2::new(200.0, 400.0));
        assert!(a > BOSS_ID);
        assert!(b > a);
    }

    #[test]
    fn test_advance_copies_stats_by_value() {
        let mut state = GameState::new(9, Settings::default());
        assert!(state.advance_encounter().is_none());

        state.avatar.stats.damage = 99.0;
        state.avatar.pos = Vec2::new(10.0, 10.0);
        state.score = 500;
        state.phase = GamePhase::EncounterComplete;

        let mut next = state.advance_encounter().unwrap();
        assert_eq!(next.encounter, 1);
        assert_eq!(next.avatar.stats.damage, 99.0);
        assert_eq!(next.score, 500);
        assert_ne!(next.avatar.pos, state.avatar.pos);

        // The new session owns its copy
        next.avatar.stats.damage = 1.0;
        assert_eq!(state.avatar.stats.damage, 99.0);
    }

    #[test]
    fn test_final_encounter_spawns_giant() {
        let mut state = GameState::with_carryover(
            3,
            Settings::default(),
            Carryover {
                encounter: 2,
                stats: AvatarStats::default(),
                score: 0,
                elapsed: 0.0,
                time_ticks: 0,
            },
        );
        assert!(state.is_final_encounter());
        state.spawn_boss();
        assert!(state.boss.as_ref().is_some_and(|b| b.giant));
    }

    #[test]
    fn test_particles_are_capped() {
        let mut state = GameState::new(1, Settings::default());
        for _ in 0..100 {
            state.spawn_particles(Vec2::ZERO, ParticleKind::Burst, 10, 50.0);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }
}
