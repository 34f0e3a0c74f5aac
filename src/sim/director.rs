//! Wave/spawn director
//!
//! Tracks the wave counter for one encounter, plans wave compositions and
//! decides when the next wave (or the boss) arrives. Waves advance purely on
//! clearance; score never gates progression.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::timer::Cooldown;
use crate::consts::*;

/// Encounter table: difficulty multiplier per encounter. The last one is the
/// climactic giant-boss fight.
pub const ENCOUNTER_MULTIPLIERS: [f32; 3] = [1.0, 1.35, 1.7];

pub fn encounter_count() -> u32 {
    ENCOUNTER_MULTIPLIERS.len() as u32
}

/// Whether `encounter` (0-based) is the last one
pub fn is_final_encounter(encounter: u32) -> bool {
    encounter + 1 >= encounter_count()
}

/// Composition of an ordinary wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WavePlan {
    pub chasers: u32,
    pub shooters: u32,
    pub bombers: u32,
    pub elite: bool,
}

impl WavePlan {
    pub fn total(&self) -> u32 {
        self.chasers + self.shooters + self.bombers + u32::from(self.elite)
    }
}

/// What the director wants the session to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectorAction {
    Idle,
    SpawnWave { wave: u32, plan: WavePlan },
    SpawnBoss { wave: u32 },
    /// The current wave just emptied; grant the clear burst
    WaveCleared { wave: u32, orbs: u32 },
}

/// Wave state for one encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Current wave (1-based, 0 before the first spawn)
    pub wave: u32,
    pub total_waves: u32,
    /// Encounter difficulty times the run difficulty
    pub multiplier: f32,
    /// Countdown to the next wave, if one is scheduled
    pub next_wave_in: Option<Cooldown>,
    /// The current wave has been cleared and the next one is pending
    pub clear_pending: bool,
    pub boss_spawned: bool,
}

impl WaveDirector {
    pub fn new(multiplier: f32) -> Self {
        Self {
            wave: 0,
            total_waves: WAVES_PER_ENCOUNTER,
            multiplier,
            next_wave_in: Some(Cooldown::new(0.0)),
            clear_pending: false,
            boss_spawned: false,
        }
    }

    #[inline]
    pub fn is_boss_wave(&self, wave: u32) -> bool {
        wave >= self.total_waves
    }

    /// Plan an ordinary wave. Counts scale with wave number and multiplier.
    pub fn plan_wave(&self, wave: u32, rng: &mut impl Rng) -> WavePlan {
        let w = wave as f32;
        let m = self.multiplier;
        WavePlan {
            chasers: ((2.0 + w) * m).floor() as u32,
            shooters: (w * 0.6 * m).floor() as u32,
            bombers: ((w - 1.0).max(0.0) * 0.7 * m).floor() as u32,
            elite: rng.random_bool(ELITE_CHANCE),
        }
    }

    /// Advance the director. `hostiles_alive` counts ordinary hostiles.
    pub fn update(&mut self, dt: f32, hostiles_alive: usize, rng: &mut impl Rng) -> DirectorAction {
        if let Some(countdown) = self.next_wave_in.as_mut() {
            countdown.update(dt);
            if !countdown.ready() {
                return DirectorAction::Idle;
            }
            self.next_wave_in = None;
            self.clear_pending = false;
            self.wave += 1;

            if self.is_boss_wave(self.wave) {
                self.boss_spawned = true;
                log::info!("Wave {}/{}: boss", self.wave, self.total_waves);
                return DirectorAction::SpawnBoss { wave: self.wave };
            }

            let plan = self.plan_wave(self.wave, rng);
            log::info!(
                "Wave {}/{}: {} chasers, {} shooters, {} bombers{}",
                self.wave,
                self.total_waves,
                plan.chasers,
                plan.shooters,
                plan.bombers,
                if plan.elite { ", elite" } else { "" }
            );
            return DirectorAction::SpawnWave { wave: self.wave, plan };
        }

        // Boss wave completes through the boss kill, not through clearance
        if self.boss_spawned || self.wave == 0 || hostiles_alive > 0 {
            return DirectorAction::Idle;
        }

        self.clear_pending = true;
        self.next_wave_in = Some(Cooldown::primed(WAVE_DELAY));
        log::info!("Wave {} cleared", self.wave);
        DirectorAction::WaveCleared {
            wave: self.wave,
            orbs: WAVE_CLEAR_ORBS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_first_wave_spawns_immediately() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut d = WaveDirector::new(1.0);
        match d.update(SIM_DT, 0, &mut rng) {
            DirectorAction::SpawnWave { wave, plan } => {
                assert_eq!(wave, 1);
                assert!(plan.total() >= 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(d.update(SIM_DT, 3, &mut rng), DirectorAction::Idle);
    }

    #[test]
    fn test_clear_schedules_next_wave_after_delay() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut d = WaveDirector::new(1.0);
        d.update(SIM_DT, 0, &mut rng);

        assert_eq!(
            d.update(SIM_DT, 0, &mut rng),
            DirectorAction::WaveCleared { wave: 1, orbs: WAVE_CLEAR_ORBS }
        );
        assert!(d.clear_pending);

        // Nothing until the delay elapses
        assert_eq!(d.update(WAVE_DELAY - 0.1, 0, &mut rng), DirectorAction::Idle);
        assert!(matches!(d.update(0.1, 0, &mut rng), DirectorAction::SpawnWave { wave: 2, .. }));
        assert!(!d.clear_pending);
    }

    #[test]
    fn test_next_wave_arrives_on_exact_tick() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut d = WaveDirector::new(1.0);
        d.update(SIM_DT, 0, &mut rng);
        d.update(SIM_DT, 0, &mut rng);

        let ticks = (WAVE_DELAY / SIM_DT).round() as u32;
        for _ in 1..ticks {
            assert_eq!(d.update(SIM_DT, 0, &mut rng), DirectorAction::Idle);
        }
        assert!(matches!(d.update(SIM_DT, 0, &mut rng), DirectorAction::SpawnWave { wave: 2, .. }));
    }

    #[test]
    fn test_final_slot_is_boss() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut d = WaveDirector::new(1.0);
        let mut boss_wave = None;
        for _ in 0..10_000 {
            match d.update(0.1, 0, &mut rng) {
                DirectorAction::SpawnBoss { wave } => {
                    boss_wave = Some(wave);
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(boss_wave, Some(WAVES_PER_ENCOUNTER));
        // No clear bursts while the boss wave runs
        assert_eq!(d.update(0.1, 0, &mut rng), DirectorAction::Idle);
    }

    #[test]
    fn test_counts_scale_with_wave_and_multiplier() {
        let mut rng = Pcg32::seed_from_u64(4);
        let easy = WaveDirector::new(1.0);
        let hard = WaveDirector::new(1.7);
        let a = easy.plan_wave(1, &mut rng);
        let b = easy.plan_wave(3, &mut rng);
        let c = hard.plan_wave(3, &mut rng);
        assert!(b.chasers + b.shooters + b.bombers > a.chasers + a.shooters + a.bombers);
        assert!(c.chasers + c.shooters + c.bombers > b.chasers + b.shooters + b.bombers);
    }
}
