//! Fixed timestep simulation tick
//!
//! Core game loop that advances one encounter deterministically. Order within
//! a tick: timers, movement, actions, hostile/boss behavior, telegraphs,
//! integration, collision resolution, wave director, cleanup, level-up.

use glam::Vec2;
use rand::Rng;

use super::autopilot;
use super::collision::{melee_strike, resolve_collisions};
use super::director::DirectorAction;
use super::hostile::HostileKind;
use super::progression::{draw_offer, level_up};
use super::state::{GameEvent, GamePhase, GameState, ParticleKind};
use super::telegraph::resolve_telegraphs;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Primary fire held
    pub fire: bool,
    /// Aim target in arena coordinates
    pub aim: Option<Vec2>,
    pub dash: bool,
    pub melee: bool,
    /// Pause toggle
    pub pause: bool,
    pub restart: bool,
    /// Return to menu (discards the session)
    pub menu: bool,
    /// Index into the current perk offer
    pub perk_choice: Option<usize>,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

impl TickInput {
    /// Movement axes from the four direction flags (y points up)
    pub fn axes(&self) -> (f32, f32) {
        let x = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        let y = f32::from(u8::from(self.up)) - f32::from(u8::from(self.down));
        (x, y)
    }

    /// Clear one-shot triggers after they have been consumed
    pub fn clear_triggers(&mut self) {
        self.dash = false;
        self.melee = false;
        self.pause = false;
        self.restart = false;
        self.menu = false;
        self.perk_choice = None;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.restart {
        state.restart();
        state.emit(GameEvent::Restarted);
        return;
    }
    if input.menu {
        state.restart();
        state.emit(GameEvent::ReturnToMenu);
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Intro => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = if state.intro_t > 0.0 {
                    GamePhase::Intro
                } else {
                    GamePhase::Playing
                };
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    let input = if input.autopilot || state.settings.autopilot {
        autopilot::drive(state, input)
    } else {
        input.clone()
    };

    if state.phase == GamePhase::PerkDraft {
        if let Some(choice) = input.perk_choice {
            choose_perk(state, choice);
        }
        return;
    }

    // Don't tick if paused, waiting on a screen, or the run is over
    match state.phase {
        GamePhase::Intro | GamePhase::Playing => {}
        _ => return,
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    if state.phase == GamePhase::Intro {
        // Cooldowns keep running through the freeze; nothing moves or fires
        state.avatar.update_timers(dt);
        state.intro_t -= dt;
        update_particles(state, dt);
        if state.intro_t <= 0.0 {
            state.intro_t = 0.0;
            state.phase = GamePhase::Playing;
        }
        return;
    }

    // Timers
    state.avatar.update_timers(dt);

    // Movement
    if let Some(target) = input.aim {
        state.avatar.aim_at(target);
    }
    let (ax, ay) = input.axes();
    state.avatar.move_axes(ax, ay, dt);

    // Actions
    if input.dash && state.avatar.dash() {
        let pos = state.avatar.pos;
        state.spawn_particles(pos, ParticleKind::Dash, 8, 60.0);
    }
    if input.fire {
        let shots = state.avatar.shoot();
        state.projectiles.extend(shots);
    }
    if input.melee && state.avatar.try_melee() {
        melee_strike(state);
    }

    // Hostile behavior: status first, then steering
    let avatar_pos = state.avatar.pos;
    for hostile in state.hostiles.iter_mut() {
        hostile.update_status(dt);
    }
    let mut queued = Vec::new();
    for hostile in state.hostiles.iter_mut().filter(|h| !h.dead()) {
        if let Some(t) = hostile.step(avatar_pos, dt, &mut state.rng) {
            queued.push(t);
        }
    }
    state.telegraphs.extend(queued);

    step_boss(state, avatar_pos, dt);

    // Telegraph countdown and release
    let released = resolve_telegraphs(&mut state.telegraphs, dt);
    state.projectiles.extend(released);

    // Integration
    for p in state.projectiles.iter_mut() {
        p.integrate(dt);
    }
    let magnet = state.avatar.stats.magnet_radius;
    for pickup in state.pickups.iter_mut() {
        pickup.drift(avatar_pos, magnet, dt);
    }

    resolve_collisions(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    run_director(state, dt);

    // Cleanup
    state.projectiles.retain(|p| !p.out_of_bounds());
    state.pickups.retain(|p| !p.expired());
    update_particles(state, dt);

    check_level_up(state);
}

fn step_boss(state: &mut GameState, avatar_pos: Vec2, dt: f32) {
    let hostile_count = state.hostiles.len();
    let Some(boss) = state.boss.as_mut().filter(|b| !b.dead()) else {
        return;
    };
    let actions = boss.step(avatar_pos, dt, hostile_count, &mut state.rng);
    let boss_pos = boss.pos;

    state.projectiles.extend(actions.projectiles);
    state.telegraphs.extend(actions.telegraphs);

    for _ in 0..actions.reinforcements {
        let offset = Vec2::new(state.rng.random_range(-60.0..60.0), -40.0);
        let id = state.spawn_hostile(HostileKind::Chaser { elite: false }, boss_pos + offset);
        log::debug!("Boss reinforcement {}", id);
    }
    if let Some((from, _)) = actions.dash {
        state.spawn_particles(from, ParticleKind::Dash, 16, 200.0);
    }
}

fn run_director(state: &mut GameState, dt: f32) {
    let hostiles = state.hostiles.len();
    match state.director.update(dt, hostiles, &mut state.rng) {
        DirectorAction::Idle => {}
        DirectorAction::SpawnWave { wave, plan } => {
            state.spawn_wave(&plan);
            state.normalize_order();
            state.emit(GameEvent::WaveStarted {
                wave,
                total: state.director.total_waves,
            });
        }
        DirectorAction::SpawnBoss { wave } => {
            state.spawn_boss();
            state.emit(GameEvent::WaveStarted {
                wave,
                total: state.director.total_waves,
            });
        }
        DirectorAction::WaveCleared { wave, orbs } => {
            let center = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
            state.scatter_orbs(center, orbs, 120.0);
            state.emit(GameEvent::WaveCleared { wave, orbs });
        }
    }
}

/// Consume one level's worth of experience and open the perk draft
fn check_level_up(state: &mut GameState) {
    let Some(level) = level_up(&mut state.avatar.stats) else {
        return;
    };
    log::info!("Level up! now level {}", level);
    state.emit(GameEvent::LevelUp { level });

    let offer = draw_offer(&mut state.rng);
    state.emit(GameEvent::PerkDraft { perks: offer.clone() });
    state.perk_offer = offer;
    state.phase = GamePhase::PerkDraft;
}

/// Apply the chosen perk and resume (or open the next draft if more
/// experience is banked)
fn choose_perk(state: &mut GameState, choice: usize) {
    let Some(&perk) = state.perk_offer.get(choice) else {
        log::warn!("Perk choice {} out of range ({} offered)", choice, state.perk_offer.len());
        return;
    };
    perk.apply(&mut state.avatar.stats);
    state.avatar.sync_timers();
    state.perk_offer.clear();
    log::info!("Perk chosen: {}", perk.name());
    state.emit(GameEvent::PerkChosen { perk });

    state.phase = GamePhase::Playing;
    check_level_up(state);
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel *= 0.92;
        particle.life -= dt * 2.0;
        particle.size *= 0.99;
    }
    state.particles.retain(|p| p.life > 0.0);
}
