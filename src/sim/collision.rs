//! Collision and damage resolution
//!
//! Runs once per tick after every movement/AI step, in a fixed pass order:
//!
//! 1. avatar projectiles vs hostiles (then the hostile death sweep)
//! 2. avatar projectiles vs boss
//! 3. hostile projectiles vs avatar
//! 4. avatar vs hostile contact
//! 5. avatar vs boss contact
//! 6. avatar vs pickups
//!
//! Each pass reads first and applies structural changes (removals, drops)
//! afterwards, so nothing is processed twice within a tick.

use glam::Vec2;
use rand::Rng;

use super::avatar::HitOutcome;
use super::hostile::Hostile;
use super::pickup::{HEALTH_RESTORE, Pickup, PickupKind};
use super::progression::gain_xp;
use super::projectile::Owner;
use super::state::{BOSS_ID, GameEvent, GamePhase, GameState, ParticleKind};
use crate::consts::*;
use crate::{circles_overlap, clamp_to_arena, direction_or_up};

/// Run all six passes. Stops early once the run or encounter ends.
pub fn resolve_collisions(state: &mut GameState) {
    let mut spent = vec![false; state.projectiles.len()];

    avatar_shots_vs_hostiles(state, &mut spent);
    sweep_dead_hostiles(state);
    let boss_down = avatar_shots_vs_boss(state, &mut spent);
    if boss_down {
        drop_spent(state, &spent);
        finish_encounter(state);
        return;
    }

    let lethal = hostile_shots_vs_avatar(state, &mut spent);
    drop_spent(state, &spent);
    if lethal || contact_hostiles(state) || contact_boss(state) {
        defeat(state);
        return;
    }

    collect_pickups(state);
}

/// Melee swing: fixed damage plus on-hit status to every hostile in reach,
/// and to the boss. Deaths are handled by the next sweep.
pub fn melee_strike(state: &mut GameState) {
    let damage = state.avatar.stats.melee_damage;
    let status = state.avatar.stats.on_hit_status();
    let mut struck = Vec::new();

    for hostile in state.hostiles.iter_mut().filter(|h| !h.dead()) {
        if state.avatar.in_melee_range(hostile.pos, hostile.radius) {
            hostile.hp -= damage;
            if !status.is_empty() {
                hostile.status.apply(&status);
            }
            struck.push(hostile.pos);
        }
    }

    if let Some(boss) = state.boss.as_mut().filter(|b| !b.dead()) {
        if state.avatar.in_melee_range(boss.pos, boss.radius) {
            boss.hp -= damage;
            state.score += SCORE_BOSS_MELEE;
            struck.push(boss.pos);
        }
    }

    for pos in struck {
        state.spawn_particles(pos, ParticleKind::Hit, 6, 120.0);
    }
}

fn drop_spent(state: &mut GameState, spent: &[bool]) {
    let mut i = 0;
    state.projectiles.retain(|_| {
        let keep = !spent.get(i).copied().unwrap_or(false);
        i += 1;
        keep
    });
}

/// Pass 1: damage from all simultaneous hits on a hostile is summed, each hit
/// crit-rolled on its own.
fn avatar_shots_vs_hostiles(state: &mut GameState, spent: &mut [bool]) {
    let status = state.avatar.stats.on_hit_status();
    let mut impacts = Vec::new();

    for hostile in state.hostiles.iter_mut() {
        if hostile.dead() {
            continue;
        }
        let mut total = 0.0;
        for (i, p) in state.projectiles.iter_mut().enumerate() {
            if spent[i] || p.owner != Owner::Avatar || p.has_struck(hostile.id) {
                continue;
            }
            if !circles_overlap(p.pos, p.radius, hostile.pos, hostile.radius) {
                continue;
            }
            total += state.avatar.roll_hit_damage(p.damage, p.pellet, &mut state.rng);
            spent[i] = p.register_hit(hostile.id);
            impacts.push(p.pos);
        }
        if total > 0.0 {
            hostile.hp -= total;
            if !status.is_empty() {
                hostile.status.apply(&status);
            }
        }
    }

    for pos in impacts {
        state.spawn_particles(pos, ParticleKind::Hit, 4, 90.0);
    }
}

/// Remove every hostile at or below zero hp (shots, melee or burn) and run
/// death processing for each.
pub fn sweep_dead_hostiles(state: &mut GameState) {
    if !state.hostiles.iter().any(Hostile::dead) {
        return;
    }
    let (dead, alive): (Vec<_>, Vec<_>) =
        std::mem::take(&mut state.hostiles).into_iter().partition(Hostile::dead);
    state.hostiles = alive;

    for hostile in dead {
        state.score += SCORE_HOSTILE_KILL * u64::from(state.avatar.combo);

        let dropped_orb = state.rng.random_bool(ORB_DROP_CHANCE);
        if dropped_orb {
            state.pickups.push(Pickup::orb(hostile.pos, Vec2::ZERO));
        }
        if state.rng.random_bool(PICKUP_DROP_CHANCE) {
            let kind = if state.rng.random_bool(0.6) {
                PickupKind::Health
            } else {
                PickupKind::Shield
            };
            state.pickups.push(Pickup::item(kind, hostile.pos));
        }

        log::debug!("Hostile {} ({}) destroyed", hostile.id, hostile.kind.tag());
        state.spawn_particles(hostile.pos, ParticleKind::Death, 12, 160.0);
        state.emit(GameEvent::HostileKilled {
            id: hostile.id,
            kind: hostile.kind,
            dropped_orb,
        });
    }
}

/// Pass 2. Returns true if the boss died this tick.
fn avatar_shots_vs_boss(state: &mut GameState, spent: &mut [bool]) -> bool {
    let Some(boss) = state.boss.as_mut() else {
        return false;
    };

    let mut total = 0.0;
    let mut hits = 0u64;
    for (i, p) in state.projectiles.iter_mut().enumerate() {
        if spent[i] || p.owner != Owner::Avatar || p.has_struck(BOSS_ID) {
            continue;
        }
        if !circles_overlap(p.pos, p.radius, boss.pos, boss.radius) {
            continue;
        }
        total += state.avatar.roll_hit_damage(p.damage, p.pellet, &mut state.rng);
        spent[i] = p.register_hit(BOSS_ID);
        hits += 1;
    }

    if hits > 0 {
        boss.hp -= total;
        state.avatar.register_combo_hit();
        state.score += SCORE_BOSS_HIT * u64::from(state.avatar.combo) * hits;
    }

    if boss.dead() {
        return true;
    }

    // Melee or shots may have pushed it over the threshold
    if let Some(phase) = boss.update_phase() {
        let pos = boss.pos;
        state.emit(GameEvent::BossPhaseChanged { phase: phase.number() });
        state.spawn_particles(pos, ParticleKind::Burst, 24, 220.0);
    }
    false
}

/// Pass 3. Every overlapping hostile shot is consumed. Returns true on a
/// lethal hit.
fn hostile_shots_vs_avatar(state: &mut GameState, spent: &mut [bool]) -> bool {
    let incoming: Vec<(usize, f32)> = state
        .projectiles
        .iter()
        .enumerate()
        .filter(|(i, p)| !spent[*i] && p.owner == Owner::Hostile)
        .filter(|(_, p)| circles_overlap(p.pos, p.radius, state.avatar.pos, state.avatar.radius))
        .map(|(i, p)| (i, p.damage))
        .collect();

    for (i, damage) in incoming {
        spent[i] = true;
        let outcome = state.avatar.take_hit(damage);
        report_hit(state, outcome);
        if !state.avatar.alive() {
            return true;
        }
    }
    false
}

/// Pass 4. At most one contact hit per tick. Returns true on a lethal hit.
fn contact_hostiles(state: &mut GameState) -> bool {
    if state.avatar.invulnerable() {
        return false;
    }
    let touching = state
        .hostiles
        .iter()
        .find(|h| circles_overlap(state.avatar.pos, state.avatar.radius, h.pos, h.radius))
        .map(|h| h.pos);
    let Some(hostile_pos) = touching else {
        return false;
    };

    let outcome = state.avatar.take_hit(CONTACT_DAMAGE);
    if outcome.landed() {
        let avatar = &mut state.avatar;
        avatar.invuln.extend(CONTACT_GRACE);
        let away = direction_or_up(avatar.pos - hostile_pos);
        avatar.pos = clamp_to_arena(avatar.pos + away * KNOCKBACK_DISTANCE, avatar.radius);
    }
    report_hit(state, outcome);
    !state.avatar.alive()
}

/// Pass 5. Same as contact with a hostile, minus the knockback.
fn contact_boss(state: &mut GameState) -> bool {
    if state.avatar.invulnerable() {
        return false;
    }
    let touching = state
        .boss
        .as_ref()
        .is_some_and(|b| circles_overlap(state.avatar.pos, state.avatar.radius, b.pos, b.radius));
    if !touching {
        return false;
    }

    let outcome = state.avatar.take_hit(CONTACT_DAMAGE);
    if outcome.landed() {
        state.avatar.invuln.extend(CONTACT_GRACE);
    }
    report_hit(state, outcome);
    !state.avatar.alive()
}

/// Pass 6. Level-up is checked by the tick once all passes are done.
fn collect_pickups(state: &mut GameState) {
    let (taken, left): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pickups)
        .into_iter()
        .partition(|p| circles_overlap(p.pos, p.radius, state.avatar.pos, state.avatar.radius));
    state.pickups = left;

    for pickup in taken {
        match pickup.kind {
            PickupKind::Xp => {
                gain_xp(&mut state.avatar.stats, ORB_XP);
            }
            PickupKind::Health => state.avatar.heal(HEALTH_RESTORE),
            PickupKind::Shield => state.avatar.stats.shield += 1,
        }
    }
}

fn report_hit(state: &mut GameState, outcome: HitOutcome) {
    if outcome.landed() {
        let hp = state.avatar.display_hp();
        let pos = state.avatar.pos;
        state.emit(GameEvent::AvatarHit {
            hp,
            absorbed: outcome == HitOutcome::Absorbed,
        });
        state.spawn_particles(pos, ParticleKind::Hit, 8, 140.0);
    }
}

/// Boss death: score, feedback, then advance or win
fn finish_encounter(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    let awarded = SCORE_BOSS_KILL * u64::from(state.avatar.combo);
    state.score += awarded;
    state.spawn_particles(boss.pos, ParticleKind::Death, 48, 260.0);
    state.emit(GameEvent::BossDefeated { score_awarded: awarded });

    if state.is_final_encounter() {
        log::info!("Victory! score {} in {:.1}s", state.score, state.elapsed);
        state.phase = GamePhase::Victory;
        state.emit(GameEvent::Victory {
            score: state.score,
            elapsed: state.elapsed,
            ticks: state.time_ticks,
        });
    } else {
        log::info!("Encounter {} complete, score {}", state.encounter + 1, state.score);
        state.phase = GamePhase::EncounterComplete;
        let carryover = state.carryover();
        state.emit(GameEvent::AdvanceEncounter { carryover });
    }
}

fn defeat(state: &mut GameState) {
    log::info!("Defeat: score {} after {:.1}s", state.score, state.elapsed);
    state.phase = GamePhase::Defeat;
    state.emit(GameEvent::Defeat {
        score: state.score,
        elapsed: state.elapsed,
        ticks: state.time_ticks,
    });
}
