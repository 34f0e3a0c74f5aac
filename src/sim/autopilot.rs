//! Idle/demo mode AI
//!
//! Builds a `TickInput` from the current state: aim at the nearest target and
//! keep firing, dash out of incoming fire, step out of telegraph zones, grab
//! pickups when nothing is close, and take the first perk offered.

use glam::Vec2;

use super::projectile::Owner;
use super::state::{GamePhase, GameState};
use super::tick::TickInput;
use crate::direction_or_up;

/// Hostile shots closer than this trigger evasion
const THREAT_RADIUS: f32 = 70.0;
/// Preferred minimum distance to hostiles
const COMFORT_RADIUS: f32 = 140.0;
/// Nothing within this radius means pickups are safe to chase
const SAFE_RADIUS: f32 = 160.0;

/// Produce the autopilot's input for this tick. Meta triggers (pause,
/// restart, menu) from the real input are passed through.
pub fn drive(state: &GameState, input: &TickInput) -> TickInput {
    let mut out = TickInput {
        pause: input.pause,
        restart: input.restart,
        menu: input.menu,
        autopilot: true,
        ..Default::default()
    };

    if state.phase == GamePhase::PerkDraft {
        out.perk_choice = Some(0);
        return out;
    }

    let me = state.avatar.pos;

    // Nearest target: hostiles, then the boss
    let target = state
        .hostiles
        .iter()
        .map(|h| (h.pos, h.radius))
        .chain(state.boss.iter().map(|b| (b.pos, b.radius)))
        .min_by(|a, b| {
            a.0.distance_squared(me)
                .partial_cmp(&b.0.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some((pos, radius)) = target {
        out.aim = Some(pos);
        out.fire = true;
        out.melee = state.avatar.in_melee_range(pos, radius);
    }

    // Closest incoming hostile shot
    let threat = state
        .projectiles
        .iter()
        .filter(|p| p.owner == Owner::Hostile)
        .filter(|p| p.pos.distance(me) < THREAT_RADIUS && p.vel.dot(me - p.pos) > 0.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(me)
                .partial_cmp(&b.pos.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut heading = Vec2::ZERO;

    if let Some(shot) = threat {
        // Sidestep perpendicular to the shot, away from its line
        let side = direction_or_up(shot.vel).perp();
        let away = if side.dot(me - shot.pos) >= 0.0 { side } else { -side };
        heading += away * 2.0;
        out.dash = state.avatar.dash_cd.ready();
    }

    // Step out of pending danger zones
    for t in &state.telegraphs {
        let d = me.distance(t.pos);
        if d < t.radius + state.avatar.radius {
            heading += direction_or_up(me - t.pos) * 1.5;
        }
    }

    let nearest_hostile = state
        .hostiles
        .iter()
        .map(|h| h.pos.distance(me) - h.radius)
        .fold(f32::INFINITY, f32::min);

    if nearest_hostile < COMFORT_RADIUS {
        if let Some((pos, _)) = target {
            heading += direction_or_up(me - pos);
        }
    } else if threat.is_none() && nearest_hostile > SAFE_RADIUS {
        let pickup = state.pickups.iter().min_by(|a, b| {
            a.pos
                .distance_squared(me)
                .partial_cmp(&b.pos.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(p) = pickup {
            heading += direction_or_up(p.pos - me);
        }
    }

    // Gentle strafe so the avatar doesn't stand still
    if heading == Vec2::ZERO {
        let t = state.time_ticks as f32 * 0.01;
        heading.x = t.sin() + (t * 0.7).sin() * 0.5;
    }

    out.right = heading.x > 0.3;
    out.left = heading.x < -0.3;
    out.up = heading.y > 0.3;
    out.down = heading.y < -0.3;
    out
}
