//! Read-only render snapshot
//!
//! Everything a renderer or HUD needs for one frame, with hp clamped to zero.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pickup::PickupKind;
use super::progression::xp_to_next;
use super::projectile::Owner;
use super::state::{GamePhase, GameState, ParticleKind};
use super::telegraph::TelegraphKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarView {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub aim: Vec2,
    pub shield: u32,
    pub dashing: bool,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostileView {
    pub id: u32,
    pub tag: String,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub burning: bool,
    pub slowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub phase: u8,
    pub giant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegraphView {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: TelegraphKind,
    /// 0 when queued, 1 when about to burst
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PickupKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub kind: ParticleKind,
    pub life: f32,
    pub size: f32,
}

/// HUD scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_needed: u32,
    pub wave: u32,
    pub total_waves: u32,
    pub encounter: u32,
    pub dash_ready: bool,
    pub combo: u32,
    pub elapsed: f32,
}

/// One frame of render state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub avatar: AvatarView,
    pub hostiles: Vec<HostileView>,
    pub boss: Option<BossView>,
    pub telegraphs: Vec<TelegraphView>,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub particles: Vec<ParticleView>,
    pub hud: Hud,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let avatar = &state.avatar;
        Self {
            phase: state.phase,
            avatar: AvatarView {
                pos: avatar.pos,
                radius: avatar.radius,
                hp: avatar.display_hp(),
                hp_max: avatar.stats.hp_max,
                aim: avatar.aim,
                shield: avatar.stats.shield,
                dashing: avatar.dashing(),
                invulnerable: avatar.invulnerable(),
            },
            hostiles: state
                .hostiles
                .iter()
                .map(|h| HostileView {
                    id: h.id,
                    tag: h.kind.tag().to_string(),
                    pos: h.pos,
                    radius: h.radius,
                    hp: h.display_hp(),
                    hp_max: h.hp_max,
                    burning: h.status.burning(),
                    slowed: h.status.slowed(),
                })
                .collect(),
            boss: state.boss.as_ref().map(|b| BossView {
                pos: b.pos,
                radius: b.radius,
                hp: b.display_hp(),
                hp_max: b.hp_max,
                phase: b.phase.number(),
                giant: b.giant,
            }),
            telegraphs: state
                .telegraphs
                .iter()
                .map(|t| TelegraphView {
                    pos: t.pos,
                    radius: t.radius,
                    kind: t.kind,
                    progress: t.progress(),
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.pos,
                    radius: p.radius,
                    owner: p.owner,
                })
                .collect(),
            pickups: state
                .pickups
                .iter()
                .map(|p| PickupView {
                    pos: p.pos,
                    radius: p.radius,
                    kind: p.kind,
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    kind: p.kind,
                    life: p.life,
                    size: p.size,
                })
                .collect(),
            hud: Hud {
                score: state.score,
                level: avatar.stats.level,
                xp: avatar.stats.xp,
                xp_needed: xp_to_next(avatar.stats.level),
                wave: state.director.wave,
                total_waves: state.director.total_waves,
                encounter: state.encounter,
                dash_ready: avatar.dash_cd.ready(),
                combo: avatar.combo,
                elapsed: state.elapsed,
            },
        }
    }

    /// Serialize for an out-of-process renderer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
