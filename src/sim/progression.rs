//! Experience curve and the perk pool
//!
//! Perks are a closed set of tagged variants, each an explicit transform over
//! `AvatarStats`. Taking the same perk again compounds its effect.

use rand::Rng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use super::avatar::AvatarStats;

/// Perks offered per level-up
pub const PERK_OFFER: usize = 3;

/// Experience needed to go from `level` to `level + 1`
pub fn xp_to_next(level: u32) -> u32 {
    5 + 3 * level.saturating_sub(1)
}

/// Available perks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perk {
    /// Fire cooldown x0.8
    FireRate,
    /// Damage x1.25
    Damage,
    /// Move speed x1.1
    Swiftness,
    /// +1 pierce
    Piercing,
    /// +8% crit chance
    Precision,
    /// +2 max hp, heal 2
    Vitality,
    /// Spread shot; again: +2 pellets
    SpreadShot,
    /// Burn on hit; again: +1 burn damage
    Incendiary,
    /// Slow on hit; again: slowed speed x0.8
    Frost,
    /// Regeneration; again: interval x0.75
    Regeneration,
    /// Magnet radius x1.5
    Magnet,
    /// +1 shield charge
    Shield,
    /// Dash cooldown x0.8
    DashMastery,
}

/// The fixed pool perks are drawn from
pub const PERK_POOL: [Perk; 13] = [
    Perk::FireRate,
    Perk::Damage,
    Perk::Swiftness,
    Perk::Piercing,
    Perk::Precision,
    Perk::Vitality,
    Perk::SpreadShot,
    Perk::Incendiary,
    Perk::Frost,
    Perk::Regeneration,
    Perk::Magnet,
    Perk::Shield,
    Perk::DashMastery,
];

impl Perk {
    pub fn name(self) -> &'static str {
        match self {
            Perk::FireRate => "Fire Rate +20%",
            Perk::Damage => "Damage +25%",
            Perk::Swiftness => "Swiftness",
            Perk::Piercing => "Piercing Rounds",
            Perk::Precision => "Precision",
            Perk::Vitality => "Vitality",
            Perk::SpreadShot => "Spread Shot",
            Perk::Incendiary => "Incendiary",
            Perk::Frost => "Frost Touch",
            Perk::Regeneration => "Regeneration",
            Perk::Magnet => "Magnet",
            Perk::Shield => "Aegis",
            Perk::DashMastery => "Dash Mastery",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Perk::FireRate => "Shoot 20% faster",
            Perk::Damage => "Shots deal 25% more damage",
            Perk::Swiftness => "Move 10% faster",
            Perk::Piercing => "Shots pass through one more enemy",
            Perk::Precision => "+8% critical hit chance",
            Perk::Vitality => "+2 max health and heal 2",
            Perk::SpreadShot => "Fire a cone of pellets (more pellets if taken again)",
            Perk::Incendiary => "Hits set enemies on fire (hotter if taken again)",
            Perk::Frost => "Hits slow enemies (colder if taken again)",
            Perk::Regeneration => "Slowly regenerate health (faster if taken again)",
            Perk::Magnet => "Pull experience from 50% further away",
            Perk::Shield => "Gain a shield charge that blocks one hit",
            Perk::DashMastery => "Dash recharges 20% faster",
        }
    }

    /// Apply this perk's transform to a stat record
    pub fn apply(self, stats: &mut AvatarStats) {
        match self {
            Perk::FireRate => stats.fire_cooldown *= 0.8,
            Perk::Damage => stats.damage *= 1.25,
            Perk::Swiftness => stats.speed *= 1.1,
            Perk::Piercing => stats.pierce += 1,
            Perk::Precision => stats.crit_chance = (stats.crit_chance + 0.08).min(1.0),
            Perk::Vitality => {
                stats.hp_max += 2.0;
                stats.hp = (stats.hp + 2.0).min(stats.hp_max);
            }
            Perk::SpreadShot => {
                if stats.has_spread {
                    stats.spread_pellets += 2;
                }
                stats.has_spread = true;
            }
            Perk::Incendiary => {
                if stats.burn_on_hit {
                    stats.burn_damage += 1.0;
                }
                stats.burn_on_hit = true;
            }
            Perk::Frost => {
                if stats.slow_on_hit {
                    stats.slow_factor *= 0.8;
                }
                stats.slow_on_hit = true;
            }
            Perk::Regeneration => {
                if stats.regen_on {
                    stats.regen_interval *= 0.75;
                }
                stats.regen_on = true;
            }
            Perk::Magnet => stats.magnet_radius *= 1.5,
            Perk::Shield => stats.shield += 1,
            Perk::DashMastery => stats.dash_cooldown *= 0.8,
        }
    }
}

/// Draw `PERK_OFFER` distinct perks from the pool
pub fn draw_offer(rng: &mut impl Rng) -> Vec<Perk> {
    sample(rng, PERK_POOL.len(), PERK_OFFER)
        .into_iter()
        .map(|i| PERK_POOL[i])
        .collect()
}

/// Add experience. Returns true if the threshold for the next level is met.
pub fn gain_xp(stats: &mut AvatarStats, amount: u32) -> bool {
    stats.xp += amount;
    stats.xp >= xp_to_next(stats.level)
}

/// Consume one level's worth of experience. Leftover carries over.
/// Returns the new level, or None if not enough experience.
pub fn level_up(stats: &mut AvatarStats) -> Option<u32> {
    let need = xp_to_next(stats.level);
    if stats.xp < need {
        return None;
    }
    stats.xp -= need;
    stats.level += 1;
    Some(stats.level)
}
