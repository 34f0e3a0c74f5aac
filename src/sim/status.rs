//! Per-hostile slow/burn tracking
//!
//! Timers extend to the fixed duration instead of stacking. Burn damage is
//! delivered through a callback on a fixed cadence, independent of collisions.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Status payload carried by an avatar hit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OnHitStatus {
    /// Burn damage per tick, if the hit ignites
    pub burn: Option<f32>,
    /// Speed factor while slowed, if the hit chills
    pub slow: Option<f32>,
}

impl OnHitStatus {
    pub fn is_empty(&self) -> bool {
        self.burn.is_none() && self.slow.is_none()
    }
}

/// Slow and burn timers for one hostile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub slow_t: f32,
    pub burn_t: f32,
    /// Time until the next burn damage tick
    pub burn_tick: f32,
    /// Movement multiplier while slowed
    pub slow_factor: f32,
    pub burn_damage: f32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            slow_t: 0.0,
            burn_t: 0.0,
            burn_tick: BURN_TICK,
            slow_factor: SLOW_FACTOR,
            burn_damage: BURN_DAMAGE,
        }
    }
}

impl StatusEffects {
    /// Extend burn and/or slow to their fixed durations (max, not sum)
    pub fn apply(&mut self, status: &OnHitStatus) {
        if let Some(damage) = status.burn {
            if self.burn_t <= 0.0 {
                self.burn_tick = BURN_TICK;
            }
            self.burn_t = self.burn_t.max(BURN_DURATION);
            self.burn_damage = self.burn_damage.max(damage);
        }
        if let Some(factor) = status.slow {
            self.slow_factor = if self.slowed() {
                self.slow_factor.min(factor)
            } else {
                factor
            };
            self.slow_t = self.slow_t.max(SLOW_DURATION);
        }
    }

    /// Count both timers down, calling `on_burn_tick` with the burn damage
    /// each time the burn cadence elapses
    pub fn update(&mut self, dt: f32, mut on_burn_tick: impl FnMut(f32)) {
        if self.slow_t > 0.0 {
            self.slow_t = (self.slow_t - dt).max(0.0);
            if self.slow_t == 0.0 {
                self.slow_factor = SLOW_FACTOR;
            }
        }

        if self.burn_t > 0.0 {
            // Only the portion of dt spent burning can produce ticks
            let burning = dt.min(self.burn_t);
            self.burn_t = (self.burn_t - dt).max(0.0);
            self.burn_tick -= burning;
            while self.burn_tick <= 0.0 {
                on_burn_tick(self.burn_damage);
                self.burn_tick += BURN_TICK;
            }
            if self.burn_t == 0.0 {
                self.burn_tick = BURN_TICK;
                self.burn_damage = BURN_DAMAGE;
            }
        }
    }

    #[inline]
    pub fn slowed(&self) -> bool {
        self.slow_t > 0.0
    }

    #[inline]
    pub fn burning(&self) -> bool {
        self.burn_t > 0.0
    }

    /// Movement multiplier for this tick
    pub fn speed_factor(&self) -> f32 {
        if self.slowed() { self.slow_factor } else { 1.0 }
    }
}
