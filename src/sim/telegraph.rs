//! Telegraphed area attacks
//!
//! A telegraph is a warning circle that resolves into a ring of projectiles
//! once its countdown crosses zero. It resolves exactly once and is then
//! dropped from the pending list by the caller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Projectile, ring_burst};
use super::timer::TIME_EPSILON;

/// Burst shape of a telegraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelegraphKind {
    Ring,
    BigRing,
}

impl TelegraphKind {
    /// Warning circle radius
    pub fn radius(self) -> f32 {
        match self {
            TelegraphKind::Ring => 40.0,
            TelegraphKind::BigRing => 70.0,
        }
    }

    /// Countdown before the burst
    pub fn delay(self) -> f32 {
        match self {
            TelegraphKind::Ring => 0.9,
            TelegraphKind::BigRing => 1.2,
        }
    }

    /// Projectiles in the burst
    pub fn burst_count(self) -> u32 {
        match self {
            TelegraphKind::Ring => 8,
            TelegraphKind::BigRing => 14,
        }
    }

    pub fn burst_speed(self) -> f32 {
        match self {
            TelegraphKind::Ring => 220.0,
            TelegraphKind::BigRing => 180.0,
        }
    }
}

/// What queued the telegraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelegraphSource {
    Bomber(u32),
    Boss,
}

/// A pending warning zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telegraph {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: TelegraphKind,
    pub source: TelegraphSource,
    /// Initial countdown, kept for the render fraction
    pub delay: f32,
    pub time_left: f32,
}

impl Telegraph {
    pub fn new(pos: Vec2, kind: TelegraphKind, source: TelegraphSource) -> Self {
        Self::with_radius(pos, kind, source, kind.radius())
    }

    /// Telegraph with a custom warning radius (giant boss)
    pub fn with_radius(pos: Vec2, kind: TelegraphKind, source: TelegraphSource, radius: f32) -> Self {
        Self {
            pos,
            radius,
            kind,
            source,
            delay: kind.delay(),
            time_left: kind.delay(),
        }
    }

    /// Count down. Returns true on the tick the countdown reaches zero.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.time_left -= dt;
        self.time_left < TIME_EPSILON
    }

    /// Projectiles released when this telegraph fires
    pub fn burst(&self) -> Vec<Projectile> {
        ring_burst(self.pos, self.kind.burst_count(), self.kind.burst_speed(), 0.0)
    }

    /// Elapsed fraction of the countdown, for danger-zone rendering
    pub fn progress(&self) -> f32 {
        if self.delay <= 0.0 {
            1.0
        } else {
            (1.0 - self.time_left / self.delay).clamp(0.0, 1.0)
        }
    }
}

/// Advance every pending telegraph, returning the bursts of those that fired.
/// Fired telegraphs are removed; nothing is resolved twice.
pub fn resolve_telegraphs(pending: &mut Vec<Telegraph>, dt: f32) -> Vec<Projectile> {
    let mut released = Vec::new();
    pending.retain_mut(|t| {
        if t.advance(dt) {
            log::debug!("Telegraph {:?} fired at {:?}", t.kind, t.pos);
            released.extend(t.burst());
            false
        } else {
            true
        }
    });
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolves_once_at_zero() {
        let mut pending = vec![Telegraph::new(Vec2::new(300.0, 300.0), TelegraphKind::Ring, TelegraphSource::Boss)];

        // 0.9s delay at 0.25s steps: fires on the 4th step
        for _ in 0..3 {
            assert!(resolve_telegraphs(&mut pending, 0.25).is_empty());
            assert_eq!(pending.len(), 1);
        }
        let burst = resolve_telegraphs(&mut pending, 0.25);
        assert_eq!(burst.len(), TelegraphKind::Ring.burst_count() as usize);
        assert!(pending.is_empty());
        assert!(resolve_telegraphs(&mut pending, 0.25).is_empty());
    }

    #[test]
    fn test_fires_on_exact_tick_at_sim_rate() {
        let dt = 1.0 / 60.0;
        let mut pending = vec![Telegraph::new(Vec2::new(300.0, 300.0), TelegraphKind::Ring, TelegraphSource::Bomber(2))];
        let mut fired_on = None;
        for tick in 1..=60 {
            if !resolve_telegraphs(&mut pending, dt).is_empty() {
                fired_on = Some(tick);
                break;
            }
        }
        assert_eq!(fired_on, Some(54));
    }

    #[test]
    fn test_progress_fraction() {
        let mut t = Telegraph::new(Vec2::ZERO, TelegraphKind::BigRing, TelegraphSource::Boss);
        assert_eq!(t.progress(), 0.0);
        t.advance(0.6);
        assert!((t.progress() - 0.5).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_exactly_one_burst(steps in proptest::collection::vec(0.001f32..0.2, 1..400)) {
            let kind = TelegraphKind::BigRing;
            let mut pending = vec![Telegraph::new(Vec2::new(100.0, 100.0), kind, TelegraphSource::Boss)];
            let mut bursts = 0;
            let mut elapsed = 0.0f32;
            let mut fired_at = None;
            for dt in steps {
                elapsed += dt;
                let released = resolve_telegraphs(&mut pending, dt);
                if !released.is_empty() {
                    bursts += 1;
                    prop_assert_eq!(released.len(), kind.burst_count() as usize);
                    fired_at = Some(elapsed);
                }
            }
            prop_assert!(bursts <= 1);
            if let Some(at) = fired_at {
                prop_assert!(at + 1e-4 >= kind.delay());
                prop_assert!(pending.is_empty());
            } else {
                prop_assert_eq!(pending.len(), 1);
            }
        }
    }
}
