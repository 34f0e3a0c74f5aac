//! Cooldown timer primitive
//!
//! Every time-gated action (shooting, melee, dash, boss attack cadences)
//! runs through one of these.

use serde::{Deserialize, Serialize};

/// Remaining time below this counts as elapsed. Summing fixed `dt` steps in
/// f32 leaves residue that would otherwise cost an extra tick.
pub const TIME_EPSILON: f32 = 1e-5;

/// Monotonic countdown with a configured duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    /// Full length of the cooldown (seconds)
    pub duration: f32,
    /// Time left before the action is ready again (never negative)
    pub remaining: f32,
}

impl Cooldown {
    /// New cooldown that starts ready
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            remaining: 0.0,
        }
    }

    /// New cooldown that starts fully charged (not ready)
    pub fn primed(duration: f32) -> Self {
        let mut cd = Self::new(duration);
        cd.trigger();
        cd
    }

    /// Restart the countdown from the full duration
    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    /// Advance time, clamped at zero
    pub fn update(&mut self, dt: f32) {
        self.remaining -= dt;
        if self.remaining < TIME_EPSILON {
            self.remaining = 0.0;
        }
    }

    /// Run for at least `time`, keeping a longer countdown already in progress
    pub fn extend(&mut self, time: f32) {
        if time > self.remaining {
            self.duration = time;
            self.remaining = time;
        }
    }

    /// Drop the countdown so the timer is ready immediately
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Change the duration without touching the current countdown
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.remaining.min(self.duration);
    }

    /// Fraction of the cooldown still left (0 = ready, 1 = just triggered)
    pub fn fraction_left(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_ready_and_triggers() {
        let mut cd = Cooldown::new(0.35);
        assert!(cd.ready());
        cd.trigger();
        assert!(!cd.ready());
        cd.update(0.2);
        assert!(!cd.ready());
        cd.update(0.2);
        assert!(cd.ready());
        assert_eq!(cd.remaining, 0.0);
    }

    #[test]
    fn test_set_duration_shrinks_remaining() {
        let mut cd = Cooldown::primed(1.0);
        cd.set_duration(0.5);
        assert_eq!(cd.remaining, 0.5);
    }

    #[test]
    fn test_split_steps_finish_on_time() {
        let mut cd = Cooldown::primed(1.2);
        cd.update(1.1);
        cd.update(0.1);
        assert!(cd.ready());

        let mut cd = Cooldown::primed(1.2);
        for _ in 0..72 {
            cd.update(1.0 / 60.0);
        }
        assert!(cd.ready());
    }

    #[test]
    fn test_extend_keeps_longer_countdown() {
        let mut cd = Cooldown::new(0.0);
        cd.extend(0.6);
        assert_eq!(cd.remaining, 0.6);
        cd.extend(0.2);
        assert_eq!(cd.remaining, 0.6);
        cd.reset();
        assert!(cd.ready());
    }

    proptest! {
        #[test]
        fn prop_remaining_never_negative(duration in 0.0f32..5.0, steps in proptest::collection::vec(0.0f32..1.0, 0..50)) {
            let mut cd = Cooldown::primed(duration);
            for dt in steps {
                cd.update(dt);
                prop_assert!(cd.remaining >= 0.0);
                prop_assert!(cd.remaining <= duration);
            }
        }

        #[test]
        fn prop_ready_after_full_duration(duration in 0.01f32..5.0) {
            let mut cd = Cooldown::primed(duration);
            cd.update(duration);
            prop_assert!(cd.ready());
        }
    }
}
