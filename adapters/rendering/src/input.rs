use std::time::Duration;

use quince_core::Direction;

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Discrete step requested on this frame, after key repeat is applied.
    pub direction: Option<Direction>,
    /// Whether the player asked to leave the game.
    pub quit: bool,
}

/// Turns a held direction key into discrete step requests.
///
/// A fresh press fires immediately. Holding the key fires again once
/// `delay` has elapsed and then every `interval`. A zero interval disables
/// repetition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRepeat {
    delay: Duration,
    interval: Duration,
    held: Option<Direction>,
    until_next: Duration,
}

impl KeyRepeat {
    /// Creates a key repeat policy.
    #[must_use]
    pub const fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            delay,
            interval,
            held: None,
            until_next: Duration::ZERO,
        }
    }

    /// Delay before the first repeat.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Interval between subsequent repeats.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Advances the policy by `dt` with the direction currently held down.
    ///
    /// Returns the direction that should produce a step this frame. A frame
    /// fires at most once even when `dt` spans several intervals.
    pub fn update(&mut self, held: Option<Direction>, dt: Duration) -> Option<Direction> {
        let Some(direction) = held else {
            self.held = None;
            return None;
        };

        if self.held != Some(direction) {
            self.held = Some(direction);
            self.until_next = self.delay;
            return Some(direction);
        }

        if self.interval.is_zero() {
            return None;
        }

        if dt < self.until_next {
            self.until_next -= dt;
            return None;
        }

        let overshoot = dt - self.until_next;
        self.until_next = self
            .interval
            .saturating_sub(duration_rem(overshoot, self.interval));
        Some(direction)
    }
}

impl Default for KeyRepeat {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), Duration::from_millis(120))
    }
}

fn duration_rem(value: Duration, modulus: Duration) -> Duration {
    let modulus_nanos = modulus.as_nanos();
    if modulus_nanos == 0 {
        return Duration::ZERO;
    }
    let remainder = value.as_nanos() % modulus_nanos;
    Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX))
}
