//! Onboard timer types.

use crate::protocol::addressing::MAX_TIMER_INDEX;

/// Kind of timer to set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Relay turns on for the duration, then off.
    Duration,
    /// Relay pulses once the duration has elapsed.
    Pulse,
}

/// Hours, minutes and seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerDuration {
    /// Hours (0-255).
    pub hours: u8,
    /// Minutes (0-59).
    pub minutes: u8,
    /// Seconds (0-59).
    pub seconds: u8,
}

impl TimerDuration {
    /// Creates a duration.
    #[must_use]
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Total length in seconds.
    #[must_use]
    pub const fn as_secs(self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Returns true if no time remains.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Sixteen-bit mask of active timers; bit `n` is timer `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimerMask(pub u16);

impl TimerMask {
    /// No timers active.
    pub const NONE: Self = Self(0);
    /// All timers active.
    pub const ALL: Self = Self(u16::MAX);

    /// Returns a copy with `timer` enabled. Indices above 15 are ignored.
    #[must_use]
    pub const fn with(self, timer: u8) -> Self {
        if timer > MAX_TIMER_INDEX {
            return self;
        }
        Self(self.0 | (1 << timer))
    }

    /// Returns true if `timer` is enabled.
    #[must_use]
    pub const fn contains(self, timer: u8) -> bool {
        timer <= MAX_TIMER_INDEX && self.0 & (1 << timer) != 0
    }

    /// Returns the raw mask.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl From<u16> for TimerMask {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl FromIterator<u8> for TimerMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_secs() {
        assert_eq!(TimerDuration::new(1, 2, 3).as_secs(), 3723);
        assert!(TimerDuration::default().is_zero());
    }

    #[test]
    fn test_timer_mask() {
        let mask: TimerMask = [1u8, 3, 5, 7, 9, 11, 13, 15].into_iter().collect();
        assert_eq!(mask.bits(), 0xAAAA);
        assert!(mask.contains(15));
        assert!(!mask.contains(0));
        assert_eq!(mask.with(16), mask);
    }
}
