//! # Clock
//!
//! The kernel's only notion of time: a millisecond counter that wraps at
//! `u32::MAX`. Deadlines are compared by signed subtraction so the scheduler
//! keeps working across the wrap without the clock having to announce it.
//!
//! ```text
//!        deadline                now
//!   ──────────┼───────────────────┼──────────►   now - deadline >= 0  → due
//!   0xFFFF_FFF0                0x0000_0010       (wrapping, read as i32)
//! ```

use core::cell::Cell;

/// Millisecond tick count.
pub type Tick = u32;

/// Source of the current tick count.
///
/// Implementations must be non-decreasing except for the wrap at
/// `Tick::MAX`, and advance at roughly one count per millisecond.
pub trait Clock {
    /// Current time in milliseconds since boot, modulo 2^32.
    fn now(&self) -> Tick;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// Returns `true` once `now` has reached or passed `deadline`.
///
/// Correct as long as less than half the clock range (~24.8 days) has
/// elapsed since the deadline was set.
#[inline]
pub const fn is_due(now: Tick, deadline: Tick) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}

/// The deadline `period` milliseconds after `now`, wrapping.
#[inline]
pub const fn deadline_after(now: Tick, period: Tick) -> Tick {
    now.wrapping_add(period)
}

// ---------------------------------------------------------------------------
// Mock clock (always available for host testing)
// ---------------------------------------------------------------------------

/// Manually driven clock for deterministic tests and simulations.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<Tick>,
}

impl MockClock {
    /// A clock reading `0`.
    pub const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// A clock reading `start`.
    pub const fn starting_at(start: Tick) -> Self {
        Self { now: Cell::new(start) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Tick) {
        self.now.set(now);
    }

    /// Move forward by `ms`, wrapping like the hardware counter.
    pub fn advance(&self, ms: Tick) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for MockClock {
    fn now(&self) -> Tick {
        self.now.get()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_at_and_after_deadline() {
        assert!(!is_due(1499, 1500));
        assert!(is_due(1500, 1500));
        assert!(is_due(1501, 1500));
    }

    #[test]
    fn test_due_across_wrap() {
        let deadline = Tick::MAX - 5;
        assert!(!is_due(Tick::MAX - 6, deadline));
        assert!(is_due(Tick::MAX, deadline));
        // now has wrapped past zero; still due
        assert!(is_due(10, deadline));
    }

    #[test]
    fn test_deadline_after_wraps() {
        assert_eq!(deadline_after(Tick::MAX - 99, 500), 400);
        assert_eq!(deadline_after(1000, 500), 1500);
    }

    #[test]
    fn test_far_future_deadline_not_due() {
        // A deadline just set from a wrapped "now" is not mistaken as past.
        let now = 100;
        let deadline = deadline_after(now, 1000);
        assert!(!is_due(now, deadline));
    }

    #[test]
    fn test_mock_clock_advance_wraps() {
        let clock = MockClock::starting_at(Tick::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now(), 1);

        clock.set(42);
        assert_eq!((&clock).now(), 42);
    }
}
