// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Most fires reported by a single poll. A host that stalled longer than
/// this many periods skips the backlog and re-anchors on the current time.
pub const MAX_CATCH_UP: u32 = 4;

/// A cancellable fixed-period timer driven by the host's event loop.
///
/// Fires are reported from [`Interval::poll`] in order, never concurrently.
/// Once cancelled the interval reports nothing, whatever the clock says.
#[derive(Clone, Debug)]
pub struct Interval {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl Interval {
    /// Start an interval whose first fire is one period after `now`.
    pub fn start(now: Instant, period: Duration) -> Self {
        let period = period.max(Duration::from_nanos(1));
        Self {
            period,
            next_due: now + period,
            cancelled: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns `true` only on the call that actually cancelled the interval.
    pub fn cancel(&mut self) -> bool {
        let was_live = !self.cancelled;
        self.cancelled = true;
        was_live
    }

    /// Number of fires due at `now`, consuming them.
    pub fn poll(&mut self, now: Instant) -> u32 {
        if self.cancelled || now < self.next_due {
            return 0;
        }

        let mut fired = 0u32;
        while now >= self.next_due && fired < MAX_CATCH_UP {
            self.next_due += self.period;
            fired += 1;
        }
        if now >= self.next_due {
            self.next_due = now + self.period;
        }
        fired
    }

    /// Time left until the next fire, or `None` once cancelled.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        if self.cancelled {
            return None;
        }
        Some(self.next_due.saturating_duration_since(now))
    }

    /// Shift the schedule forward by `by`, e.g. after the host was paused.
    pub fn delay(&mut self, by: Duration) {
        self.next_due += by;
    }
}
