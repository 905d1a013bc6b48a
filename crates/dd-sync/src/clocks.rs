//! Debounce and adaptive poll timers.
//!
//! Timers are timestamp comparisons against the injected clock; nothing
//! here sleeps. The owner asks `fire_due(now)` on each tick and performs
//! the work itself when it returns true.

use chrono::{DateTime, Duration, Utc};

/// Coalesces rapid triggers into one firing `delay` after the last arm.
#[derive(Debug, Clone, PartialEq)]
pub struct DebounceClock {
    delay: Duration,
    fire_at: Option<DateTime<Utc>>,
}

impl DebounceClock {
    /// Write-behind delay for preference publishes.
    pub fn default_delay() -> Duration {
        Duration::milliseconds(800)
    }

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fire_at: None,
        }
    }

    /// Schedule (or push back) the firing to `now + delay`.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.fire_at = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.fire_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.fire_at.is_some()
    }

    /// Whether a fire is pending without disarming it.
    pub fn would_fire(&self, now: DateTime<Utc>) -> bool {
        self.fire_at.is_some_and(|at| now >= at)
    }

    /// Disarm and report true once the scheduled time has passed.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.fire_at {
            Some(at) if now >= at => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Fast/slow interval pair for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollBand {
    pub fast: Duration,
    pub slow: Duration,
}

impl PollBand {
    /// Preference document poll: 2s while a stream progresses, 15s idle.
    pub fn preference() -> Self {
        Self {
            fast: Duration::seconds(2),
            slow: Duration::seconds(15),
        }
    }

    /// Streaming-status poll: same shape, slightly tighter when active.
    pub fn status() -> Self {
        Self {
            fast: Duration::seconds(1),
            slow: Duration::seconds(10),
        }
    }
}

/// Recurring poll whose interval follows stream activity.
///
/// While a stream is actively progressing the fast interval applies;
/// otherwise the slow one. Switching to fast pulls an already-scheduled
/// distant poll closer so the speedup takes effect immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptivePollClock {
    band: PollBand,
    active: bool,
    next_at: Option<DateTime<Utc>>,
}

impl AdaptivePollClock {
    /// First poll is due immediately.
    pub fn new(band: PollBand, now: DateTime<Utc>) -> Self {
        Self {
            band,
            active: false,
            next_at: Some(now),
        }
    }

    pub fn interval(&self) -> Duration {
        if self.active {
            self.band.fast
        } else {
            self.band.slow
        }
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        if self.active == active {
            return;
        }
        self.active = active;
        if active && let Some(next) = self.next_at {
            let pulled_in = now + self.band.fast;
            if pulled_in < next {
                self.next_at = Some(pulled_in);
            }
        }
    }

    /// Report true when a poll is due, scheduling the next one.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_at {
            Some(at) if now >= at => {
                self.next_at = Some(now + self.interval());
                true
            }
            _ => false,
        }
    }

    /// Stop polling until `reset` re-arms; used on teardown.
    pub fn cancel(&mut self) {
        self.next_at = None;
    }

    /// Re-arm with an immediate poll; used on dataset switch.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.next_at = Some(now);
    }
}
