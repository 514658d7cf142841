// src/forecast/engine/autosave.rs
use std::time::Duration;

/// Trailing-edge debounce for autosave with a single in-flight slot.
///
/// Time is passed in as the elapsed app time so the scheduler can be driven
/// from Bevy's clock or from tests alike.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    delay: Duration,
    deadline: Option<Duration>,
    in_flight: bool,
    // A deadline came due while a save was in flight.
    queued: bool,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl AutosaveScheduler {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            in_flight: false,
            queued: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Re-arms the single deadline `delay` after `now`.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    /// Makes a pending deadline due immediately. No-op when nothing is pending.
    pub fn flush(&mut self, now: Duration) {
        if self.deadline.is_some() {
            self.deadline = Some(now);
        }
    }

    /// Drops the pending deadline without firing. A request already in flight
    /// still reports back through [`complete`](Self::complete).
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.queued = false;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some() || self.queued
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// True once when the deadline has passed and no save is in flight. A
    /// deadline that passes during a save is held until `complete`.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                if self.in_flight {
                    self.queued = true;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    pub fn begin(&mut self) {
        self.in_flight = true;
    }

    /// Frees the in-flight slot; a held deadline becomes due at `now`.
    pub fn complete(&mut self, now: Duration) {
        self.in_flight = false;
        if self.queued {
            self.queued = false;
            self.deadline = Some(now);
        }
    }
}
