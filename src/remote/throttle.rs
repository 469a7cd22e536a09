//! Trailing-edge throttle for keyword fetches.
//!
//! The first trigger opens a window; triggers inside the window are dropped,
//! only the latest keyword is retained. When the window elapses the pending
//! fetch fires once, reading that latest keyword. Bursts of keystrokes thus
//! coalesce into at most one network call per window.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    deadline: Option<Instant>,
    latest: Option<String>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            latest: None,
        }
    }

    /// Record a trigger. Opens a window if none is pending; otherwise only
    /// the keyword is updated.
    pub fn call(&mut self, keyword: &str, now: Instant) {
        self.latest = Some(keyword.to_string());
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Take the due fetch, if the window has elapsed. Returns the latest
    /// keyword recorded during the window and closes it.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.latest.take()
    }

    /// Drop any pending fetch.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.latest = None;
    }
}
