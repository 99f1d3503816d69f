//! Heartbeat scheduler.
//!
//! Cooperative, elapsed-time based: the control loop asks whether a
//! heartbeat is due on every poll instead of sleeping for the interval,
//! so debounce sampling keeps running at full rate in between.
//!
//! The timer is re-armed on every *attempted* report, successful or not.
//! A failed report therefore waits for the next heartbeat boundary
//! instead of being retried at the polling rate.

/// Default heartbeat interval (ms).
pub const DEFAULT_HEARTBEAT_MS: u64 = 60_000;

/// `true` when at least `interval_ms` has elapsed since `last_report_ms`.
pub fn is_due(last_report_ms: u64, now_ms: u64, interval_ms: u64) -> bool {
    now_ms.saturating_sub(last_report_ms) >= interval_ms
}

#[derive(Debug, Clone)]
pub struct HeartbeatScheduler {
    interval_ms: u64,
    last_report_ms: u64,
}

impl HeartbeatScheduler {
    /// Create a scheduler whose first heartbeat falls one interval after
    /// `now_ms`.
    pub fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            last_report_ms: now_ms,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        is_due(self.last_report_ms, now_ms, self.interval_ms)
    }

    /// Record that a report was attempted at `now_ms`.
    pub fn mark_reported(&mut self, now_ms: u64) {
        self.last_report_ms = now_ms;
    }

    /// Milliseconds until the next heartbeat (0 if already due).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.last_report_ms + self.interval_ms).saturating_sub(now_ms)
    }

    pub fn last_report_ms(&self) -> u64 {
        self.last_report_ms
    }
}
