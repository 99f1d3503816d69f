//! Time-window debouncer for the door contact.
//!
//! Two timestamps are tracked: when the raw level last changed, and the
//! currently accepted (stable) state.  A new state is accepted only after
//! the raw signal has held it continuously for the full window; any
//! intervening bounce restarts the window.
//!
//! ```text
//!  raw     ‾‾‾‾|__|‾|_____________________
//!  change       ^  ^ ^   (timer restarts)
//!  stable  OPEN ...................|CLOSED
//!                    |<-- window -->|
//! ```

use super::door::DoorState;

/// Default debounce window (ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    open_level: bool,
    last_raw: DoorState,
    last_change_ms: u64,
    stable: DoorState,
}

impl Debouncer {
    /// Seed the debouncer from the first raw sample.  The initial state is
    /// accepted as-is, without waiting for a window.
    pub fn new(initial_level: bool, now_ms: u64, window_ms: u64, open_level: bool) -> Self {
        let initial = DoorState::from_level(initial_level, open_level);
        Self {
            window_ms,
            open_level,
            last_raw: initial,
            last_change_ms: now_ms,
            stable: initial,
        }
    }

    /// Feed one raw sample taken at `now_ms` and return the stable state.
    pub fn observe(&mut self, raw_level: bool, now_ms: u64) -> DoorState {
        let sample = DoorState::from_level(raw_level, self.open_level);

        if sample != self.last_raw {
            self.last_raw = sample;
            self.last_change_ms = now_ms;
        }

        if sample != self.stable && now_ms.saturating_sub(self.last_change_ms) >= self.window_ms {
            self.stable = sample;
        }

        self.stable
    }

    pub fn stable(&self) -> DoorState {
        self.stable
    }
}
