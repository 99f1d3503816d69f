//! Outbound application events.
//!
//! The [`Agent`](super::agent::Agent) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on the device they go to the serial
//! log.

use crate::sensors::{DoorState, Transition};

/// Why a report was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTrigger {
    /// First report after boot.
    Initial,
    /// A debounced door transition.
    Edge(Transition),
    /// Periodic liveness report.
    Heartbeat,
}

/// Structured events emitted by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The agent took its first sample.
    Started { state: DoorState },

    /// The debounced door state changed.
    Transition(Transition),

    /// The server answered (any status code).
    ReportDelivered {
        trigger: ReportTrigger,
        state: DoorState,
        status: u16,
    },

    /// No response was obtained; the next trigger is the retry.
    ReportFailed {
        trigger: ReportTrigger,
        reason: String,
    },

    /// The link was up at the previous report and is down now.
    LinkLost,

    /// Association succeeded.
    LinkUp { attempts: u32, rssi: Option<i8> },

    /// The retry budget is spent; a restart follows.
    LinkFailed { attempts: u32 },

    /// The door input could not be sampled this tick.
    InputFault,
}
