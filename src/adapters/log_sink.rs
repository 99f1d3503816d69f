//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::{AppEvent, ReportTrigger};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn trigger_tag(trigger: &ReportTrigger) -> &'static str {
    match trigger {
        ReportTrigger::Initial => "initial",
        ReportTrigger::Edge(_) => "edge",
        ReportTrigger::Heartbeat => "heartbeat",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { state } => {
                info!("START | door={}", state);
            }
            AppEvent::Transition(t) => {
                info!("EDGE | {:?} -> {}", t, t.target());
            }
            AppEvent::ReportDelivered {
                trigger,
                state,
                status,
            } => {
                info!(
                    "REPORT | {} state={} http={}",
                    trigger_tag(trigger),
                    state,
                    status
                );
            }
            AppEvent::ReportFailed { trigger, reason } => {
                warn!("REPORT | {} failed: {}", trigger_tag(trigger), reason);
            }
            AppEvent::LinkLost => {
                warn!("LINK | lost");
            }
            AppEvent::LinkUp { attempts, rssi } => {
                info!("LINK | up attempts={} rssi={:?}", attempts, rssi);
            }
            AppEvent::LinkFailed { attempts } => {
                error!("LINK | failed after {} attempts", attempts);
            }
            AppEvent::InputFault => {
                warn!("INPUT | door sensor read failed");
            }
        }
    }
}
