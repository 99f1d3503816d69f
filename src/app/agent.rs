//! Agent — the composition root of the domain core.
//!
//! [`Agent`] owns an `AgentState` (debouncer, edge detector, heartbeat
//! timer, counters) plus the connectivity supervisor and reporter.  All
//! I/O flows through the [`AgentIo`] bundle passed into every call, so
//! there is no process-wide mutable state.
//!
//! ```text
//!  DoorInputPort ──▶ Debouncer ──▶ EdgeDetector ──┐
//!                                                 ├─▶ ensure_connected ──▶ Reporter ──▶ HttpTransport
//!                      HeartbeatScheduler ────────┘
//! ```
//!
//! One [`tick`](Agent::tick) is one loop iteration.  It never sleeps;
//! the only blocking happens inside the supervisor's bounded retry wait
//! and the HTTP round-trip.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::AgentConfig;
use crate::connectivity::{ConnectivitySupervisor, RetryPolicy};
use crate::error::ConnectError;
use crate::reporter::Reporter;
use crate::scheduler::HeartbeatScheduler;
use crate::sensors::{Debouncer, DoorState, EdgeDetector, Transition};
use crate::settings::NetworkSettings;

use super::events::{AppEvent, ReportTrigger};
use super::ports::{ConnectionState, ConnectivityPort, DoorInputPort, EventSink, HttpTransport};

/// Adapters the agent drives on every tick.
pub struct AgentIo<I, L, H, D> {
    pub input: I,
    pub link: L,
    pub http: H,
    pub delay: D,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStats {
    pub transitions: u32,
    pub reports_attempted: u32,
    pub reports_delivered: u32,
    pub reports_failed: u32,
    pub input_faults: u32,
}

/// Mutable loop state, owned by the agent and threaded through each
/// component call.
#[derive(Debug, Clone)]
struct AgentState {
    debouncer: Debouncer,
    edges: EdgeDetector,
    heartbeat: HeartbeatScheduler,
    stats: AgentStats,
}

/// What one [`Agent::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub state: DoorState,
    pub transition: Option<Transition>,
    pub report: Option<ReportTrigger>,
}

pub struct Agent {
    config: AgentConfig,
    state: AgentState,
    supervisor: ConnectivitySupervisor,
    reporter: Reporter,
}

impl Agent {
    /// Take the first sample and send the initial report.
    ///
    /// The first sample becomes the stable state without debouncing.  If
    /// the pin cannot be read the agent starts from `Closed` and the
    /// debouncer corrects it one window after the first good sample.
    pub fn start<I, L, H, D>(
        config: AgentConfig,
        settings: &NetworkSettings,
        now_ms: u64,
        io: &mut AgentIo<I, L, H, D>,
        sink: &mut impl EventSink,
    ) -> Result<Self, ConnectError>
    where
        I: DoorInputPort,
        L: ConnectivityPort,
        H: HttpTransport,
        D: DelayNs,
    {
        let mut stats = AgentStats::default();
        let level = io.input.read_raw().unwrap_or_else(|e| {
            warn!("Door input unreadable at boot ({}), assuming closed", e);
            stats.input_faults += 1;
            sink.emit(&AppEvent::InputFault);
            !config.open_level
        });

        let debouncer = Debouncer::new(level, now_ms, u64::from(config.debounce_ms), config.open_level);
        let initial = debouncer.stable();
        let state = AgentState {
            debouncer,
            edges: EdgeDetector::seeded(initial),
            heartbeat: HeartbeatScheduler::new(u64::from(config.heartbeat_interval_ms), now_ms),
            stats,
        };

        let mut agent = Self {
            supervisor: ConnectivitySupervisor::new(
                settings.credentials.clone(),
                RetryPolicy::from_config(&config),
            ),
            reporter: Reporter::new(&settings.server, config.wire_format),
            config,
            state,
        };

        info!("Agent started: door {}", initial);
        sink.emit(&AppEvent::Started { state: initial });
        agent.send_report(ReportTrigger::Initial, initial, now_ms, io, sink)?;
        Ok(agent)
    }

    /// Run one loop iteration at `now_ms`.
    ///
    /// Reports on an edge or a due heartbeat, never twice for the same
    /// iteration.  `Err` only when connectivity is lost for good; the
    /// caller must restart.
    pub fn tick<I, L, H, D>(
        &mut self,
        now_ms: u64,
        io: &mut AgentIo<I, L, H, D>,
        sink: &mut impl EventSink,
    ) -> Result<TickOutcome, ConnectError>
    where
        I: DoorInputPort,
        L: ConnectivityPort,
        H: HttpTransport,
        D: DelayNs,
    {
        let stable = match io.input.read_raw() {
            Ok(level) => self.state.debouncer.observe(level, now_ms),
            Err(e) => {
                warn!("Door input read failed ({}), skipping sample", e);
                self.state.stats.input_faults += 1;
                sink.emit(&AppEvent::InputFault);
                self.state.debouncer.stable()
            }
        };

        let transition = self.state.edges.update(stable);
        if let Some(t) = transition {
            info!("Door {:?} (now {})", t, stable);
            self.state.stats.transitions += 1;
            sink.emit(&AppEvent::Transition(t));
        }

        let report = match transition {
            Some(t) => Some(ReportTrigger::Edge(t)),
            None if self.state.heartbeat.is_due(now_ms) => Some(ReportTrigger::Heartbeat),
            None => None,
        };

        if let Some(trigger) = report {
            self.send_report(trigger, stable, now_ms, io, sink)?;
        }

        Ok(TickOutcome {
            state: stable,
            transition,
            report,
        })
    }

    fn send_report<I, L, H, D>(
        &mut self,
        trigger: ReportTrigger,
        state: DoorState,
        now_ms: u64,
        io: &mut AgentIo<I, L, H, D>,
        sink: &mut impl EventSink,
    ) -> Result<(), ConnectError>
    where
        L: ConnectivityPort,
        H: HttpTransport,
        D: DelayNs,
    {
        // Re-arm first: a failed report waits for the next boundary.
        self.state.heartbeat.mark_reported(now_ms);

        self.supervisor
            .ensure_connected(&mut io.link, &mut io.delay, sink)?;

        if trigger == ReportTrigger::Heartbeat {
            debug!("Heartbeat: RSSI={:?}", io.link.signal_quality());
        }

        self.state.stats.reports_attempted += 1;
        match self.reporter.report(state, &mut io.http) {
            Ok(response) => {
                self.state.stats.reports_delivered += 1;
                if let Err(e) = response.error_for_status() {
                    warn!("Report {:?}: {}", trigger, e);
                }
                sink.emit(&AppEvent::ReportDelivered {
                    trigger,
                    state,
                    status: response.status,
                });
            }
            Err(e) => {
                self.state.stats.reports_failed += 1;
                warn!("Report {:?} not delivered: {}", trigger, e);
                sink.emit(&AppEvent::ReportFailed {
                    trigger,
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn door_state(&self) -> DoorState {
        self.state.debouncer.stable()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn stats(&self) -> AgentStats {
        self.state.stats
    }

    pub fn reconnects(&self) -> u32 {
        self.supervisor.reconnects()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn report_url(&self) -> &str {
        self.reporter.url()
    }
}
