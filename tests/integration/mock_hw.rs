//! Mock adapters for integration tests.
//!
//! Every mock records what the agent asked of it so tests can assert on
//! the full history without touching real GPIO, radio or sockets.

use doorwatch::app::agent::{Agent, AgentIo};
use doorwatch::app::events::AppEvent;
use doorwatch::app::ports::{
    ConnectionState, ConnectivityPort, DoorInputPort, EventSink, HttpResponse, HttpSession,
    HttpTransport, StorageError, StoragePort,
};
use doorwatch::config::AgentConfig;
use doorwatch::error::{InputError, TransportError};
use doorwatch::settings::{Credentials, NetworkSettings, ServerAddress};
use embedded_hal::delay::DelayNs;
use std::collections::HashMap;

pub const REPORT_URL: &str = "http://10.0.0.2:5000/update_door_status";

// ── Door input ────────────────────────────────────────────────

pub struct ScriptedInput {
    pub level: bool,
    pub faulted: bool,
    pub reads: u32,
}

impl ScriptedInput {
    pub fn new(level: bool) -> Self {
        Self {
            level,
            faulted: false,
            reads: 0,
        }
    }
}

impl DoorInputPort for ScriptedInput {
    fn read_raw(&mut self) -> Result<bool, InputError> {
        self.reads += 1;
        if self.faulted {
            Err(InputError::GpioReadFailed)
        } else {
            Ok(self.level)
        }
    }
}

// ── Link ──────────────────────────────────────────────────────

/// Comes up on the `up_after`-th connect call; never if `None`.
pub struct ScriptedLink {
    pub state: ConnectionState,
    pub up_after: Option<u32>,
    pub connect_calls: u32,
}

#[allow(dead_code)]
impl ScriptedLink {
    pub fn new(up_after: Option<u32>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            up_after,
            connect_calls: 0,
        }
    }

    /// Drop the association; it comes back on the next connect call.
    pub fn drop_link(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.connect_calls = 0;
        self.up_after = Some(1);
    }

    /// Drop the association for good.
    pub fn kill(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.connect_calls = 0;
        self.up_after = None;
    }
}

impl ConnectivityPort for ScriptedLink {
    fn connect(&mut self, _credentials: &Credentials) -> ConnectionState {
        self.connect_calls += 1;
        self.state = match self.up_after {
            Some(n) if self.connect_calls >= n => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        };
        self.state
    }

    fn status(&self) -> ConnectionState {
        self.state
    }

    fn signal_quality(&self) -> Option<i8> {
        (self.state == ConnectionState::Connected).then_some(-61)
    }

    fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

// ── HTTP ──────────────────────────────────────────────────────

/// Records every POST.  Panics if a second session is opened while one
/// is still live.
pub struct RecordingHttp {
    pub status: u16,
    pub fail_open: bool,
    pub fail_post: bool,
    pub urls: Vec<String>,
    pub bodies: Vec<String>,
    pub opens: u32,
    pub closes: u32,
    active: bool,
}

#[allow(dead_code)]
impl RecordingHttp {
    pub fn new() -> Self {
        Self {
            status: 200,
            fail_open: false,
            fail_post: false,
            urls: Vec::new(),
            bodies: Vec::new(),
            opens: 0,
            closes: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_body(&self) -> Option<&str> {
        self.bodies.last().map(String::as_str)
    }
}

pub struct RecordingSession<'a> {
    http: &'a mut RecordingHttp,
    url: String,
    closed: bool,
}

impl HttpTransport for RecordingHttp {
    type Session<'a>
        = RecordingSession<'a>
    where
        Self: 'a;

    fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError> {
        assert!(!self.active, "second HTTP session opened while one is in flight");
        if self.fail_open {
            return Err(TransportError::Connect("connection refused".into()));
        }
        self.active = true;
        self.opens += 1;
        Ok(RecordingSession {
            http: self,
            url: url.to_owned(),
            closed: false,
        })
    }
}

impl HttpSession for RecordingSession<'_> {
    fn post(&mut self, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, TransportError> {
        assert!(
            headers.contains(&("Content-Type", "application/json")),
            "report must be sent as JSON"
        );
        if self.http.fail_post {
            return Err(TransportError::Request("timed out".into()));
        }
        self.http.urls.push(self.url.clone());
        self.http
            .bodies
            .push(String::from_utf8(body.to_vec()).expect("utf-8 body"));
        Ok(HttpResponse {
            status: self.http.status,
            body: String::new(),
        })
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.http.active = false;
            self.http.closes += 1;
        }
    }
}

// ── Delay ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingDelay {
    pub calls: u32,
    pub total_ms: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub store: HashMap<String, String>,
    pub writes: u32,
}

impl StoragePort for MockNvs {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(&format!("{}::{}", namespace, key)).cloned())
    }

    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), value.to_owned());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type MockIo = AgentIo<ScriptedInput, ScriptedLink, RecordingHttp, CountingDelay>;

pub fn network() -> NetworkSettings {
    NetworkSettings {
        credentials: Credentials::personal("ShopNet", "hunter2hunter2").unwrap(),
        server: ServerAddress::new("10.0.0.2", Some(5000), "update_door_status").unwrap(),
    }
}

pub fn mock_io(level: bool) -> MockIo {
    AgentIo {
        input: ScriptedInput::new(level),
        link: ScriptedLink::new(Some(1)),
        http: RecordingHttp::new(),
        delay: CountingDelay::default(),
    }
}

/// Boot an agent at t=0 with the door at `level` and the link reachable.
pub fn boot(level: bool) -> (Agent, MockIo, RecordingSink) {
    boot_with(AgentConfig::default(), level)
}

pub fn boot_with(config: AgentConfig, level: bool) -> (Agent, MockIo, RecordingSink) {
    let mut io = mock_io(level);
    let mut sink = RecordingSink::default();
    let agent = Agent::start(config, &network(), 0, &mut io, &mut sink).expect("boot");
    (agent, io, sink)
}

/// Tick every `step_ms` from `from_ms` through `to_ms` inclusive.
pub fn run(
    agent: &mut Agent,
    io: &mut MockIo,
    sink: &mut RecordingSink,
    from_ms: u64,
    to_ms: u64,
    step_ms: u64,
) {
    let mut now = from_ms;
    while now <= to_ms {
        agent.tick(now, io, sink).expect("tick");
        now += step_ms;
    }
}
