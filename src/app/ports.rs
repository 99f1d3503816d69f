//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Agent (domain)
//! ```
//!
//! Driven adapters (door input, WiFi link, HTTP client, storage, event
//! sinks) implement these traits.  The [`Agent`](super::agent::Agent)
//! consumes them via generics, so the domain core never touches hardware
//! directly.  Blocking waits go through [`embedded_hal::delay::DelayNs`].
//!
//! ## Security notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **StoragePort** implementations SHOULD keep credentials on the
//!   encrypted NVS partition.

use core::net::Ipv4Addr;

use crate::config::AgentConfig;
use crate::error::{InputError, TransportError};
use crate::settings::Credentials;

// ───────────────────────────────────────────────────────────────
// Door input port (driven adapter: GPIO → domain)
// ───────────────────────────────────────────────────────────────

/// Polled boolean input carrying the raw door contact level.
pub trait DoorInputPort {
    /// Sample the raw level (`true` = HIGH).
    fn read_raw(&mut self) -> Result<bool, InputError>;
}

/// Any `embedded-hal` input pin can serve as the door contact.
pub struct HalDoorInput<P> {
    pin: P,
}

impl<P: embedded_hal::digital::InputPin> HalDoorInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: embedded_hal::digital::InputPin> DoorInputPort for HalDoorInput<P> {
    fn read_raw(&mut self) -> Result<bool, InputError> {
        self.pin.is_high().map_err(|_| InputError::GpioReadFailed)
    }
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi station)
// ───────────────────────────────────────────────────────────────

/// Link state as seen by the connectivity supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Addressing details reported after association (diagnostic only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub mac: [u8; 6],
}

/// Network association primitives.
pub trait ConnectivityPort {
    /// Begin (or retry) association.  Returns the state right after the
    /// request was issued; callers poll [`status`](Self::status) for the
    /// outcome.
    fn connect(&mut self, credentials: &Credentials) -> ConnectionState;

    /// Current link state.
    fn status(&self) -> ConnectionState;

    /// Received signal strength in dBm, if associated.
    fn signal_quality(&self) -> Option<i8>;

    /// Drop the association.
    fn disconnect(&mut self);

    /// IP configuration, once the interface is up.
    fn network_info(&self) -> Option<NetworkInfo> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP transport port (driven adapter: domain → server)
// ───────────────────────────────────────────────────────────────

/// A received HTTP response.  Any status code counts as delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// One acquired client connection.  [`close`](Self::close) releases it.
pub trait HttpSession {
    fn post(&mut self, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, TransportError>;

    fn close(&mut self);
}

/// Factory for [`HttpSession`]s.
pub trait HttpTransport {
    type Session<'a>: HttpSession
    where
        Self: 'a;

    /// Acquire a client connection for `url`.
    fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`AgentConfig`].
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`AgentConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<AgentConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &AgentConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent string key-value storage, namespaced per subsystem.
pub trait StoragePort {
    /// Read a value.  `Ok(None)` if the key does not exist.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value atomically.
    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and settings resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is neither provisioned nor stored.
    NotFound(&'static str),
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Storage partition is full.
    Full,
    /// Stored value is not valid UTF-8 or exceeds the read buffer.
    InvalidValue,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "{} not configured", what),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::InvalidValue => write!(f, "invalid stored value"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
impl core::error::Error for StorageError {}
