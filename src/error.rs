//! Error types for the door telemetry agent.
//!
//! One enum per boundary, each handled where it is detected.  Only
//! [`ConnectError`] ever escapes an agent loop iteration, and the only
//! response to it is a full restart.

use core::fmt;

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Failure to (re-)establish the network association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// Every attempt in the retry budget failed.  Fatal: the caller must
    /// restart the process image.
    RetriesExhausted { attempts: u32 },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts } => {
                write!(f, "network unreachable after {attempts} attempts")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// Raised by an [`HttpTransport`](crate::app::ports::HttpTransport) when no
/// HTTP response could be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection to the server could not be set up.
    Connect(String),
    /// The request was sent (or partially sent) but no response arrived.
    Request(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(reason) => write!(f, "connect: {reason}"),
            Self::Request(reason) => write!(f, "request: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Outcome classification for a single report attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// No response: client or transport-level failure.  Recoverable; the
    /// next scheduled trigger is the retry.
    Transport(String),
    /// The server answered with a non-2xx status.  The report still counts
    /// as delivered; this variant exists for observability only.
    ServerRejected(u16),
    /// The payload could not be serialised.
    Encode,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "transport failure: {reason}"),
            Self::ServerRejected(code) => write!(f, "server answered HTTP {code}"),
            Self::Encode => write!(f, "payload encoding failed"),
        }
    }
}

impl From<TransportError> for ReportError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Door input
// ---------------------------------------------------------------------------

/// The raw door level could not be sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    GpioReadFailed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl core::error::Error for ConnectError {}
impl core::error::Error for TransportError {}
impl core::error::Error for ReportError {}
impl core::error::Error for InputError {}
