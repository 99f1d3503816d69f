//! State reporter: typed JSON payload + best-effort HTTP POST.
//!
//! Any HTTP status counts as delivered; only a missing response is an
//! error.  Nothing is retried here.  The client connection acquired for a
//! report is released on every exit path by [`SessionGuard`].

use core::ops::{Deref, DerefMut};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{HttpResponse, HttpSession, HttpTransport};
use crate::config::WireFormat;
use crate::error::ReportError;
use crate::sensors::DoorState;
use crate::settings::ServerAddress;

const JSON_HEADERS: [(&str, &str); 1] = [("Content-Type", "application/json")];

// ───────────────────────────────────────────────────────────────
// Payload
// ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct TextBody {
    state: DoorState,
}

#[derive(Serialize, Deserialize)]
struct NumericBody {
    state: u8,
}

#[derive(Serialize, Deserialize)]
struct ShopStatusBody {
    #[serde(rename = "shop-status")]
    shop_status: DoorState,
}

/// Immutable report body, built fresh for every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPayload {
    pub state: DoorState,
    pub format: WireFormat,
}

impl ReportPayload {
    pub const fn new(state: DoorState, format: WireFormat) -> Self {
        Self { state, format }
    }

    /// Serialise to the JSON body for the configured [`WireFormat`].
    pub fn to_json(&self) -> Result<Vec<u8>, ReportError> {
        let encoded = match self.format {
            WireFormat::Text => serde_json::to_vec(&TextBody { state: self.state }),
            WireFormat::Numeric => serde_json::to_vec(&NumericBody {
                state: self.state.as_flag(),
            }),
            WireFormat::ShopStatus => serde_json::to_vec(&ShopStatusBody {
                shop_status: self.state,
            }),
        };
        encoded.map_err(|_| ReportError::Encode)
    }

    /// Parse a body previously produced by [`to_json`](Self::to_json).
    pub fn from_json(body: &[u8], format: WireFormat) -> Result<Self, serde_json::Error> {
        let state = match format {
            WireFormat::Text => serde_json::from_slice::<TextBody>(body)?.state,
            WireFormat::Numeric => match serde_json::from_slice::<NumericBody>(body)?.state {
                1 => DoorState::Open,
                0 => DoorState::Closed,
                other => {
                    return Err(serde::de::Error::custom(format_args!(
                        "door flag must be 0 or 1, got {other}"
                    )));
                }
            },
            WireFormat::ShopStatus => serde_json::from_slice::<ShopStatusBody>(body)?.shop_status,
        };
        Ok(Self { state, format })
    }
}

// ───────────────────────────────────────────────────────────────
// Scoped session
// ───────────────────────────────────────────────────────────────

/// Closes the wrapped session when dropped.
pub struct SessionGuard<S: HttpSession> {
    session: S,
}

impl<S: HttpSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: HttpSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: HttpSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: HttpSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.close();
    }
}

// ───────────────────────────────────────────────────────────────
// Reporter
// ───────────────────────────────────────────────────────────────

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Classify for logging: non-2xx becomes [`ReportError::ServerRejected`].
    pub fn error_for_status(&self) -> Result<(), ReportError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ReportError::ServerRejected(self.status))
        }
    }
}

pub struct Reporter {
    url: String,
    format: WireFormat,
}

impl Reporter {
    pub fn new(server: &ServerAddress, format: WireFormat) -> Self {
        Self {
            url: server.url(),
            format,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the current state.  Taking `&mut self` keeps a single report
    /// in flight per reporter.
    pub fn report(
        &mut self,
        state: DoorState,
        http: &mut impl HttpTransport,
    ) -> Result<HttpResponse, ReportError> {
        let body = ReportPayload::new(state, self.format).to_json()?;

        let session = http.open(&self.url).map_err(|e| {
            warn!("HTTP: failed to connect to server ({})", e);
            ReportError::from(e)
        })?;
        let mut session = SessionGuard::new(session);

        info!("HTTP: POST {} state={}", self.url, state);
        let response = session.post(&JSON_HEADERS, &body)?;
        info!(
            "HTTP: response code {} body={:?}",
            response.status, response.body
        );
        Ok(response)
    }
}
