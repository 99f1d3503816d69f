//! HTTP client adapter.
//!
//! Implements [`HttpTransport`]: one short-lived client session per
//! report, closed by the reporter's session guard on every exit path.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded_svc` blocking client, with the configured request timeout.
//! - **all other targets**: records requests and answers with a canned
//!   response, for host-side runs.

use crate::app::ports::{HttpResponse, HttpSession, HttpTransport};
use crate::error::TransportError;

#[cfg(not(target_os = "espidf"))]
use log::info;

/// Upper bound on how much of a response body is kept for logging.
pub const MAX_RESPONSE_BODY: usize = 512;

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use embedded_svc::http::client::Client;
    use embedded_svc::io::{Read, Write};
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use log::debug;

    use super::*;

    pub struct EspHttpTransport {
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(timeout_ms: u32) -> Self {
            Self {
                timeout: Duration::from_millis(u64::from(timeout_ms)),
            }
        }
    }

    pub struct EspHttpSession {
        client: Option<Client<EspHttpConnection>>,
        url: String,
    }

    impl HttpTransport for EspHttpTransport {
        type Session<'a>
            = EspHttpSession
        where
            Self: 'a;

        fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError> {
            let connection = EspHttpConnection::new(&Configuration {
                timeout: Some(self.timeout),
                ..Default::default()
            })
            .map_err(|e| TransportError::Connect(e.to_string()))?;
            debug!("HTTP: session opened for {}", url);
            Ok(EspHttpSession {
                client: Some(Client::wrap(connection)),
                url: url.to_owned(),
            })
        }
    }

    impl HttpSession for EspHttpSession {
        fn post(
            &mut self,
            headers: &[(&str, &str)],
            body: &[u8],
        ) -> Result<HttpResponse, TransportError> {
            let client = self
                .client
                .as_mut()
                .ok_or_else(|| TransportError::Request("session closed".into()))?;

            let content_length = body.len().to_string();
            let mut all_headers: Vec<(&str, &str)> = headers.to_vec();
            all_headers.push(("Content-Length", &content_length));

            let mut request = client
                .post(&self.url, &all_headers)
                .map_err(|e| TransportError::Connect(format!("{:?}", e)))?;
            request
                .write_all(body)
                .map_err(|e| TransportError::Request(format!("{:?}", e)))?;
            let mut response = request
                .submit()
                .map_err(|e| TransportError::Request(format!("{:?}", e)))?;

            let status = response.status();
            let mut buf = [0u8; MAX_RESPONSE_BODY];
            let mut filled = 0;
            while filled < buf.len() {
                match response.read(&mut buf[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    // Status is already known; a truncated body is fine.
                    Err(_) => break,
                }
            }
            Ok(HttpResponse {
                status,
                body: String::from_utf8_lossy(&buf[..filled]).into_owned(),
            })
        }

        fn close(&mut self) {
            if self.client.take().is_some() {
                debug!("HTTP: session closed");
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::{EspHttpSession, EspHttpTransport};

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// A request captured by [`SimHttpTransport`].
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub url: String,
    pub body: Vec<u8>,
}

#[cfg(not(target_os = "espidf"))]
pub struct SimHttpTransport {
    status: u16,
    sent: Vec<SentRequest>,
    open_sessions: u32,
}

#[cfg(not(target_os = "espidf"))]
impl SimHttpTransport {
    pub fn new() -> Self {
        Self::with_status(200)
    }

    /// Answer every request with `status`.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            sent: Vec::new(),
            open_sessions: 0,
        }
    }

    pub fn sent(&self) -> &[SentRequest] {
        &self.sent
    }

    pub fn open_sessions(&self) -> u32 {
        self.open_sessions
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct SimHttpSession<'a> {
    transport: &'a mut SimHttpTransport,
    url: String,
    open: bool,
}

#[cfg(not(target_os = "espidf"))]
impl HttpTransport for SimHttpTransport {
    type Session<'a>
        = SimHttpSession<'a>
    where
        Self: 'a;

    fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError> {
        self.open_sessions += 1;
        Ok(SimHttpSession {
            transport: self,
            url: url.to_owned(),
            open: true,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpSession for SimHttpSession<'_> {
    fn post(&mut self, _headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse, TransportError> {
        info!(
            "HTTP(sim): POST {} {}",
            self.url,
            String::from_utf8_lossy(body)
        );
        self.transport.sent.push(SentRequest {
            url: self.url.clone(),
            body: body.to_vec(),
        });
        Ok(HttpResponse {
            status: self.transport.status,
            body: r#"{"status":"updated"}"#.to_owned(),
        })
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.transport.open_sessions -= 1;
        }
    }
}
