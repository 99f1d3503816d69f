//! Connectivity supervisor.
//!
//! Owns the association lifecycle on top of a
//! [`ConnectivityPort`](crate::app::ports::ConnectivityPort):
//!
//! ```text
//!  Disconnected ──▶ Connecting ──▶ Connected
//!        ▲              │              │
//!        └── link lost ─┼──────────────┘
//!                       ▼
//!                    Failed  (retry budget spent → restart)
//! ```
//!
//! [`ensure_connected`](ConnectivitySupervisor::ensure_connected) is called
//! before every report, since the link may drop silently between
//! heartbeats.  It blocks the loop iteration for at most the retry budget;
//! the waits go through an injected [`DelayNs`] so tests run instantly.

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ConnectionState, ConnectivityPort, EventSink};
use crate::config::{AgentConfig, Backoff};
use crate::error::ConnectError;
use crate::settings::Credentials;

/// Bounded retry budget for association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_ms: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            attempts: config.connect_attempts,
            delay_ms: config.connect_retry_delay_ms,
            backoff: config.connect_backoff,
        }
    }

    /// Wait after the `attempt`-th (1-based) failed check.
    pub fn delay_for(&self, attempt: u32) -> u32 {
        match self.backoff {
            Backoff::Fixed => self.delay_ms,
            Backoff::Exponential { max_delay_ms } => {
                let factor = 1_u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                self.delay_ms.saturating_mul(factor).min(max_delay_ms)
            }
        }
    }

    /// Total time spent waiting if every attempt fails.
    pub fn budget_ms(&self) -> u32 {
        (1..=self.attempts).fold(0_u32, |acc, n| acc.saturating_add(self.delay_for(n)))
    }
}

pub struct ConnectivitySupervisor {
    credentials: Credentials,
    policy: RetryPolicy,
    state: ConnectionState,
    reconnects: u32,
}

impl ConnectivitySupervisor {
    pub fn new(credentials: Credentials, policy: RetryPolicy) -> Self {
        Self {
            credentials,
            policy,
            state: ConnectionState::Disconnected,
            reconnects: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Times the link had to be re-established after being up.
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }

    /// Return once the link is up, or fail after the retry budget.
    ///
    /// `Err` is fatal: the supervisor stays in [`ConnectionState::Failed`]
    /// and the caller must restart the process image.
    pub fn ensure_connected(
        &mut self,
        link: &mut impl ConnectivityPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<(), ConnectError> {
        if self.state == ConnectionState::Failed {
            return Err(ConnectError::RetriesExhausted {
                attempts: self.policy.attempts,
            });
        }

        if link.status() == ConnectionState::Connected {
            if self.state != ConnectionState::Connected {
                self.on_connected(0, link, sink);
            }
            return Ok(());
        }

        if self.state == ConnectionState::Connected {
            warn!("WiFi: connection lost, reconnecting");
            sink.emit(&AppEvent::LinkLost);
            self.reconnects += 1;
        }

        self.state = ConnectionState::Connecting;
        info!("WiFi: connecting to '{}'", self.credentials.ssid());

        for attempt in 1..=self.policy.attempts {
            let mut status = match link.status() {
                // An association is already in progress; just wait on it.
                ConnectionState::Connecting => ConnectionState::Connecting,
                _ => link.connect(&self.credentials),
            };

            if status != ConnectionState::Connected {
                delay.delay_ms(self.policy.delay_for(attempt));
                status = link.status();
            }

            if status == ConnectionState::Connected {
                self.on_connected(attempt, link, sink);
                return Ok(());
            }

            info!(
                "WiFi: attempt {}/{} status={:?} rssi={:?}",
                attempt,
                self.policy.attempts,
                status,
                link.signal_quality()
            );
        }

        error!(
            "WiFi: failed to connect after {} attempts, giving up",
            self.policy.attempts
        );
        self.state = ConnectionState::Failed;
        sink.emit(&AppEvent::LinkFailed {
            attempts: self.policy.attempts,
        });
        Err(ConnectError::RetriesExhausted {
            attempts: self.policy.attempts,
        })
    }

    fn on_connected(&mut self, attempts: u32, link: &impl ConnectivityPort, sink: &mut impl EventSink) {
        self.state = ConnectionState::Connected;
        let rssi = link.signal_quality();
        info!("WiFi: connected (attempts={}, RSSI={:?})", attempts, rssi);
        if let Some(net) = link.network_info() {
            info!(
                "WiFi: ip={} gateway={} netmask={} mac={:02X?}",
                net.ip, net.gateway, net.netmask, net.mac
            );
        }
        sink.emit(&AppEvent::LinkUp { attempts, rssi });
    }
}
