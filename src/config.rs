//! Agent configuration parameters
//!
//! Timing and wire-format tunables for the door agent.  Defaults are
//! compiled in; a validated copy may be persisted to NVS and is loaded
//! once at boot.  Network credentials live in [`crate::settings`].

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::scheduler::DEFAULT_HEARTBEAT_MS;
use crate::sensors::debounce::DEFAULT_DEBOUNCE_MS;

/// Retry spacing for network association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Wait `connect_retry_delay_ms` between every attempt.
    Fixed,
    /// Double the delay after each failed attempt, capped at `max_delay_ms`.
    Exponential { max_delay_ms: u32 },
}

/// JSON shape of the report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireFormat {
    /// `{"state":"OPEN"}` / `{"state":"CLOSED"}`
    Text,
    /// `{"state":1}` / `{"state":0}`
    Numeric,
    /// `{"shop-status":"OPEN"}`, as the shop-status server expects.
    ShopStatus,
}

/// Core agent configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    // --- Sensing ---
    /// Raw signal must hold a new level this long before it is accepted (ms)
    pub debounce_ms: u32,
    /// Input sampling period (ms); at most half the debounce window
    pub poll_interval_ms: u32,
    /// Raw GPIO level that means "door open"
    pub open_level: bool,

    // --- Reporting ---
    /// Heartbeat report period when no edges occur (ms)
    pub heartbeat_interval_ms: u32,
    /// Report body schema
    pub wire_format: WireFormat,
    /// HTTP request timeout (ms)
    pub http_timeout_ms: u32,

    // --- Connectivity ---
    /// Association attempts before the agent gives up and restarts
    pub connect_attempts: u32,
    /// Base wait between association attempts (ms)
    pub connect_retry_delay_ms: u32,
    /// Retry spacing policy
    pub connect_backoff: Backoff,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            // Sensing
            debounce_ms: DEFAULT_DEBOUNCE_MS as u32,
            poll_interval_ms: 50, // 20 Hz
            open_level: true,     // reed switch to GND, pull-up: HIGH = open

            // Reporting
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_MS as u32, // 1/min
            wire_format: WireFormat::Text,
            http_timeout_ms: 10_000,

            // Connectivity
            connect_attempts: 10,
            connect_retry_delay_ms: 1_000,
            connect_backoff: Backoff::Fixed,
        }
    }
}

impl AgentConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_ms must be > 0"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.debounce_ms / 2 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 1..=debounce_ms/2",
            ));
        }
        if self.heartbeat_interval_ms < 1_000 || self.heartbeat_interval_ms <= self.debounce_ms {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_interval_ms must be >= 1000 and > debounce_ms",
            ));
        }
        if self.connect_attempts == 0 {
            return Err(ConfigError::ValidationFailed("connect_attempts must be > 0"));
        }
        if !(1..=60_000).contains(&self.connect_retry_delay_ms) {
            return Err(ConfigError::ValidationFailed(
                "connect_retry_delay_ms must be 1–60000",
            ));
        }
        if let Backoff::Exponential { max_delay_ms } = self.connect_backoff {
            if max_delay_ms < self.connect_retry_delay_ms {
                return Err(ConfigError::ValidationFailed(
                    "backoff max_delay_ms must be >= connect_retry_delay_ms",
                ));
            }
        }
        if !(100..=60_000).contains(&self.http_timeout_ms) {
            return Err(ConfigError::ValidationFailed("http_timeout_ms must be 100–60000"));
        }
        Ok(())
    }
}
