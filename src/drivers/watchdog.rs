//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the main loop
//! stalls.  The timeout must exceed the longest a single tick may block
//! (see [`watchdog_timeout_ms`]); the main loop calls `feed()` once per
//! iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::config::AgentConfig;
use crate::connectivity::RetryPolicy;

/// Headroom on top of the worst-case tick for logging and scheduling jitter.
const WATCHDOG_SLACK_MS: u32 = 5_000;

/// The HTTP client timeout applies to each blocking socket phase of a
/// report: connect, send, receive.
const HTTP_BLOCKING_PHASES: u32 = 3;

/// Worst-case blocking of one tick (full connect retry budget plus one
/// report with every HTTP phase running to its timeout), with slack.
pub fn watchdog_timeout_ms(config: &AgentConfig) -> u32 {
    RetryPolicy::from_config(config)
        .budget_ms()
        .saturating_add(config.http_timeout_ms.saturating_mul(HTTP_BLOCKING_PHASES))
        .saturating_add(config.poll_interval_ms)
        .saturating_add(WATCHDOG_SLACK_MS)
}

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): no-op ({}ms)", timeout_ms);
            Self {}
        }
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
