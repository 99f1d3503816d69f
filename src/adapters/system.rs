//! System control adapter.
//!
//! The only recovery the agent has for a dead link is a full restart: every
//! piece of state is rebuilt from a fresh boot.

use log::error;

/// Restart the chip.  Never returns.
#[cfg(target_os = "espidf")]
pub fn restart(reason: &str) -> ! {
    error!("Restarting: {}", reason);
    // Give the UART a moment to drain the last log line.
    esp_idf_hal::delay::FreeRtos::delay_ms(100);
    // SAFETY: esp_restart has no preconditions and does not return.
    unsafe { esp_idf_svc::sys::esp_restart() }
}

/// Host stand-in: exit non-zero so a supervisor can relaunch the process.
#[cfg(not(target_os = "espidf"))]
pub fn restart(reason: &str) -> ! {
    error!("Restarting: {}", reason);
    std::process::exit(1)
}
