//! Doorwatch Firmware — Main Entry Point
//!
//! Polls a door contact, reports open/closed transitions to an HTTP
//! endpoint, and sends a heartbeat report once a minute.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  DoorContact      WifiAdapter        EspHttpTransport          │
//! │  (DoorInput)      (Connectivity)     (HttpTransport)           │
//! │  NvsAdapter       LogEventSink       TaskDelay                 │
//! │  (Config+Storage) (EventSink)        (DelayNs)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                 Agent (pure logic)                     │    │
//! │  │  Debouncer · EdgeDetector · Heartbeat · Supervisor     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Watchdog (TWDT) · restart on unrecoverable link loss          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::wifi::EspWifi;
use log::info;

use doorwatch::adapters::gpio::door_contact;
use doorwatch::adapters::http::EspHttpTransport;
use doorwatch::adapters::log_sink::LogEventSink;
use doorwatch::adapters::nvs::NvsAdapter;
use doorwatch::adapters::system::restart;
use doorwatch::adapters::time::{MonotonicClock, TaskDelay};
use doorwatch::adapters::wifi::WifiAdapter;
use doorwatch::app::agent::{Agent, AgentIo};
use doorwatch::drivers::watchdog::{watchdog_timeout_ms, Watchdog};
use doorwatch::pins;
use doorwatch::settings::{resolve_network_settings, ProvisionedSettings};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Doorwatch v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config + network settings from NVS ───────────
    let mut nvs = NvsAdapter::new().context("NVS init failed")?;
    let config = nvs.load_or_default();
    info!("{:?}", config);

    let settings = resolve_network_settings(&ProvisionedSettings::from_build_env(), &mut nvs)
        .context("network settings unavailable; set DOORWATCH_WIFI_SSID and DOORWATCH_SERVER_HOST")?;
    info!(
        "Network: ssid='{}' enterprise={} report_url={}",
        settings.credentials.ssid(),
        settings.credentials.is_enterprise(),
        settings.server.url()
    );

    // ── 3. Construct adapters ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let wifi = EspWifi::new(peripherals.modem, sysloop, None)?;

    let mut io = AgentIo {
        input: door_contact(pins::DOOR_SENSOR_GPIO)?,
        link: WifiAdapter::new(wifi),
        http: EspHttpTransport::new(config.http_timeout_ms),
        delay: TaskDelay,
    };
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let watchdog = Watchdog::new(watchdog_timeout_ms(&config));
    let poll_interval_ms = config.poll_interval_ms;

    // ── 4. Initial sample + first report ──────────────────────
    let mut agent = match Agent::start(config, &settings, clock.uptime_ms(), &mut io, &mut sink) {
        Ok(agent) => agent,
        Err(e) => restart(&e.to_string()),
    };
    info!("System ready. Reporting to {}", agent.report_url());

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        watchdog.feed();
        if let Err(e) = agent.tick(clock.uptime_ms(), &mut io, &mut sink) {
            info!("Final stats: {:?}", agent.stats());
            restart(&e.to_string());
        }
        io.delay.delay_ms(poll_interval_ms);
    }
}
