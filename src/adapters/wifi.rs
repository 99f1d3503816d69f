//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! association.  Retry policy lives in the
//! [`ConnectivitySupervisor`](crate::connectivity::ConnectivitySupervisor);
//! this adapter only issues requests and reports status.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi`, with WPA2-Enterprise (PEAP) through the
//!   `esp_eap_client` API.
//! - **all other targets**: deterministic simulation for host-side runs.

use log::{info, warn};

use crate::app::ports::{ConnectionState, ConnectivityPort, NetworkInfo};
use crate::settings::Credentials;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    configured_ssid: heapless::String<32>,

    /// Simulation: counts connect() calls for deterministic failures.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_state: ConnectionState,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            wifi,
            configured_ssid: heapless::String::new(),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            sim_connect_counter: 0,
            sim_state: ConnectionState::Disconnected,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn apply_credentials(&mut self, credentials: &Credentials) -> Result<(), esp_idf_svc::sys::EspError> {
        use esp_idf_svc::sys::{
            esp, esp_eap_client_set_identity, esp_eap_client_set_password,
            esp_eap_client_set_username, esp_wifi_sta_enterprise_enable,
        };

        if self.configured_ssid.as_str() == credentials.ssid() && self.wifi.is_started()? {
            return Ok(());
        }

        let config = match credentials {
            Credentials::Personal { ssid, password } => ClientConfiguration {
                ssid: ssid.clone(),
                password: password.clone(),
                auth_method: if password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            },
            Credentials::Enterprise { ssid, .. } => ClientConfiguration {
                ssid: ssid.clone(),
                auth_method: AuthMethod::WPA2Enterprise,
                ..Default::default()
            },
        };
        self.wifi.set_configuration(&Configuration::Client(config))?;

        if let Credentials::Enterprise {
            identity,
            username,
            password,
            ..
        } = credentials
        {
            // SAFETY: the EAP client copies each buffer before returning;
            // the pointers only need to live for the duration of the call.
            unsafe {
                esp!(esp_eap_client_set_identity(identity.as_ptr(), identity.len() as i32))?;
                esp!(esp_eap_client_set_username(username.as_ptr(), username.len() as i32))?;
                esp!(esp_eap_client_set_password(password.as_ptr(), password.len() as i32))?;
                esp!(esp_wifi_sta_enterprise_enable())?;
            }
        }

        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        self.configured_ssid = heapless::String::try_from(credentials.ssid()).unwrap_or_default();
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, credentials: &Credentials) -> ConnectionState {
        if let Err(e) = self.apply_credentials(credentials) {
            warn!("WiFi: driver configuration failed ({})", e);
            return ConnectionState::Failed;
        }
        // Non-blocking: association completes in the background and is
        // observed through status().
        match self.wifi.connect() {
            Ok(()) => ConnectionState::Connecting,
            Err(e) => {
                warn!("WiFi: connect request rejected ({})", e);
                ConnectionState::Disconnected
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, credentials: &Credentials) -> ConnectionState {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        // Every 10th attempt fails to exercise the supervisor's retry path.
        if self.sim_connect_counter % 10 == 3 {
            warn!(
                "WiFi(sim): simulated auth failure (attempt {})",
                self.sim_connect_counter
            );
            self.sim_state = ConnectionState::Disconnected;
            return self.sim_state;
        }
        info!(
            "WiFi(sim): associated with '{}' (attempt {})",
            credentials.ssid(),
            self.sim_connect_counter
        );
        self.sim_state = ConnectionState::Connected;
        self.sim_state
    }

    #[cfg(target_os = "espidf")]
    fn platform_status(&self) -> ConnectionState {
        let connected = self.wifi.is_connected().unwrap_or(false);
        let netif_up = self.wifi.sta_netif().is_up().unwrap_or(false);
        match (connected, netif_up) {
            (true, true) => ConnectionState::Connected,
            // Associated, waiting for DHCP.
            (true, false) => ConnectionState::Connecting,
            _ => ConnectionState::Disconnected,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_status(&self) -> ConnectionState {
        self.sim_state
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        use esp_idf_svc::sys::{esp_wifi_sta_get_ap_info, wifi_ap_record_t, ESP_OK};

        let mut ap_info: wifi_ap_record_t = Default::default();
        // SAFETY: ap_info is a valid, writable record for the driver to fill.
        let ret = unsafe { esp_wifi_sta_get_ap_info(&mut ap_info) };
        (ret == ESP_OK).then_some(ap_info.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        if self.sim_state != ConnectionState::Connected {
            return None;
        }
        // Oscillate between -66 and -55 dBm.
        let oscillation = ((self.sim_connect_counter % 12) as i8) - 6;
        Some(-60_i8.saturating_add(oscillation))
    }

    /// Simulation: drop the association as if the AP went away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        warn!("WiFi(sim): link dropped");
        self.sim_state = ConnectionState::Disconnected;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self, credentials: &Credentials) -> ConnectionState {
        self.platform_connect(credentials)
    }

    fn status(&self) -> ConnectionState {
        self.platform_status()
    }

    fn signal_quality(&self) -> Option<i8> {
        self.platform_rssi()
    }

    #[cfg(target_os = "espidf")]
    fn disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed ({})", e);
        }
        info!("WiFi: disconnected");
    }

    #[cfg(not(target_os = "espidf"))]
    fn disconnect(&mut self) {
        self.sim_state = ConnectionState::Disconnected;
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn network_info(&self) -> Option<NetworkInfo> {
        use core::net::Ipv4Addr;

        let netif = self.wifi.sta_netif();
        let ip_info = netif.get_ip_info().ok()?;
        let mac = netif.get_mac().ok()?;
        let prefix = u32::from(ip_info.subnet.mask.0);
        let netmask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
        Some(NetworkInfo {
            ip: ip_info.ip,
            gateway: ip_info.subnet.gateway,
            netmask: Ipv4Addr::from(netmask),
            mac,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn network_info(&self) -> Option<NetworkInfo> {
        use core::net::Ipv4Addr;

        (self.sim_state == ConnectionState::Connected).then_some(NetworkInfo {
            ip: Ipv4Addr::new(192, 168, 4, 20),
            gateway: Ipv4Addr::new(192, 168, 4, 1),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            mac: [0x02, 0x00, 0x00, 0xD0, 0x0D, 0x01],
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
