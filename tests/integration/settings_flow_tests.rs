//! Boot-time settings flow: provisioned values, NVS persistence, and the
//! report URL the agent ends up posting to.

use crate::mock_hw::{mock_io, MockNvs, RecordingSink};

use doorwatch::adapters::nvs::NvsAdapter;
use doorwatch::app::agent::Agent;
use doorwatch::app::ports::{ConfigError, ConfigPort};
use doorwatch::config::AgentConfig;
use doorwatch::settings::{resolve_network_settings, ProvisionedSettings};

fn provisioned() -> ProvisionedSettings<'static> {
    ProvisionedSettings {
        ssid: Some("ShopNet"),
        password: Some("hunter2hunter2"),
        server_host: Some("10.0.0.2"),
        server_port: Some("5000"),
        ..Default::default()
    }
}

#[test]
fn provisioned_settings_drive_the_report_url() {
    let mut nvs = MockNvs::default();
    let settings = resolve_network_settings(&provisioned(), &mut nvs).unwrap();

    let mut io = mock_io(true);
    let mut sink = RecordingSink::default();
    let agent = Agent::start(AgentConfig::default(), &settings, 0, &mut io, &mut sink).unwrap();

    assert_eq!(agent.report_url(), "http://10.0.0.2:5000/update_door_status");
    assert_eq!(io.http.urls, vec!["http://10.0.0.2:5000/update_door_status"]);
}

#[test]
fn second_boot_without_provisioning_uses_stored_values() {
    let mut nvs = NvsAdapter::new().unwrap();
    let first = resolve_network_settings(&provisioned(), &mut nvs).unwrap();
    let second = resolve_network_settings(&ProvisionedSettings::default(), &mut nvs).unwrap();
    assert_eq!(first, second);
}

#[test]
fn enterprise_credentials_round_trip_through_storage() {
    let mut nvs = MockNvs::default();
    let fresh = ProvisionedSettings {
        ssid: Some("eduroam"),
        password: Some("s3cret"),
        eap_identity: Some("anonymous@uni.edu"),
        eap_username: Some("jdoe@uni.edu"),
        server_host: Some("status.uni.edu"),
        server_path: Some("/update_shop_status"),
        ..Default::default()
    };
    let settings = resolve_network_settings(&fresh, &mut nvs).unwrap();
    assert!(settings.credentials.is_enterprise());
    assert_eq!(settings.server.url(), "http://status.uni.edu/update_shop_status");

    let reloaded = resolve_network_settings(&ProvisionedSettings::default(), &mut nvs).unwrap();
    assert_eq!(reloaded, settings);
}

#[test]
fn nothing_provisioned_or_stored_is_an_error() {
    let mut nvs = MockNvs::default();
    assert_eq!(
        resolve_network_settings(&ProvisionedSettings::default(), &mut nvs),
        Err(ConfigError::NotFound("WiFi SSID"))
    );
    assert_eq!(nvs.writes, 0);
}

#[test]
fn invalid_image_settings_are_not_written_to_storage() {
    let mut nvs = MockNvs::default();
    let fresh = ProvisionedSettings {
        ssid: Some("ShopNet"),
        password: Some("hunter2hunter2"),
        server_host: Some("10.0.0.2"),
        server_port: Some("0"),
        ..Default::default()
    };
    assert!(matches!(
        resolve_network_settings(&fresh, &mut nvs),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert_eq!(nvs.writes, 0);
}

#[test]
fn reprovisioned_network_drops_old_enterprise_identity() {
    let mut nvs = NvsAdapter::new().unwrap();
    let campus = ProvisionedSettings {
        ssid: Some("eduroam"),
        password: Some("s3cret"),
        eap_username: Some("jdoe@uni.edu"),
        server_host: Some("status.uni.edu"),
        ..Default::default()
    };
    resolve_network_settings(&campus, &mut nvs).unwrap();

    let settings = resolve_network_settings(&provisioned(), &mut nvs).unwrap();
    assert!(!settings.credentials.is_enterprise());
    assert_eq!(settings.server.url(), "http://10.0.0.2:5000/update_door_status");

    let reboot = resolve_network_settings(&ProvisionedSettings::default(), &mut nvs).unwrap();
    assert_eq!(reboot, settings);
}

#[test]
fn persisted_agent_config_is_used_on_next_boot() {
    let nvs = NvsAdapter::new().unwrap();
    let tuned = AgentConfig {
        heartbeat_interval_ms: 15_000,
        debounce_ms: 200,
        poll_interval_ms: 20,
        ..Default::default()
    };
    nvs.save(&tuned).unwrap();

    let mut io = mock_io(true);
    let mut sink = RecordingSink::default();
    let settings = resolve_network_settings(&provisioned(), &mut MockNvs::default()).unwrap();
    let mut agent = Agent::start(nvs.load_or_default(), &settings, 0, &mut io, &mut sink).unwrap();

    assert_eq!(agent.config().heartbeat_interval_ms, 15_000);
    let out = agent.tick(15_000, &mut io, &mut sink).unwrap();
    assert!(out.report.is_some());
}
