//! Network credentials and server address.
//!
//! Resolved once at boot from two sources, per field:
//!
//! 1. values provisioned into the firmware image at build time
//!    (`DOORWATCH_*` environment variables), and
//! 2. values persisted in NVS by a previous boot.
//!
//! Fields travel in two groups: the WiFi network (SSID, password, EAP
//! identity and username) and the server (host, port, path).  Provisioning
//! a group's first field replaces that whole group, so credentials for an
//! old network never leak into a new one.  Otherwise each field falls back
//! to its stored value.  Provisioned values are written back to NVS after
//! the merged result validates, so a later image built without them keeps
//! working.  The result is read-only for the rest of the process lifetime.

use core::fmt;

use log::{info, warn};

use crate::app::ports::{ConfigError, StoragePort};

const NET_NAMESPACE: &str = "net";

const KEY_SSID: &str = "ssid";
const KEY_PASSWORD: &str = "password";
const KEY_EAP_IDENTITY: &str = "eap_ident";
const KEY_EAP_USERNAME: &str = "eap_user";
const KEY_HOST: &str = "host";
const KEY_PORT: &str = "port";
const KEY_PATH: &str = "path";

/// Endpoint used when no path is configured.
pub const DEFAULT_PATH: &str = "/update_door_status";

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

/// WiFi station credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// WPA2-Personal, or an open network when `password` is empty.
    Personal {
        ssid: heapless::String<32>,
        password: heapless::String<64>,
    },
    /// WPA2-Enterprise (PEAP).
    Enterprise {
        ssid: heapless::String<32>,
        identity: heapless::String<64>,
        username: heapless::String<64>,
        password: heapless::String<64>,
    },
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn bounded<const N: usize>(s: &str, err: &'static str) -> Result<heapless::String<N>, ConfigError> {
    heapless::String::try_from(s).map_err(|_| ConfigError::ValidationFailed(err))
}

fn validate_ssid(ssid: &str) -> Result<heapless::String<32>, ConfigError> {
    if ssid.is_empty() || !is_printable_ascii(ssid) {
        return Err(ConfigError::ValidationFailed(
            "SSID must be 1-32 printable ASCII bytes",
        ));
    }
    bounded(ssid, "SSID must be 1-32 printable ASCII bytes")
}

impl Credentials {
    pub fn personal(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        if !password.is_empty() && !(8..=64).contains(&password.len()) {
            return Err(ConfigError::ValidationFailed(
                "password must be 8-64 bytes for WPA2, or empty for open",
            ));
        }
        Ok(Self::Personal {
            ssid: validate_ssid(ssid)?,
            password: bounded(password, "password too long")?,
        })
    }

    pub fn enterprise(
        ssid: &str,
        identity: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, ConfigError> {
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "enterprise username and password must be non-empty",
            ));
        }
        // PEAP falls back to the username as the outer identity.
        let identity = if identity.is_empty() { username } else { identity };
        Ok(Self::Enterprise {
            ssid: validate_ssid(ssid)?,
            identity: bounded(identity, "EAP identity too long")?,
            username: bounded(username, "EAP username too long")?,
            password: bounded(password, "EAP password too long")?,
        })
    }

    pub fn ssid(&self) -> &str {
        match self {
            Self::Personal { ssid, .. } | Self::Enterprise { ssid, .. } => ssid.as_str(),
        }
    }

    pub fn is_enterprise(&self) -> bool {
        matches!(self, Self::Enterprise { .. })
    }
}

// Secrets never reach the log.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal { ssid, password } => f
                .debug_struct("Personal")
                .field("ssid", ssid)
                .field("open", &password.is_empty())
                .finish_non_exhaustive(),
            Self::Enterprise {
                ssid,
                identity,
                username,
                ..
            } => f
                .debug_struct("Enterprise")
                .field("ssid", ssid)
                .field("identity", identity)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Server address
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    host: heapless::String<64>,
    port: Option<u16>,
    path: heapless::String<64>,
}

impl ServerAddress {
    /// `path` is normalised to exactly one leading `/`.
    pub fn new(host: &str, port: Option<u16>, path: &str) -> Result<Self, ConfigError> {
        let host = host.trim();
        if host.is_empty() || host.contains('/') || host.contains(' ') {
            return Err(ConfigError::ValidationFailed("server host must be a bare hostname or IP"));
        }
        if port == Some(0) {
            return Err(ConfigError::ValidationFailed("server port must be 1-65535"));
        }
        let trimmed = path.trim().trim_start_matches('/');
        let mut normalised: heapless::String<64> = heapless::String::new();
        normalised
            .push('/')
            .and_then(|()| normalised.push_str(trimmed))
            .map_err(|()| ConfigError::ValidationFailed("server path too long"))?;
        Ok(Self {
            host: bounded(host, "server host too long")?,
            port,
            path: normalised,
        })
    }

    /// `http://<host>[:<port>]/<path>`
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("http://{}:{}{}", self.host, port, self.path),
            None => format!("http://{}{}", self.host, self.path),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Everything the agent needs to reach its server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub credentials: Credentials,
    pub server: ServerAddress,
}

// ───────────────────────────────────────────────────────────────
// Resolution
// ───────────────────────────────────────────────────────────────

/// Values supplied with the firmware image.  `None` = not provisioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionedSettings<'a> {
    pub ssid: Option<&'a str>,
    pub password: Option<&'a str>,
    pub eap_identity: Option<&'a str>,
    pub eap_username: Option<&'a str>,
    pub server_host: Option<&'a str>,
    pub server_port: Option<&'a str>,
    pub server_path: Option<&'a str>,
}

impl ProvisionedSettings<'static> {
    /// Values baked in from `DOORWATCH_*` at compile time.
    pub const fn from_build_env() -> Self {
        Self {
            ssid: option_env!("DOORWATCH_WIFI_SSID"),
            password: option_env!("DOORWATCH_WIFI_PASSWORD"),
            eap_identity: option_env!("DOORWATCH_EAP_IDENTITY"),
            eap_username: option_env!("DOORWATCH_EAP_USERNAME"),
            server_host: option_env!("DOORWATCH_SERVER_HOST"),
            server_port: option_env!("DOORWATCH_SERVER_PORT"),
            server_path: option_env!("DOORWATCH_SERVER_PATH"),
        }
    }
}

/// One resolved field and where it came from.
struct Field {
    key: &'static str,
    value: Option<String>,
    provisioned: bool,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn read_stored(store: &impl StoragePort, key: &'static str) -> Option<String> {
    match store.get(NET_NAMESPACE, key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Settings: could not read '{}' ({}), treating as unset", key, e);
            None
        }
    }
}

/// Resolve fields that belong together.  The first entry anchors the group:
/// once it is provisioned, every member comes from the image and a member
/// left out is cleared rather than filled from NVS.
fn resolve_group<const N: usize>(
    store: &impl StoragePort,
    fresh: [(&'static str, Option<&str>); N],
) -> [Field; N] {
    let anchored = fresh.first().is_some_and(|&(_, v)| non_empty(v).is_some());
    fresh.map(|(key, value)| match non_empty(value) {
        Some(v) => Field {
            key,
            value: Some(v.to_owned()),
            provisioned: true,
        },
        None if anchored => Field {
            key,
            value: None,
            provisioned: true,
        },
        None => Field {
            key,
            value: read_stored(store, key),
            provisioned: false,
        },
    })
}

/// Write provisioned fields back to NVS; cleared members are erased.
fn persist(store: &mut impl StoragePort, fields: &[Field]) {
    for field in fields.iter().filter(|f| f.provisioned) {
        let result = match &field.value {
            Some(value) => store.put(NET_NAMESPACE, field.key, value),
            None => store.delete(NET_NAMESPACE, field.key),
        };
        if let Err(e) = result {
            warn!("Settings: could not persist '{}' ({})", field.key, e);
        }
    }
}

fn build_settings(network: &[Field; 4], server: &[Field; 3]) -> Result<NetworkSettings, ConfigError> {
    let [ssid, password, identity, username] = network;
    let [host, port, path] = server;

    let ssid = ssid.value.as_deref().ok_or(ConfigError::NotFound("WiFi SSID"))?;
    let password = password.value.as_deref().unwrap_or("");
    let credentials = match (identity.value.as_deref(), username.value.as_deref()) {
        (None, None) => Credentials::personal(ssid, password)?,
        (identity, username) => Credentials::enterprise(
            ssid,
            identity.unwrap_or(""),
            username.or(identity).unwrap_or(""),
            password,
        )?,
    };

    let host = host.value.as_deref().ok_or(ConfigError::NotFound("server host"))?;
    let port = port
        .value
        .as_deref()
        .map(|p| {
            p.trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::ValidationFailed("server port must be 1-65535"))
        })
        .transpose()?;
    let server = ServerAddress::new(host, port, path.value.as_deref().unwrap_or(DEFAULT_PATH))?;

    Ok(NetworkSettings { credentials, server })
}

/// Merge provisioned and stored settings into a validated [`NetworkSettings`].
///
/// NVS is only written once the merged result validates, so a rejected
/// image leaves the previous settings in place.
pub fn resolve_network_settings(
    fresh: &ProvisionedSettings<'_>,
    store: &mut impl StoragePort,
) -> Result<NetworkSettings, ConfigError> {
    let network = resolve_group(
        &*store,
        [
            (KEY_SSID, fresh.ssid),
            (KEY_PASSWORD, fresh.password),
            (KEY_EAP_IDENTITY, fresh.eap_identity),
            (KEY_EAP_USERNAME, fresh.eap_username),
        ],
    );
    let server = resolve_group(
        &*store,
        [
            (KEY_HOST, fresh.server_host),
            (KEY_PORT, fresh.server_port),
            (KEY_PATH, fresh.server_path),
        ],
    );

    let settings = build_settings(&network, &server)?;
    persist(store, &network);
    persist(store, &server);

    info!(
        "Settings: SSID='{}' ({}), server={}",
        settings.credentials.ssid(),
        if settings.credentials.is_enterprise() { "enterprise" } else { "personal" },
        settings.server.url()
    );

    Ok(settings)
}
