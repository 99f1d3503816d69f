//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the door agent.
//!
//! - Config validation: [`AgentConfig::validate`] runs before every save
//!   and after every load, so a corrupt or stale blob never reaches the
//!   agent.
//! - Namespace isolation: agent config lives in `"doorwatch"`, network
//!   settings in `"net"` (see [`crate::settings`]).
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit().

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::AgentConfig;
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

const CONFIG_NAMESPACE: &str = "doorwatch";
const CONFIG_KEY: &str = "agentcfg";

/// NVS keys and namespaces are limited to 15 characters + NUL.
const NVS_NAME_MAX: usize = 15;
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;
/// Longest string value we accept back from flash.
#[cfg(target_os = "espidf")]
const MAX_STR_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of a namespace or key name.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

fn check_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.len() > NVS_NAME_MAX {
        return Err(StorageError::InvalidValue);
    }
    Ok(())
}

fn decode_config(bytes: &[u8]) -> Result<AgentConfig, ConfigError> {
    let cfg: AgentConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    cfg.validate()?;
    Ok(cfg)
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<AgentConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            match self.store.borrow().get(&key) {
                Some(bytes) => {
                    let cfg = decode_config(bytes)?;
                    info!("NvsAdapter: loaded config from store");
                    Ok(cfg)
                }
                None => Err(ConfigError::NotFound("agent config")),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let key = Self::c_name(CONFIG_KEY);
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(handle, key.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg = decode_config(&bytes)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(ConfigError::NotFound("agent config")),
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }

    fn save(&self, config: &AgentConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let key = Self::c_name(CONFIG_KEY);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl StoragePort for NvsAdapter {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        check_name(namespace)?;
        check_name(key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => String::from_utf8(data.clone())
                    .map(Some)
                    .map_err(|_| StorageError::InvalidValue),
                None => Ok(None),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let mut buf = [0u8; MAX_STR_SIZE];
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_str(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                // `size` includes the terminating NUL.
                let len = size.saturating_sub(1);
                Ok(core::str::from_utf8(&buf[..len]).map(str::to_owned))
            });
            match result {
                Ok(Ok(value)) => Ok(Some(value)),
                Ok(Err(_)) => Err(StorageError::InvalidValue),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
                Err(e) => {
                    warn!("NvsAdapter: get {}/{} failed ({})", namespace, key, e);
                    Err(StorageError::IoError)
                }
            }
        }
    }

    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        check_name(namespace)?;
        check_name(key)?;
        if value.contains('\0') {
            return Err(StorageError::InvalidValue);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store
                .borrow_mut()
                .insert(composite, value.as_bytes().to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            if value.len() >= MAX_STR_SIZE {
                return Err(StorageError::InvalidValue);
            }
            let mut c_value = Vec::with_capacity(value.len() + 1);
            c_value.extend_from_slice(value.as_bytes());
            c_value.push(0);

            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_set_str(handle, key_buf.as_ptr() as *const _, c_value.as_ptr() as *const _)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        check_name(namespace)?;
        check_name(key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe { nvs_erase_key(handle, key_buf.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }
}

impl NvsAdapter {
    /// Load the persisted config, falling back to compiled-in defaults when
    /// nothing usable is stored.
    pub fn load_or_default(&self) -> AgentConfig {
        match self.load() {
            Ok(cfg) => cfg,
            Err(ConfigError::NotFound(_)) => {
                info!("NvsAdapter: no stored config, using defaults");
                AgentConfig::default()
            }
            Err(e) => {
                log::warn!("NvsAdapter: stored config rejected ({}), using defaults", e);
                AgentConfig::default()
            }
        }
    }
}
