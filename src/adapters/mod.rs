//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                     |
//! |------------|-------------------|---------------------------------|
//! | `gpio`     | DoorInputPort     | ESP32 GPIO (reed switch)        |
//! | `http`     | HttpTransport     | ESP-IDF HTTP client             |
//! | `log_sink` | EventSink         | Serial log output               |
//! | `nvs`      | ConfigPort        | NVS / in-memory store           |
//! |            | StoragePort       |                                 |
//! | `system`   | (none)            | Chip restart                    |
//! | `time`     | DelayNs           | ESP32 system timer / FreeRTOS   |
//! | `wifi`     | ConnectivityPort  | ESP-IDF WiFi STA (PSK / PEAP)   |

pub mod gpio;
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod system;
pub mod time;
pub mod wifi;
