use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the BlueZ service lives on the bus and how long to wait for it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BluezConfig {
    pub service: String,
    pub adapter: String,
    pub adapter_interface: String,
    pub device_interface: String,
    pub call_timeout_ms: u64,
    /// Used for `Connect` and `Pair`, which wait on the remote device.
    pub lifecycle_timeout_ms: u64,
}

impl Default for BluezConfig {
    fn default() -> Self {
        Self {
            service: "org.bluez".to_string(),
            adapter: "/org/bluez/hci0".to_string(),
            adapter_interface: "org.bluez.Adapter1".to_string(),
            device_interface: "org.bluez.Device1".to_string(),
            call_timeout_ms: 5_000,
            lifecycle_timeout_ms: 30_000,
        }
    }
}

impl BluezConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn lifecycle_timeout(&self) -> Duration {
        Duration::from_millis(self.lifecycle_timeout_ms)
    }
}
