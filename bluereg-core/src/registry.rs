/*!
 * Device Registry
 * Devices found by the last scan pass, in discovery order
 */

use serde::{Serialize, Serializer};

use crate::ObjectPath;

/// Shown when a device's name could not be read.
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    #[serde(serialize_with = "serialize_path")]
    object_path: ObjectPath,
    address: String,
    name: Option<String>,
}

impl Device {
    pub fn new(object_path: ObjectPath, address: String, name: Option<String>) -> Self {
        Self {
            object_path,
            address,
            name,
        }
    }

    pub fn object_path(&self) -> &ObjectPath {
        &self.object_path
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The remote name, if BlueZ reported one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNKNOWN_NAME)
    }
}

fn serialize_path<S: Serializer>(path: &ObjectPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(path)
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every device. Called at the start of each scan pass.
    pub fn reset(&mut self) {
        self.devices.clear();
    }

    pub fn append(&mut self, device: Device) {
        self.devices.push(device);
    }

    pub fn all(&self) -> &[Device] {
        &self.devices
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Case-insensitive lookup by colon address.
    pub fn find_by_address(&self, address: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.address.eq_ignore_ascii_case(address))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
