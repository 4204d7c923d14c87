/*!
 * Device Classifier
 * Decides from introspection data whether an object is a Bluetooth device
 */

use dbus::Path;
use tracing::{debug, warn};

use crate::bus::{BusSession, Transport};
use crate::error::{Error, Result};

pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";

pub struct DeviceClassifier {
    device_interface: String,
}

impl DeviceClassifier {
    pub fn new(device_interface: impl Into<String>) -> Self {
        Self {
            device_interface: device_interface.into(),
        }
    }

    pub fn device_interface(&self) -> &str {
        &self.device_interface
    }

    /// Whether `object` likely exposes the device interface.
    ///
    /// A substring match on the introspection XML. Objects that fail to
    /// introspect (typically because they vanished since enumeration) are
    /// not devices.
    pub fn is_device<T: Transport>(&self, bus: &BusSession<T>, object: &Path<'_>) -> bool {
        match self.introspect(bus, object) {
            Ok(xml) => {
                let found = xml.contains(self.device_interface.as_str());
                debug!("{} {} {}", object, if found { "exposes" } else { "lacks" }, self.device_interface);
                found
            }
            Err(e) => {
                warn!("Introspection of {} failed, treating as non-device: {}", object, e);
                false
            }
        }
    }

    fn introspect<T: Transport>(&self, bus: &BusSession<T>, object: &Path<'_>) -> Result<String> {
        let reply = bus.call(object, INTROSPECTABLE_INTERFACE, "Introspect", |m| m)?;
        reply
            .read1::<String>()
            .map_err(|e| Error::decode("introspection data", e))
    }
}
