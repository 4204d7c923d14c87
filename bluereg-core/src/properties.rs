use dbus::arg::Variant;
use dbus::Path;

use crate::bus::{BusSession, Transport};
use crate::error::{Error, Result};

pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// `org.freedesktop.DBus.Properties.Get` for a string-typed property.
pub fn get_string<T: Transport>(
    bus: &BusSession<T>,
    object: &Path<'_>,
    interface: &str,
    property: &str,
) -> Result<String> {
    let reply = bus.call(object, PROPERTIES_INTERFACE, "Get", |m| m.append2(interface, property))?;
    let value: Variant<String> = reply
        .read1()
        .map_err(|e| Error::decode("string property", e))?;
    Ok(value.0)
}
