/*!
 * Object Tree Scanner
 * Flattens the ObjectManager tree into its list of object paths
 */

use dbus::arg::ArgType;
use dbus::{Message, Path};
use tracing::debug;

use crate::bus::{BusSession, Transport};
use crate::error::{Error, Result};
use crate::ObjectPath;

pub const OBJECT_MANAGER_INTERFACE: &str = "org.freedesktop.DBus.ObjectManager";
const MANAGED_OBJECTS_SIGNATURE: &str = "a{oa{sa{sv}}}";
const INTERFACE_MAP_SIGNATURE: &str = "a{sa{sv}}";

pub struct ObjectTreeScanner<'a, T> {
    bus: &'a BusSession<T>,
}

impl<'a, T: Transport> ObjectTreeScanner<'a, T> {
    pub fn new(bus: &'a BusSession<T>) -> Self {
        Self { bus }
    }

    /// Every object path the service manages, in the order it reported them.
    ///
    /// Any failure, remote or decode, discards the whole result.
    pub fn enumerate_objects(&self) -> Result<Vec<ObjectPath>> {
        let root = Path::from("/");
        let reply = self
            .bus
            .call(&root, OBJECT_MANAGER_INTERFACE, "GetManagedObjects", |m| m)
            .map_err(|e| Error::ScanFailed(Box::new(e)))?;

        let paths = object_paths(&reply).map_err(|e| Error::ScanFailed(Box::new(e)))?;
        debug!("GetManagedObjects reported {} objects", paths.len());
        Ok(paths)
    }
}

/// Read the outer keys of an `a{oa{sa{sv}}}` reply.
///
/// Interface maps are stepped over without being decoded.
pub fn object_paths(reply: &Message) -> Result<Vec<ObjectPath>> {
    let mut args = reply.iter_init();
    if args.arg_type() == ArgType::Invalid {
        return Err(Error::decode("managed object map", "empty reply"));
    }

    let signature = args.signature();
    if &*signature != MANAGED_OBJECTS_SIGNATURE {
        return Err(Error::decode(
            "managed object map",
            format!("expected {MANAGED_OBJECTS_SIGNATURE}, got {:?}", &*signature),
        ));
    }

    let mut entries = args
        .recurse(ArgType::Array)
        .ok_or_else(|| Error::decode("managed object map", "not an array"))?;

    let mut paths = Vec::new();
    loop {
        match entries.arg_type() {
            ArgType::Invalid => break,
            ArgType::DictEntry => {}
            other => {
                return Err(Error::decode(
                    "managed object entry",
                    format!("expected dict entry, got {other:?}"),
                ))
            }
        }

        let mut entry = entries
            .recurse(ArgType::DictEntry)
            .ok_or_else(|| Error::decode("managed object entry", "cannot open dict entry"))?;

        let path: Path = entry
            .read()
            .map_err(|e| Error::decode("managed object path", e))?;

        if entry.arg_type() != ArgType::Array || &*entry.signature() != INTERFACE_MAP_SIGNATURE {
            return Err(Error::decode(
                "interface map",
                format!("missing {INTERFACE_MAP_SIGNATURE} for {path}"),
            ));
        }

        paths.push(path.into_static());
        entries.next();
    }

    if args.next() {
        return Err(Error::decode("managed object map", "trailing arguments in reply"));
    }

    Ok(paths)
}
