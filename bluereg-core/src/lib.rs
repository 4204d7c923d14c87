/*!
 * BLUEREG Core
 * Bluetooth device discovery and registry over the BlueZ D-Bus API
 */

pub mod address;
pub mod bus;
pub mod classifier;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod properties;
pub mod registry;
pub mod scanner;
pub mod session;

#[cfg(test)]
mod testing;

/// Path of an object exposed by the remote service. Valid for the current
/// bus session only; BlueZ may reuse paths later.
pub type ObjectPath = dbus::Path<'static>;

pub use address::{derive_address, device_path};
pub use bus::{BusSession, Transport};
pub use classifier::DeviceClassifier;
pub use config::BluezConfig;
pub use error::{Error, RemoteError, Result};
pub use orchestrator::ScanOrchestrator;
pub use registry::{Device, DeviceRegistry, UNKNOWN_NAME};
pub use scanner::ObjectTreeScanner;
pub use session::{DeviceSession, Operation};
