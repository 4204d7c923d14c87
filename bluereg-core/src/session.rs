/*!
 * Device Session
 * Connect, pair, unpair and disconnect calls against one device object
 */

use dbus::Path;
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::bus::{BusSession, Transport};
use crate::config::BluezConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Pair,
    Unpair,
    Disconnect,
}

impl Operation {
    /// The `org.bluez.Device1` method behind this operation.
    pub fn method(self) -> &'static str {
        match self {
            Operation::Connect => "Connect",
            Operation::Pair => "Pair",
            Operation::Unpair => "CancelPairing",
            Operation::Disconnect => "Disconnect",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Connect => "connect",
            Operation::Pair => "pair",
            Operation::Unpair => "unpair",
            Operation::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

/// Stateless dispatcher: no state checks before the call, no retries after.
pub struct DeviceSession<'a, T> {
    bus: &'a BusSession<T>,
    device_interface: String,
    lifecycle_timeout: Duration,
}

impl<'a, T: Transport> DeviceSession<'a, T> {
    pub fn new(bus: &'a BusSession<T>, config: &BluezConfig) -> Self {
        Self {
            bus,
            device_interface: config.device_interface.clone(),
            lifecycle_timeout: config.lifecycle_timeout(),
        }
    }

    pub fn connect(&self, device: &Path<'_>) -> Result<()> {
        self.invoke(Operation::Connect, device)
    }

    pub fn pair(&self, device: &Path<'_>) -> Result<()> {
        self.invoke(Operation::Pair, device)
    }

    /// Abort a pairing in progress (`CancelPairing`).
    pub fn unpair(&self, device: &Path<'_>) -> Result<()> {
        self.invoke(Operation::Unpair, device)
    }

    pub fn disconnect(&self, device: &Path<'_>) -> Result<()> {
        self.invoke(Operation::Disconnect, device)
    }

    pub fn invoke(&self, operation: Operation, device: &Path<'_>) -> Result<()> {
        info!("Requesting {} for device: {}", operation, device);

        let result = match operation {
            // These wait on the remote device.
            Operation::Connect | Operation::Pair => self.bus.call_with_timeout(
                device,
                &self.device_interface,
                operation.method(),
                self.lifecycle_timeout,
                |m| m,
            ),
            Operation::Unpair | Operation::Disconnect => {
                self.bus
                    .call(device, &self.device_interface, operation.method(), |m| m)
            }
        };

        result.map(drop).map_err(|cause| Error::OperationFailed {
            operation,
            identifier: device.to_string(),
            cause: Box::new(cause),
        })
    }
}
