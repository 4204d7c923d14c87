/*!
 * Scan Orchestrator
 * Discovery window, object tree walk, classification, registry population
 */

use dbus::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::address::derive_address;
use crate::bus::{BusSession, Transport};
use crate::classifier::DeviceClassifier;
use crate::config::BluezConfig;
use crate::error::{Error, Result};
use crate::properties;
use crate::registry::{Device, DeviceRegistry};
use crate::scanner::ObjectTreeScanner;
use crate::ObjectPath;

pub struct ScanOrchestrator<'a, T> {
    bus: &'a BusSession<T>,
    adapter: ObjectPath,
    adapter_interface: String,
    classifier: DeviceClassifier,
    registry: DeviceRegistry,
}

impl<'a, T: Transport> ScanOrchestrator<'a, T> {
    pub fn new(bus: &'a BusSession<T>, config: &BluezConfig) -> Result<Self> {
        let adapter = Path::new(config.adapter.clone()).map_err(|reason| Error::InvalidName {
            name: config.adapter.clone(),
            reason,
        })?;

        Ok(Self {
            bus,
            adapter,
            adapter_interface: config.adapter_interface.clone(),
            classifier: DeviceClassifier::new(config.device_interface.clone()),
            registry: DeviceRegistry::new(),
        })
    }

    pub fn adapter(&self) -> &ObjectPath {
        &self.adapter
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> DeviceRegistry {
        self.registry
    }

    /// Run one scan pass: discover for `window`, then rebuild the registry
    /// from the object tree.
    ///
    /// Only a failed tree enumeration fails the pass; the registry is left
    /// empty in that case.
    pub fn scan(&mut self, window: Duration) -> Result<&DeviceRegistry> {
        self.run_discovery(window);

        self.registry.reset();
        let objects = ObjectTreeScanner::new(self.bus).enumerate_objects()?;

        for object in objects {
            if !self.classifier.is_device(self.bus, &object) {
                continue;
            }
            if let Some(device) = self.resolve_device(object) {
                debug!("Registered {} ({})", device.address(), device.display_name());
                self.registry.append(device);
            }
        }

        info!("Scan complete: {} devices", self.registry.count());
        Ok(&self.registry)
    }

    fn run_discovery(&self, window: Duration) {
        info!("Starting {}s discovery on {}", window.as_secs(), self.adapter);
        let started = match self.adapter_call("StartDiscovery") {
            Ok(()) => true,
            Err(e) if e.remote().map_or(false, |r| r.is("InProgress")) => {
                debug!("Discovery already in progress");
                true
            }
            Err(e) => {
                warn!("StartDiscovery failed: {}", e);
                false
            }
        };

        if started {
            std::thread::sleep(window);
        }

        // Stop even if start failed so the adapter is not left discovering.
        match self.adapter_call("StopDiscovery") {
            Ok(()) => {}
            Err(e) if e.remote().map_or(false, |r| r.is("NotReady") || r.is("Failed")) => {
                debug!("StopDiscovery: {}", e)
            }
            Err(e) => warn!("StopDiscovery failed: {}", e),
        }
    }

    fn adapter_call(&self, method: &str) -> Result<()> {
        self.bus
            .call(&self.adapter, &self.adapter_interface, method, |m| m)
            .map(drop)
    }

    fn resolve_device(&self, object: ObjectPath) -> Option<Device> {
        let interface = self.classifier.device_interface();

        let address = match derive_address(&object) {
            Ok(address) => address,
            Err(e) => match properties::get_string(self.bus, &object, interface, "Address") {
                Ok(address) => address,
                Err(prop_err) => {
                    warn!("Skipping {}: {}; Address property: {}", object, e, prop_err);
                    return None;
                }
            },
        };

        let name = match properties::get_string(self.bus, &object, interface, "Name") {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("Could not read name of {}: {}", object, e);
                None
            }
        };

        Some(Device::new(object, address, name))
    }
}
