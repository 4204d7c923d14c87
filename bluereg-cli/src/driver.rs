/*!
 * Bluetooth Device Driver
 * Scan reporting and lifecycle sequences on top of bluereg-core
 */

use anyhow::{Context, Result};
use bluereg_core::{device_path, BusSession, Device, DeviceSession, ObjectPath, Operation, Transport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// The order `run` exercises a device in.
pub const LIFECYCLE: [Operation; 4] = [
    Operation::Connect,
    Operation::Pair,
    Operation::Unpair,
    Operation::Disconnect,
];

#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub scanned_at: DateTime<Utc>,
    pub adapter: &'a str,
    pub devices: &'a [Device],
}

/// Accept either an object path or a colon-separated address.
pub fn resolve_target(adapter: &str, target: &str) -> Result<ObjectPath> {
    if target.starts_with('/') {
        ObjectPath::new(target.to_string())
            .map_err(|reason| anyhow::anyhow!("invalid object path {:?}: {}", target, reason))
    } else {
        device_path(adapter, target).with_context(|| format!("cannot resolve device {:?}", target))
    }
}

/// `address<TAB>name`, one device per line.
pub fn write_table<W: Write>(out: &mut W, devices: &[Device]) -> Result<()> {
    for device in devices {
        writeln!(out, "{}\t{}", device.address(), device.display_name())?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, report: &ScanReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Run each operation in turn, logging failures and carrying on.
/// Returns how many failed; if the bus drops, the rest count as failed.
pub fn run_sequence<T: Transport>(
    bus: &BusSession<T>,
    session: &DeviceSession<'_, T>,
    device: &ObjectPath,
    operations: &[Operation],
) -> usize {
    let mut failures = 0;
    for (i, &operation) in operations.iter().enumerate() {
        match session.invoke(operation, device) {
            Ok(()) => tracing::info!("{} succeeded for {}", operation, device),
            Err(e) => {
                tracing::error!("{}", e);
                failures += 1;
                if !bus.is_open() {
                    tracing::error!("Bus session closed, abandoning remaining operations");
                    return failures + operations.len() - i - 1;
                }
            }
        }
    }
    failures
}
