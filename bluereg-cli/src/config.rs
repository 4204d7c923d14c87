use anyhow::{Context, Result};
use bluereg_core::BluezConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    pub bluez: BluezConfig,
    pub scan: ScanConfig,
    pub driver: DriverConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub duration_secs: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Device exercised by `run` when none is given on the command line.
    pub device: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { duration_secs: 5 }
    }
}

impl CliConfig {
    pub fn load(path: &str) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).with_context(|| format!("invalid config file {}", path)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path)),
        }
    }
}
