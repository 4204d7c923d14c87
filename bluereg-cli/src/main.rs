/*!
 * BLUEREG Bluetooth Device Manager
 * Scan, list and drive BlueZ devices from the command line
 */

use anyhow::{bail, Context, Result};
use bluereg_core::{BusSession, DeviceSession, Operation, ScanOrchestrator};
use clap::{Parser, Subcommand};
use std::io;
use std::time::Duration;
use tracing::{error, info};

mod config;
mod driver;

use config::CliConfig;
use driver::{ScanReport, LIFECYCLE};

#[derive(Parser)]
#[command(name = "bluereg")]
#[command(about = "Discover and manage Bluetooth devices through BlueZ")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "/etc/bluereg/bluereg.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, list devices, then connect/pair/unpair/disconnect one device
    Run {
        /// Device object path or address (defaults to driver.device)
        device: Option<String>,
        /// Discovery window in seconds
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Scan and list devices
    Scan {
        /// Discovery window in seconds
        #[arg(long)]
        duration: Option<u64>,
        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Connect a device
    Connect { device: String },
    /// Pair a device
    Pair { device: String },
    /// Cancel pairing with a device
    Unpair { device: String },
    /// Disconnect a device
    Disconnect { device: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let log_level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("bluereg={0},bluereg_core={0}", log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let config = CliConfig::load(&cli.config)?;

    let mut bus = BusSession::open_system(&config.bluez).context("cannot reach BlueZ")?;
    info!("Bus session open, BlueZ service {}", bus.service());

    let result = match cli.command.unwrap_or(Commands::Run { device: None, duration: None }) {
        Commands::Run { device, duration } => run(&bus, &config, device, duration),
        Commands::Scan { duration, json } => scan(&bus, &config, duration, json),
        Commands::Connect { device } => single(&bus, &config, Operation::Connect, &device),
        Commands::Pair { device } => single(&bus, &config, Operation::Pair, &device),
        Commands::Unpair { device } => single(&bus, &config, Operation::Unpair, &device),
        Commands::Disconnect { device } => single(&bus, &config, Operation::Disconnect, &device),
    };

    bus.close();
    result
}

fn discovery_window(config: &CliConfig, duration: Option<u64>) -> Duration {
    Duration::from_secs(duration.unwrap_or(config.scan.duration_secs))
}

fn run(bus: &BusSession, config: &CliConfig, device: Option<String>, duration: Option<u64>) -> Result<()> {
    let mut orchestrator = ScanOrchestrator::new(bus, &config.bluez)?;
    let scanned = match orchestrator.scan(discovery_window(config, duration)) {
        Ok(registry) => {
            driver::write_table(&mut io::stdout().lock(), registry.all())?;
            true
        }
        // The lifecycle calls below do not depend on the scan.
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            false
        }
    };

    let failures = match device.or_else(|| config.driver.device.clone()) {
        Some(target) => {
            let target = driver::resolve_target(&config.bluez.adapter, &target)?;
            let session = DeviceSession::new(bus, &config.bluez);
            let failures = driver::run_sequence(bus, &session, &target, &LIFECYCLE);
            if failures > 0 {
                error!("{} of {} operations failed for {}", failures, LIFECYCLE.len(), target);
            }
            failures
        }
        None => {
            info!("No device configured, skipping lifecycle sequence");
            0
        }
    };

    if !scanned || failures > 0 {
        bail!("run finished with errors");
    }
    Ok(())
}

fn scan(bus: &BusSession, config: &CliConfig, duration: Option<u64>, json: bool) -> Result<()> {
    let mut orchestrator = ScanOrchestrator::new(bus, &config.bluez)?;
    let registry = orchestrator.scan(discovery_window(config, duration))?;

    let mut out = io::stdout().lock();
    if json {
        let report = ScanReport {
            scanned_at: chrono::Utc::now(),
            adapter: &config.bluez.adapter,
            devices: registry.all(),
        };
        driver::write_json(&mut out, &report)
    } else {
        driver::write_table(&mut out, registry.all())
    }
}

fn single(bus: &BusSession, config: &CliConfig, operation: Operation, device: &str) -> Result<()> {
    let target = driver::resolve_target(&config.bluez.adapter, device)?;
    DeviceSession::new(bus, &config.bluez).invoke(operation, &target)?;
    info!("{} succeeded for {}", operation, target);
    Ok(())
}
