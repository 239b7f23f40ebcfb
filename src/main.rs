//! # LoRa Bridge
//!
//! Telemetry transmitter that runs on the Raspberry Pi: reads GPS fixes
//! from a u-blox module and forwards them over a LoRa radio to the
//! receiver side.
//!
//! Each cycle is independent and loss-tolerant: a cycle with no fix is
//! skipped, a failed transmission is logged and the next cycle proceeds.
//! Position updates are frequent, so a lost packet is simply superseded.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use lora_bridge::config::{Config, GpsBackend, LinkMode};
use lora_bridge::gps::{FixSource, NmeaSource, SimulatedSource, UbxSource};
use lora_bridge::lora::{CommandLink, RadioLink, TransparentLink};
use lora_bridge::packet;

/// Raspberry Pi LoRa GPS sender
#[derive(Parser, Debug)]
#[command(version, about = "Read GPS fixes and transmit them over a LoRa radio link")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// GPS serial port (e.g. /dev/serial0)
    #[arg(long)]
    gps_port: Option<String>,

    /// LoRa module serial port (e.g. /dev/ttyAMA0)
    #[arg(long)]
    lora_port: Option<String>,

    /// Send interval in seconds
    #[arg(long)]
    interval: Option<f64>,

    /// GPS connection method
    #[arg(long, value_enum)]
    gps_backend: Option<GpsBackend>,

    /// Run with synthetic GPS data (no hardware required)
    #[arg(long)]
    simulate: bool,
}

/// Main entry point for the LoRa bridge
///
/// Runs single-threaded: every await in the cycle is deadline-bounded, and
/// nothing is spawned, so the GPS channel and the radio channel are each
/// touched by exactly one owner.
///
/// # Control Flow
///
/// 1. Load configuration, apply command-line overrides
/// 2. Build the selected GPS backend and radio mode (fixed from here on)
/// 3. Open both channels; failure of either is fatal
/// 4. Loop: acquire fix → encode packet → transmit → sleep the remainder
///    of the interval
/// 5. Ctrl+C interrupts the loop; both channels are released on the way out
///
/// # Errors
///
/// Returns error if the configuration is invalid or either channel cannot
/// be opened at startup.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!("LoRa bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut gps = build_fix_source(&config);
    let mut lora = build_radio_link(&config);

    // Open both channels before the loop so hardware issues are fatal at
    // startup instead of surfacing as endless per-cycle failures
    gps.open().context("failed to open GPS channel")?;
    lora.open().context("failed to open LoRa channel")?;

    info!(
        "Starting main loop: sending every {:?}",
        config.send_interval()
    );
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;
    let mut sent: u64 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting");
                break;
            }
            _ = run_cycle(&mut gps, &mut lora, &config, &mut sent) => {
                cycles += 1;
            }
        }
    }

    info!("Sent {} packets over {} cycles", sent, cycles);
    Ok(())
}

/// Run one telemetry cycle: acquire, encode, transmit, pace
///
/// All failure modes short of a broken process are per-cycle: no fix means
/// the cycle is skipped, a rejected or failed transmission is logged and
/// the loop carries on.
async fn run_cycle(gps: &mut FixSource, lora: &mut RadioLink, config: &Config, sent: &mut u64) {
    let cycle_start = Instant::now();

    match gps.get_fix(config.gps_timeout()).await {
        Ok(Some(fix)) => match packet::encode(&fix) {
            Ok(payload) => match lora.send(&payload).await {
                Ok(ok) => {
                    if ok {
                        *sent += 1;
                    }
                    info!(
                        "Sent packet ({} bytes) ok={}: {}",
                        payload.len(),
                        ok,
                        String::from_utf8_lossy(&payload)
                    );
                }
                Err(e) => warn!("Failed to send packet: {}", e),
            },
            Err(e) => warn!("Failed to encode packet: {}", e),
        },
        Ok(None) => debug!("No GPS fix available this cycle"),
        Err(e) => warn!("GPS acquisition failed: {}", e),
    }

    // Sleep out the remainder of the interval. An overrun just shortens
    // the pause to zero; there is no catch-up across cycles.
    let remainder = config.send_interval().saturating_sub(cycle_start.elapsed());
    time::sleep(remainder).await;
}

/// Resolve the GPS backend from configuration, once
fn build_fix_source(config: &Config) -> FixSource {
    match config.gps.backend {
        GpsBackend::Ubx => FixSource::Ubx(UbxSource::new(&config.gps.port, config.gps.baud)),
        GpsBackend::Nmea => FixSource::Nmea(NmeaSource::new(&config.gps.port, config.gps.baud)),
        GpsBackend::Simulated => FixSource::Simulated(SimulatedSource::new()),
    }
}

/// Resolve the radio mode from configuration, once
fn build_radio_link(config: &Config) -> RadioLink {
    match config.lora.mode {
        LinkMode::Transparent => {
            RadioLink::Transparent(TransparentLink::new(&config.lora.port, config.lora.baud))
        }
        LinkMode::Command => RadioLink::Command(CommandLink::new(
            &config.lora.port,
            config.lora.baud,
            config.lora_timeout(),
        )),
    }
}

/// Load configuration and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = &cli.gps_port {
        config.gps.port = port.clone();
    }
    if let Some(port) = &cli.lora_port {
        config.lora.port = port.clone();
    }
    if let Some(interval) = cli.interval {
        config.timing.send_interval_ms = (interval * 1000.0) as u64;
    }
    if let Some(backend) = cli.gps_backend {
        config.gps.backend = backend;
    }
    if cli.simulate {
        config.gps.backend = GpsBackend::Simulated;
    }

    config.validate()?;
    Ok(config)
}
