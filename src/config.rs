//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use clap::ValueEnum;
use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tokio::time::Duration;

use crate::error::Result;

/// GPS acquisition backend selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GpsBackend {
    /// UBX binary messages over the module's byte channel
    Ubx,

    /// NMEA text sentences over UART
    Nmea,

    /// Synthetic fixes, no hardware required
    Simulated,
}

/// LoRa link mode selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Raw bytes written to the UART are transmitted as-is
    Transparent,

    /// Payloads wrapped in AT+SEND commands with response checking
    Command,
}

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gps: GpsConfig,

    #[serde(default)]
    pub lora: LoraConfig,

    #[serde(default)]
    pub timing: TimingConfig,
}

/// GPS receiver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_gps_backend")]
    pub backend: GpsBackend,

    #[serde(default = "default_gps_port")]
    pub port: String,

    #[serde(default = "default_gps_baud")]
    pub baud: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// LoRa module configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoraConfig {
    #[serde(default = "default_link_mode")]
    pub mode: LinkMode,

    #[serde(default = "default_lora_port")]
    pub port: String,

    #[serde(default = "default_lora_baud")]
    pub baud: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Transmit pacing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
}

// Default value functions
fn default_gps_backend() -> GpsBackend { GpsBackend::Ubx }
fn default_gps_port() -> String { "/dev/serial0".to_string() }
fn default_gps_baud() -> u32 { 38_400 }
fn default_timeout_ms() -> u64 { 1000 }

fn default_link_mode() -> LinkMode { LinkMode::Command }
fn default_lora_port() -> String { "/dev/serial0".to_string() }
fn default_lora_baud() -> u32 { 115_200 }

fn default_send_interval_ms() -> u64 { 1000 }

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            backend: default_gps_backend(),
            port: default_gps_port(),
            baud: default_gps_baud(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LoraConfig {
    fn default() -> Self {
        Self {
            mode: default_link_mode(),
            port: default_lora_port(),
            baud: default_lora_baud(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_send_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// GPS acquisition budget per cycle
    pub fn gps_timeout(&self) -> Duration {
        Duration::from_millis(self.gps.timeout_ms)
    }

    /// Generic LoRa channel timeout
    pub fn lora_timeout(&self) -> Duration {
        Duration::from_millis(self.lora.timeout_ms)
    }

    /// Pacing interval between telemetry cycles
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.timing.send_interval_ms)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.gps.port.is_empty() {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("gps port cannot be empty"),
            ));
        }

        if self.lora.port.is_empty() {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("lora port cannot be empty"),
            ));
        }

        if self.gps.baud == 0 {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("gps baud must be greater than 0"),
            ));
        }

        if self.lora.baud == 0 {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("lora baud must be greater than 0"),
            ));
        }

        if self.gps.timeout_ms == 0 || self.gps.timeout_ms > 10_000 {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("gps timeout_ms must be between 1 and 10000"),
            ));
        }

        if self.lora.timeout_ms == 0 || self.lora.timeout_ms > 10_000 {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("lora timeout_ms must be between 1 and 10000"),
            ));
        }

        if self.timing.send_interval_ms == 0 || self.timing.send_interval_ms > 60_000 {
            return Err(crate::error::LoraBridgeError::Config(
                toml::de::Error::custom("send_interval_ms must be between 1 and 60000"),
            ));
        }

        Ok(())
    }
}
