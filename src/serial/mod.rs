//! # Serial Communication Module
//!
//! Serial channel plumbing shared by the GPS and LoRa backends.
//!
//! This module handles:
//! - Opening serial ports with 8N1, no flow control
//! - A trait abstraction over port I/O so protocol code is testable
//! - Deadline-bounded line reading for text protocols

pub mod lines;
pub mod port;

pub use lines::LineReader;
pub use port::{SerialIo, TokioSerialPort};

use crate::error::{LoraBridgeError, Result};
use tokio_serial::SerialPortBuilderExt;
use tracing::info;

/// Open a serial port with the settings both backends expect
///
/// # Arguments
///
/// * `path` - Device path (e.g., "/dev/serial0")
/// * `baud` - Baud rate
///
/// # Returns
///
/// * `Result<TokioSerialPort>` - Opened serial port
///
/// # Errors
///
/// Returns error if the device cannot be opened
pub fn open_port(path: &str, baud: u32) -> Result<TokioSerialPort> {
    info!("Opening serial port {} @ {}", path, baud);

    let port = tokio_serial::new(path, baud)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| LoraBridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

    Ok(TokioSerialPort::new(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_port_with_invalid_path_returns_error() {
        let result = open_port("/dev/nonexistent_serial_device_12345", 115_200);

        assert!(result.is_err());
        let err = result.unwrap_err();
        match err {
            LoraBridgeError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            _ => panic!("Expected Serial error, got: {:?}", err),
        }
    }
}
