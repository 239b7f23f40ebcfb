//! # LoRa Bridge Library
//!
//! Read GPS position fixes and transmit them over a LoRa radio link.
//!
//! This library provides the core functionality for the telemetry sender
//! that runs on the Raspberry Pi: UBX/NMEA position acquisition, compact
//! JSON packet encoding, and transparent or AT-command radio transmission.

pub mod config;
pub mod error;
pub mod gps;
pub mod lora;
pub mod packet;
pub mod serial;
pub mod ubx;
