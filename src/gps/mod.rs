//! # GPS Module
//!
//! Position acquisition backends and the normalized fix data model.
//!
//! This module handles:
//! - The [`Fix`] data model shared by all backends
//! - UBX binary acquisition over a polled byte channel
//! - NMEA text acquisition over a serial line
//! - Synthetic fix generation for hardware-free runs

pub mod fix;
pub mod nmea_source;
pub mod simulated;
pub mod ubx_source;

pub use fix::{Fix, FixQuality, ImuSample};
pub use nmea_source::NmeaSource;
pub use simulated::SimulatedSource;
pub use ubx_source::UbxSource;

use tokio::time::Duration;

use crate::error::Result;

/// The selected position backend, fixed at startup
///
/// Resolved once from configuration and never reassigned; downstream code
/// only depends on [`FixSource::get_fix`], not on the concrete backend.
pub enum FixSource {
    /// UBX binary messages polled from a byte channel
    Ubx(UbxSource),

    /// NMEA sentences read from a serial line
    Nmea(NmeaSource),

    /// Synthetic data, no hardware required
    Simulated(SimulatedSource),
}

impl FixSource {
    /// Open the underlying channel now to surface hardware issues early
    ///
    /// # Errors
    ///
    /// Returns error if the backend's device cannot be opened
    pub fn open(&mut self) -> Result<()> {
        match self {
            FixSource::Ubx(source) => source.open(),
            FixSource::Nmea(source) => source.open(),
            FixSource::Simulated(_) => Ok(()),
        }
    }

    /// Attempt to acquire one fix within `budget`
    ///
    /// `Ok(None)` is the expected "no update this cycle" outcome; the caller
    /// decides whether to skip the cycle.
    ///
    /// # Errors
    ///
    /// Returns error if a lazily-opened channel cannot be opened
    pub async fn get_fix(&mut self, budget: Duration) -> Result<Option<Fix>> {
        match self {
            FixSource::Ubx(source) => source.get_fix(budget).await,
            FixSource::Nmea(source) => source.get_fix(budget).await,
            FixSource::Simulated(source) => Ok(Some(source.get_fix())),
        }
    }
}
