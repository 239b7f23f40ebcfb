//! # Position Fix Data Model
//!
//! Normalized position data shared by every GPS backend.

use serde::Serialize;

/// GPS fix quality indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    /// No position fix
    NoFix,

    /// Standard GPS fix
    Gps,

    /// Differential GPS fix
    DifferentialGps,
}

impl FixQuality {
    /// Numeric quality code as reported in GGA sentences (0/1/2)
    pub fn code(self) -> u8 {
        match self {
            FixQuality::NoFix => 0,
            FixQuality::Gps => 1,
            FixQuality::DifferentialGps => 2,
        }
    }
}

/// One inertial sample paired with a fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuSample {
    /// 3-axis acceleration in m/s²
    pub accel: [f64; 3],

    /// 3-axis angular rate in rad/s
    pub gyro: [f64; 3],
}

/// A normalized position fix
///
/// Every field is independently optional: a backend may supply a partial
/// fix (the UBX decoder, for instance, fills position only). Values are
/// created once per acquisition cycle and discarded after encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fix {
    /// Timestamp preformatted by the producer, if it reported one
    pub stamp: Option<String>,

    /// Latitude in signed decimal degrees
    pub lat: Option<f64>,

    /// Longitude in signed decimal degrees
    pub lon: Option<f64>,

    /// Altitude in meters
    pub alt: Option<f64>,

    /// Fix quality
    pub quality: Option<FixQuality>,

    /// Number of satellites used in the solution
    pub num_sats: Option<u32>,

    /// Horizontal dilution of precision
    pub hdop: Option<f32>,

    /// Inertial sample, when the backend provides one
    pub imu: Option<ImuSample>,
}

impl Fix {
    /// Whether the fix carries a usable horizontal position
    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}
