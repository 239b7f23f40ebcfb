//! # Simulated Fix Source
//!
//! Generates synthetic fixes for running the bridge without hardware.
//!
//! Produces a position that drifts a little on every call, simulating a
//! vehicle moving near the base coordinate. Useful for exercising the
//! transmit pipeline and the receiver end to end.

use chrono::Utc;

use crate::gps::fix::{Fix, FixQuality, ImuSample};

/// Base latitude (Stevens Institute of Technology, Hoboken, NJ)
const BASE_LAT: f64 = 40.7454;

/// Base longitude
const BASE_LON: f64 = -74.0251;

/// Per-call position increment in degrees
const DRIFT_STEP: f64 = 0.00005;

/// Fix source producing deterministic synthetic data
#[derive(Debug, Default)]
pub struct SimulatedSource {
    ticks: u64,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next synthetic fix
    ///
    /// Every optional field is populated, including the inertial sample,
    /// so downstream encoding paths are fully exercised.
    pub fn get_fix(&mut self) -> Fix {
        self.ticks += 1;
        let drift = self.ticks as f64 * DRIFT_STEP;

        Fix {
            stamp: Some(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            lat: Some(BASE_LAT + drift),
            lon: Some(BASE_LON + drift),
            alt: Some(5.0 + (self.ticks % 10) as f64),
            quality: Some(FixQuality::Gps),
            num_sats: Some(10),
            hdop: Some(0.8),
            imu: Some(ImuSample {
                accel: [0.1, -0.05, -9.81],
                gyro: [0.01, 0.01, 0.05],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_populated() {
        let mut source = SimulatedSource::new();
        let fix = source.get_fix();

        assert!(fix.has_position());
        assert!(fix.stamp.is_some());
        assert!(fix.alt.is_some());
        assert_eq!(fix.quality, Some(FixQuality::Gps));
        assert_eq!(fix.num_sats, Some(10));
        assert!(fix.hdop.is_some());
        assert!(fix.imu.is_some());
    }

    #[test]
    fn test_position_drifts_between_calls() {
        let mut source = SimulatedSource::new();
        let first = source.get_fix();
        let second = source.get_fix();

        assert!(second.lat.unwrap() > first.lat.unwrap());
        assert!(second.lon.unwrap() > first.lon.unwrap());
    }

    #[test]
    fn test_stamp_is_iso8601_utc() {
        let mut source = SimulatedSource::new();
        let stamp = source.get_fix().stamp.unwrap();

        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2024-01-01T00:00:00Z".len());
    }
}
