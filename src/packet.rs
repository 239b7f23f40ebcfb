//! # Wire Packet Codec
//!
//! Serializes a position fix into the compact JSON packet sent over the air.
//!
//! The packet always carries `ts`, `lat`, `lon`, `alt`, `fix`, `sats` and
//! `hdop` (absent fix fields serialize as `null`); `imu` is included only
//! when the fix carries an inertial sample. Output is UTF-8, newline-free,
//! with no whitespace between tokens — radio airtime is the scarce resource.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::gps::fix::{Fix, ImuSample};

#[derive(Serialize)]
struct Packet<'a> {
    ts: String,
    lat: Option<f64>,
    lon: Option<f64>,
    alt: Option<f64>,
    fix: Option<u8>,
    sats: Option<u32>,
    hdop: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imu: Option<&'a ImuSample>,
}

/// Encode a fix as a wire packet
///
/// Uses the fix's own timestamp when the producer reported one, otherwise
/// the encode-time UTC timestamp in ISO-8601 with a literal `Z` suffix.
///
/// # Arguments
///
/// * `fix` - The fix to encode
///
/// # Returns
///
/// * `Result<Vec<u8>>` - UTF-8 JSON bytes ready for transmission
///
/// # Errors
///
/// Returns error if JSON serialization fails
pub fn encode(fix: &Fix) -> Result<Vec<u8>> {
    let ts = match &fix.stamp {
        Some(stamp) => stamp.clone(),
        None => Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    };

    let packet = Packet {
        ts,
        lat: fix.lat,
        lon: fix.lon,
        alt: fix.alt,
        fix: fix.quality.map(|q| q.code()),
        sats: fix.num_sats,
        hdop: fix.hdop,
        imu: fix.imu.as_ref(),
    };

    Ok(serde_json::to_vec(&packet)?)
}
