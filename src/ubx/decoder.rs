//! # UBX Message Decoders
//!
//! Maps validated UBX frames onto normalized position fixes.
//!
//! Decoders are registered in a [`DecoderSet`] keyed by `(class, id)`, so new
//! message types can be supported without touching the frame assembler.

use std::collections::HashMap;

use super::protocol::{UbxFrame, UBX_CLASS_NAV, UBX_ID_NAV_POSLLH};
use crate::gps::fix::Fix;

/// Minimum NAV-POSLLH payload length
const NAV_POSLLH_PAYLOAD_LEN: usize = 28;

/// Decoder for one UBX message type
pub trait FrameDecoder: Send {
    /// Decode a payload into a fix, or decline
    ///
    /// Returning `None` is not an error: it means the payload does not carry
    /// a usable fix (for example, it is shorter than the message layout).
    fn decode(&self, payload: &[u8]) -> Option<Fix>;
}

/// Decoder for NAV-POSLLH (geodetic position solution)
///
/// Payload layout (little-endian):
/// iTOW u32 (ms, ignored), lon i32 (1e-7 deg), lat i32 (1e-7 deg),
/// height i32 (mm, above ellipsoid), hMSL i32 (mm, unused),
/// hAcc u32 / vAcc u32 (ignored).
pub struct PosllhDecoder;

impl FrameDecoder for PosllhDecoder {
    fn decode(&self, payload: &[u8]) -> Option<Fix> {
        if payload.len() < NAV_POSLLH_PAYLOAD_LEN {
            return None;
        }

        let lon = i32::from_le_bytes(payload[4..8].try_into().ok()?);
        let lat = i32::from_le_bytes(payload[8..12].try_into().ok()?);
        let height = i32::from_le_bytes(payload[12..16].try_into().ok()?);

        Some(Fix {
            lat: Some(f64::from(lat) * 1e-7),
            lon: Some(f64::from(lon) * 1e-7),
            alt: Some(f64::from(height) / 1000.0),
            ..Fix::default()
        })
    }
}

/// Registry of frame decoders keyed by `(class, id)`
pub struct DecoderSet {
    decoders: HashMap<(u8, u8), Box<dyn FrameDecoder>>,
}

impl DecoderSet {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Create a registry with the standard position decoder installed
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(UBX_CLASS_NAV, UBX_ID_NAV_POSLLH, Box::new(PosllhDecoder));
        set
    }

    /// Register a decoder for a `(class, id)` pair, replacing any previous one
    pub fn register(&mut self, class: u8, id: u8, decoder: Box<dyn FrameDecoder>) {
        self.decoders.insert((class, id), decoder);
    }

    /// Decode a frame with the registered decoder for its `(class, id)`
    ///
    /// Frames with no registered decoder, and payloads the decoder declines,
    /// both yield `None`.
    pub fn decode(&self, frame: &UbxFrame) -> Option<Fix> {
        self.decoders
            .get(&(frame.class, frame.id))?
            .decode(&frame.payload)
    }
}

impl Default for DecoderSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}
