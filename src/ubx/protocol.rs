//! # UBX Protocol Constants and Types
//!
//! Core definitions for the u-blox UBX binary protocol.

/// First UBX sync character (always 0xB5)
pub const UBX_SYNC_1: u8 = 0xB5;

/// Second UBX sync character (always 0x62)
pub const UBX_SYNC_2: u8 = 0x62;

/// Full 2-byte sync marker identifying the start of a frame
pub const UBX_SYNC: [u8; 2] = [UBX_SYNC_1, UBX_SYNC_2];

/// Header span: sync(2) + class(1) + id(1) + length(2, little-endian)
pub const UBX_HEADER_LEN: usize = 6;

/// Trailing checksum span (CK_A, CK_B)
pub const UBX_CHECKSUM_LEN: usize = 2;

/// NAV message class
pub const UBX_CLASS_NAV: u8 = 0x01;

/// NAV-POSLLH message id (geodetic position solution)
pub const UBX_ID_NAV_POSLLH: u8 = 0x02;

/// A validated UBX frame
///
/// Constructed only by the frame assembler after checksum verification,
/// so holding a `UbxFrame` value implies the frame was valid on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    /// Message class byte
    pub class: u8,

    /// Message id byte
    pub id: u8,

    /// Payload bytes (length-prefix bytes and checksum stripped)
    pub payload: Vec<u8>,
}

impl UbxFrame {
    /// Whether this frame carries the message identified by `(class, id)`
    pub fn is(&self, class: u8, id: u8) -> bool {
        self.class == class && self.id == id
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::ubx::checksum::ubx_checksum;

    /// Build a complete wire frame for tests: sync + class + id + len + payload + checksum
    pub fn encode_frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(4 + payload.len());
        body.push(class);
        body.push(id);
        body.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        body.extend_from_slice(payload);

        let (ck_a, ck_b) = ubx_checksum(&body);

        let mut frame = Vec::with_capacity(UBX_HEADER_LEN + payload.len() + UBX_CHECKSUM_LEN);
        frame.extend_from_slice(&UBX_SYNC);
        frame.extend_from_slice(&body);
        frame.push(ck_a);
        frame.push(ck_b);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_marker() {
        assert_eq!(UBX_SYNC, [0xB5, 0x62]);
    }

    #[test]
    fn test_nav_posllh_identity() {
        let frame = UbxFrame {
            class: UBX_CLASS_NAV,
            id: UBX_ID_NAV_POSLLH,
            payload: vec![],
        };
        assert!(frame.is(0x01, 0x02));
        assert!(!frame.is(0x01, 0x07));
    }

    #[test]
    fn test_encode_frame_layout() {
        let frame = testutil::encode_frame(0x01, 0x02, &[0xAA, 0xBB]);
        assert_eq!(frame.len(), UBX_HEADER_LEN + 2 + UBX_CHECKSUM_LEN);
        assert_eq!(frame[..2], UBX_SYNC);
        assert_eq!(frame[2], 0x01);
        assert_eq!(frame[3], 0x02);
        assert_eq!(u16::from_le_bytes([frame[4], frame[5]]), 2);
    }
}
