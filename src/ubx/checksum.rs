//! # UBX Checksum
//!
//! Fletcher-style checksum calculation for the UBX protocol.
//!
//! Two running 8-bit accumulators are computed over the message region:
//! `CK_A` sums the bytes, `CK_B` sums the running values of `CK_A`,
//! both modulo 256.

/// Calculate the UBX checksum pair over a byte range
///
/// The range covered is message class through end of payload
/// (class + id + length field + payload).
///
/// # Arguments
///
/// * `data` - Byte slice to checksum
///
/// # Returns
///
/// * `(u8, u8)` - The checksum pair `(CK_A, CK_B)`
///
/// # Examples
///
/// ```
/// use lora_bridge::ubx::checksum::ubx_checksum;
///
/// let (ck_a, ck_b) = ubx_checksum(&[0x01, 0x02]);
/// assert_eq!((ck_a, ck_b), (0x03, 0x04));
/// ```
pub fn ubx_checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;

    for &byte in data {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }

    (ck_a, ck_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_empty() {
        assert_eq!(ubx_checksum(&[]), (0x00, 0x00));
    }

    #[test]
    fn test_checksum_known_vectors() {
        // Hand-computed: A accumulates bytes, B accumulates A
        assert_eq!(ubx_checksum(&[0x01]), (0x01, 0x01));
        assert_eq!(ubx_checksum(&[0x01, 0x02]), (0x03, 0x04));
        assert_eq!(ubx_checksum(&[0x01, 0x02, 0x03]), (0x06, 0x0A));
    }

    #[test]
    fn test_checksum_wraps_modulo_256() {
        // 0xFF + 0xFF = 0x1FE -> 0xFE; B = 0xFF + 0xFE = 0x1FD -> 0xFD
        assert_eq!(ubx_checksum(&[0xFF, 0xFF]), (0xFE, 0xFD));
    }

    #[test]
    fn test_checksum_changes_with_data() {
        let ck1 = ubx_checksum(&[0x01, 0x02, 0x00, 0x04]);
        let ck2 = ubx_checksum(&[0x01, 0x02, 0x00, 0x05]);
        assert_ne!(ck1, ck2, "Checksum should change when data changes");
    }

    #[test]
    fn test_checksum_order_sensitive() {
        // Same byte sum, different order: CK_A matches but CK_B differs
        let ck1 = ubx_checksum(&[0x01, 0x03]);
        let ck2 = ubx_checksum(&[0x03, 0x01]);
        assert_eq!(ck1.0, ck2.0);
        assert_ne!(ck1.1, ck2.1);
    }
}
