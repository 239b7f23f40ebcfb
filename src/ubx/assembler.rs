//! # UBX Frame Assembler
//!
//! Reassembles validated UBX frames from an unreliable, chunked byte stream.
//!
//! The assembler owns a growable receive buffer. Callers append raw chunks
//! with [`FrameAssembler::feed`] and drain validated frames with
//! [`FrameAssembler::try_extract`], which must be called repeatedly until it
//! returns `None` since a single chunk may complete several frames.
//!
//! Buffer discipline: bytes leave the buffer only when they are consumed into
//! a validated frame, or discarded as confirmed noise at a sync point. A
//! checksum mismatch drops exactly the two sync bytes at the match position,
//! so repeated calls always make forward progress on garbage input.

use bytes::{Buf, BytesMut};
use tracing::debug;

use super::checksum::ubx_checksum;
use super::protocol::{UbxFrame, UBX_CHECKSUM_LEN, UBX_HEADER_LEN, UBX_SYNC_1, UBX_SYNC_2};

/// Running counters kept by the assembler for diagnostics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Validated frames extracted
    pub frames: u64,

    /// Frames rejected by checksum verification
    pub checksum_errors: u64,

    /// Noise bytes discarded without being part of a validated frame
    pub bytes_discarded: u64,
}

/// Reassembles UBX frames from arbitrary byte chunks
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: BytesMut,
    stats: AssemblerStats,
}

impl FrameAssembler {
    /// Create an assembler with an empty receive buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes to the receive buffer
    ///
    /// Never discards unread data; extraction happens in `try_extract`.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Attempt to extract one validated frame from the buffer
    ///
    /// Call repeatedly until `None`: one feed may contain multiple frames.
    ///
    /// # Returns
    ///
    /// * `Some(UbxFrame)` - A checksum-verified frame, removed from the buffer
    /// * `None` - No complete valid frame available yet
    pub fn try_extract(&mut self) -> Option<UbxFrame> {
        let idx = match self.find_sync() {
            Some(idx) => idx,
            None => {
                // No sync marker: everything is noise except a trailing 0xB5
                // that could be the first byte of a marker split across feeds.
                let keep = usize::from(self.buf.last() == Some(&UBX_SYNC_1));
                let drop = self.buf.len() - keep;
                if drop > 0 {
                    self.buf.advance(drop);
                    self.stats.bytes_discarded += drop as u64;
                }
                return None;
            }
        };

        // Need sync(2) + class(1) + id(1) + length(2) before the length is known
        if self.buf.len() < idx + UBX_HEADER_LEN {
            return None;
        }

        let length = usize::from(u16::from_le_bytes([self.buf[idx + 4], self.buf[idx + 5]]));
        let total = UBX_HEADER_LEN + length + UBX_CHECKSUM_LEN;
        if self.buf.len() < idx + total {
            // Frame incomplete, wait for more data
            return None;
        }

        // Checksum covers class + id + length field + payload
        let body = &self.buf[idx + 2..idx + UBX_HEADER_LEN + length];
        let (ck_a, ck_b) = ubx_checksum(body);
        let tail = idx + UBX_HEADER_LEN + length;
        if (ck_a, ck_b) != (self.buf[tail], self.buf[tail + 1]) {
            debug!(
                "UBX checksum mismatch at offset {}, skipping sync marker",
                idx
            );
            self.stats.checksum_errors += 1;
            self.drop_sync_at(idx);
            return None;
        }

        let class = self.buf[idx + 2];
        let id = self.buf[idx + 3];
        let payload = self.buf[idx + UBX_HEADER_LEN..idx + UBX_HEADER_LEN + length].to_vec();

        // Consume the frame span along with any leading noise before it
        self.buf.advance(idx + total);
        self.stats.bytes_discarded += idx as u64;
        self.stats.frames += 1;

        Some(UbxFrame { class, id, payload })
    }

    /// Number of bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Diagnostic counters accumulated since construction
    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    fn find_sync(&self) -> Option<usize> {
        self.buf
            .windows(2)
            .position(|w| w[0] == UBX_SYNC_1 && w[1] == UBX_SYNC_2)
    }

    /// Remove exactly the two sync bytes at `idx`, keeping surrounding data
    fn drop_sync_at(&mut self, idx: usize) {
        let mut rest = self.buf.split_off(idx);
        rest.advance(2);
        self.buf.unsplit(rest);
        self.stats.bytes_discarded += 2;
    }
}
