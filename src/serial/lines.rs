//! Deadline-bounded line reading over a serial channel.

use bytes::BytesMut;
use std::io;
use tokio::time::{self, Duration, Instant};

use super::port::SerialIo;

/// Pause between polls when the channel has no bytes to deliver
const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// Read buffer size per poll
const READ_CHUNK: usize = 256;

/// Accumulates raw bytes and yields complete text lines
///
/// Carries partial-line bytes across calls, so a line split over several
/// reads is still delivered intact.
#[derive(Debug, Default)]
pub struct LineReader {
    buf: BytesMut,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read until one full line is available or the deadline passes
    ///
    /// Lines are decoded lossily and trimmed of surrounding whitespace,
    /// including the CR of CRLF terminators. Blank lines are returned as
    /// empty strings; callers decide whether to skip them.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(line))` - A complete line was received
    /// * `Ok(None)` - Deadline passed without a complete line
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the channel read fails
    pub async fn next_line(
        &mut self,
        port: &mut dyn SerialIo,
        deadline: Instant,
    ) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw = self.buf.split_to(pos + 1);
                return Ok(Some(String::from_utf8_lossy(&raw).trim().to_string()));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            let mut chunk = [0u8; READ_CHUNK];
            match time::timeout_at(deadline, port.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    time::sleep_until(deadline.min(Instant::now() + IDLE_BACKOFF)).await;
                }
                Ok(Ok(n)) => self.buf.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(None),
            }
        }
    }
}
