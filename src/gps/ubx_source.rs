//! # UBX Bus Fix Source
//!
//! Polls a byte-oriented channel for UBX traffic and decodes position fixes.
//!
//! The u-blox module streams binary frames with no alignment guarantees, so
//! every poll feeds whatever bytes arrived into this source's own frame
//! assembler and checks for decodable frames before polling again.

use tokio::time::{self, Duration, Instant};
use tracing::debug;

use crate::error::{LoraBridgeError, Result};
use crate::gps::fix::Fix;
use crate::serial::{self, SerialIo};
use crate::ubx::assembler::{AssemblerStats, FrameAssembler};
use crate::ubx::decoder::{DecoderSet, FrameDecoder};

/// Bytes requested from the channel per poll
const BUS_CHUNK: usize = 64;

/// Pause between polls so an idle channel is not hammered
const POLL_IDLE: Duration = Duration::from_millis(10);

/// Fix source reading UBX binary messages from a serial channel
pub struct UbxSource {
    path: String,
    baud: u32,
    port: Option<Box<dyn SerialIo>>,
    assembler: FrameAssembler,
    decoders: DecoderSet,
}

impl UbxSource {
    /// Create a source that will open `path` lazily on first use
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            port: None,
            assembler: FrameAssembler::new(),
            decoders: DecoderSet::with_defaults(),
        }
    }

    /// Create a source over an already-open channel
    ///
    /// Used by tests and by callers bringing their own transport.
    pub fn with_port(port: Box<dyn SerialIo>) -> Self {
        Self {
            path: String::new(),
            baud: 0,
            port: Some(port),
            assembler: FrameAssembler::new(),
            decoders: DecoderSet::with_defaults(),
        }
    }

    /// Register an additional message decoder for a `(class, id)` pair
    pub fn register_decoder(&mut self, class: u8, id: u8, decoder: Box<dyn FrameDecoder>) {
        self.decoders.register(class, id, decoder);
    }

    /// Open the channel now instead of on the first `get_fix`
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    pub fn open(&mut self) -> Result<()> {
        if self.port.is_none() {
            self.port = Some(Box::new(serial::open_port(&self.path, self.baud)?));
        }
        Ok(())
    }

    /// Frame assembler diagnostics for this source
    pub fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }

    /// Poll the channel until a position fix is decoded or `budget` elapses
    ///
    /// Read errors during polling are logged and polling continues; the
    /// module legitimately reports nothing while its buffer refills.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(fix))` - A position message was assembled and decoded
    /// * `Ok(None)` - Budget elapsed without a decodable fix
    ///
    /// # Errors
    ///
    /// Returns error if the channel has to be opened and opening fails
    pub async fn get_fix(&mut self, budget: Duration) -> Result<Option<Fix>> {
        self.open()?;
        let deadline = Instant::now() + budget;

        let Self {
            port,
            assembler,
            decoders,
            ..
        } = self;
        let Some(port) = port.as_deref_mut() else {
            return Err(LoraBridgeError::Serial("channel not open".to_string()));
        };

        loop {
            if Instant::now() >= deadline {
                return Ok(None);
            }

            let mut chunk = [0u8; BUS_CHUNK];
            match time::timeout_at(deadline, port.read(&mut chunk)).await {
                Ok(Ok(0)) => {}
                Ok(Ok(n)) => assembler.feed(&chunk[..n]),
                Ok(Err(e)) => debug!("Bus read error: {}", e),
                Err(_) => return Ok(None),
            }

            while let Some(frame) = assembler.try_extract() {
                if let Some(fix) = decoders.decode(&frame) {
                    return Ok(Some(fix));
                }
                debug!(
                    "Ignoring UBX frame class=0x{:02X} id=0x{:02X} ({} bytes)",
                    frame.class,
                    frame.id,
                    frame.payload.len()
                );
            }

            time::sleep_until(deadline.min(Instant::now() + POLL_IDLE)).await;
        }
    }
}
