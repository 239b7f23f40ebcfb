//! # LoRa Radio Link Module
//!
//! Transmits telemetry payloads over a serial-attached LoRa module.
//!
//! A link runs in exactly one of two modes, fixed when it is constructed:
//!
//! - **Transparent mode**: bytes written to the UART are transmitted on the
//!   air as-is. The radio is logically simplex here; there is no
//!   acknowledgment, so success means "the module accepted the bytes".
//! - **Command mode**: each payload is wrapped in an `AT+SEND` command and
//!   the module's response lines are collected and classified against the
//!   terminal tokens `OK` / `SEND` / `ERROR` / `FAIL`.

use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{LoraBridgeError, Result};
use crate::serial::{self, LineReader, SerialIo};

/// Floor for the command response deadline
///
/// The module can take noticeably longer to answer an `AT+SEND` than a
/// plain serial read, so a short generic channel timeout must not starve
/// the response collection.
const AT_RESPONSE_TIMEOUT_MIN: Duration = Duration::from_secs(1);

/// Tokens that end response collection (case-insensitive substring match)
const AT_TERMINAL_TOKENS: [&str; 4] = ["OK", "SEND", "ERROR", "FAIL"];

/// The selected radio mode, fixed at startup
///
/// Resolved once from configuration and never reassigned; the acquisition
/// loop only depends on [`RadioLink::send`].
pub enum RadioLink {
    /// Raw passthrough, fire and forget
    Transparent(TransparentLink),

    /// AT command/response exchange
    Command(CommandLink),
}

impl RadioLink {
    /// Open the underlying channel now to surface hardware issues early
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    pub fn open(&mut self) -> Result<()> {
        match self {
            RadioLink::Transparent(link) => link.open(),
            RadioLink::Command(link) => link.open(),
        }
    }

    /// Transmit one payload
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The link considers the payload sent
    /// * `Ok(false)` - The module rejected the command or never answered
    ///
    /// # Errors
    ///
    /// Returns error on channel-level open/write failures
    pub async fn send(&mut self, payload: &[u8]) -> Result<bool> {
        match self {
            RadioLink::Transparent(link) => link.send(payload).await,
            RadioLink::Command(link) => link.send(payload).await,
        }
    }
}

/// Transparent-mode link: payload bytes go straight to the UART
pub struct TransparentLink {
    path: String,
    baud: u32,
    port: Option<Box<dyn SerialIo>>,
}

impl TransparentLink {
    /// Create a link that will open `path` lazily on first use
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            port: None,
        }
    }

    /// Create a link over an already-open channel
    ///
    /// Used by tests and by callers bringing their own transport.
    pub fn with_port(port: Box<dyn SerialIo>) -> Self {
        Self {
            path: String::new(),
            baud: 0,
            port: Some(port),
        }
    }

    /// Open the channel now instead of on the first `send`
    pub fn open(&mut self) -> Result<()> {
        if self.port.is_none() {
            self.port = Some(Box::new(serial::open_port(&self.path, self.baud)?));
        }
        Ok(())
    }

    /// Write the payload to the module and flush
    ///
    /// Reports success whenever the write completes without a channel error.
    /// A short write is logged as a warning but still counts as success.
    // TODO: decide whether a short write should fail the send; the receiver
    // currently just drops the truncated packet on its checksum.
    pub async fn send(&mut self, payload: &[u8]) -> Result<bool> {
        self.open()?;
        let Some(port) = self.port.as_deref_mut() else {
            return Err(LoraBridgeError::Serial("channel not open".to_string()));
        };

        let written = port.write(payload).await?;
        port.flush().await?;

        info!("LoRa TX: wrote {} of {} bytes", written, payload.len());
        if written < payload.len() {
            warn!(
                "LoRa TX: only wrote {} of {} bytes!",
                written,
                payload.len()
            );
        }

        // No response exists in this mode; the write completing is all
        // the confirmation there is
        Ok(true)
    }
}

/// Command-mode link: payloads wrapped in `AT+SEND`, responses classified
pub struct CommandLink {
    path: String,
    baud: u32,
    port: Option<Box<dyn SerialIo>>,
    response_timeout: Duration,
    last_response: Vec<String>,
}

impl CommandLink {
    /// Create a link that will open `path` lazily on first use
    ///
    /// `channel_timeout` is the generic serial timeout; the response
    /// deadline is this value with a 1 second floor applied.
    pub fn new(path: impl Into<String>, baud: u32, channel_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            baud,
            port: None,
            response_timeout: channel_timeout.max(AT_RESPONSE_TIMEOUT_MIN),
            last_response: Vec::new(),
        }
    }

    /// Create a link over an already-open channel
    ///
    /// Used by tests and by callers bringing their own transport.
    pub fn with_port(port: Box<dyn SerialIo>, channel_timeout: Duration) -> Self {
        Self {
            path: String::new(),
            baud: 0,
            port: Some(port),
            response_timeout: channel_timeout.max(AT_RESPONSE_TIMEOUT_MIN),
            last_response: Vec::new(),
        }
    }

    /// Open the channel now instead of on the first `send`
    pub fn open(&mut self) -> Result<()> {
        if self.port.is_none() {
            self.port = Some(Box::new(serial::open_port(&self.path, self.baud)?));
        }
        Ok(())
    }

    /// Response lines collected during the most recent exchange
    pub fn last_response(&self) -> &[String] {
        &self.last_response
    }

    /// Issue an `AT+SEND` for the payload and classify the response
    pub async fn send(&mut self, payload: &[u8]) -> Result<bool> {
        self.open()?;
        let command = build_send_command(payload);

        let Self {
            port,
            response_timeout,
            last_response,
            ..
        } = self;
        let Some(port) = port.as_deref_mut() else {
            return Err(LoraBridgeError::Serial("channel not open".to_string()));
        };

        debug!(
            "LoRa AT >> {}",
            String::from_utf8_lossy(&command).trim_end()
        );

        // Drop stale bytes so a previous exchange cannot be misread as
        // this command's response
        port.discard_input()?;

        port.write_all(&command).await?;
        port.flush().await?;

        last_response.clear();
        let deadline = Instant::now() + *response_timeout;
        let mut lines = LineReader::new();
        while let Some(line) = lines.next_line(port, deadline).await? {
            if line.is_empty() {
                continue;
            }
            debug!("LoRa AT << {}", line);
            let terminal = {
                let upper = line.to_uppercase();
                AT_TERMINAL_TOKENS.iter().any(|t| upper.contains(t))
            };
            last_response.push(line);
            if terminal {
                break;
            }
        }

        let success = last_response.iter().any(|line| {
            let upper = line.to_uppercase();
            upper.contains("OK") || upper.contains("SEND")
        });

        if last_response.is_empty() {
            warn!("LoRa AT: no response after send");
        } else if !success {
            warn!("LoRa AT: unexpected response {:?}", last_response);
        }

        Ok(success)
    }
}

/// Construct an `AT+SEND=<len>,<payload>\r\n` command for the given payload
///
/// The module expects ASCII-safe data inside the command. Payloads are
/// normally UTF-8 JSON; invalid UTF-8 falls back to a byte-preserving
/// single-byte decoding. Embedded CR/LF are stripped (not escaped) and any
/// remaining non-ASCII characters are dropped. The advertised length is the
/// original payload's byte count.
fn build_send_command(payload: &[u8]) -> Vec<u8> {
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => payload.iter().map(|&b| b as char).collect(),
    };
    let sanitized: String = text.chars().filter(|&c| c != '\r' && c != '\n').collect();

    let mut command: Vec<u8> = format!("AT+SEND={},{}", payload.len(), sanitized)
        .chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect();
    command.extend_from_slice(b"\r\n");
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port::mocks::MockSerialPort;

    #[test]
    fn test_build_send_command_plain_payload() {
        let command = build_send_command(b"{\"lat\":1.0}");
        assert_eq!(command, b"AT+SEND=11,{\"lat\":1.0}\r\n");
    }

    #[test]
    fn test_build_send_command_strips_crlf_but_keeps_length() {
        let command = build_send_command(b"ab\r\ncd");
        // Length reflects the original 6 payload bytes, not the sanitized text
        assert_eq!(command, b"AT+SEND=6,abcd\r\n");
    }

    #[test]
    fn test_build_send_command_invalid_utf8_drops_non_ascii() {
        let command = build_send_command(&[0xFF, b'A', 0xC3]);
        assert_eq!(command, b"AT+SEND=3,A\r\n");
    }

    #[tokio::test]
    async fn test_transparent_send_reports_success() {
        let port = MockSerialPort::new();
        let mut link = TransparentLink::with_port(Box::new(port.clone()));

        let sent = link.send(b"payload").await.unwrap();
        assert!(sent);
        assert_eq!(port.written_bytes(), b"payload");
    }

    #[tokio::test]
    async fn test_transparent_short_write_still_reports_success() {
        let port = MockSerialPort::new();
        port.set_write_limit(3);
        let mut link = TransparentLink::with_port(Box::new(port.clone()));

        let sent = link.send(b"payload").await.unwrap();
        assert!(sent, "short write is only warned about, not failed");
        assert_eq!(port.written_bytes(), b"pay");
    }

    #[tokio::test]
    async fn test_transparent_write_error_propagates() {
        let port = MockSerialPort::new();
        port.set_write_error(std::io::ErrorKind::BrokenPipe);
        let mut link = TransparentLink::with_port(Box::new(port));

        assert!(link.send(b"payload").await.is_err());
    }

    #[tokio::test]
    async fn test_command_send_success_on_ok() {
        let port = MockSerialPort::new();
        port.respond_on_write(b"OK\r\n");
        let mut link = CommandLink::with_port(Box::new(port.clone()), Duration::from_millis(100));

        let sent = link.send(b"{\"lat\":1.0}").await.unwrap();
        assert!(sent);
        assert_eq!(link.last_response(), ["OK"]);
        assert_eq!(port.written_bytes(), b"AT+SEND=11,{\"lat\":1.0}\r\n");
    }

    #[tokio::test]
    async fn test_command_send_success_on_send_token() {
        let port = MockSerialPort::new();
        port.respond_on_write(b"+SEND: DONE\r\n");
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(100));

        assert!(link.send(b"x").await.unwrap());
    }

    #[tokio::test]
    async fn test_command_send_failure_on_error_token() {
        let port = MockSerialPort::new();
        port.respond_on_write(b"ERROR: busy\r\n");
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(100));

        let sent = link.send(b"x").await.unwrap();
        assert!(!sent);
        assert_eq!(link.last_response(), ["ERROR: busy"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_send_failure_on_silence() {
        let port = MockSerialPort::new();
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(100));

        let sent = link.send(b"x").await.unwrap();
        assert!(!sent);
        assert!(link.last_response().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_response_deadline_has_one_second_floor() {
        let port = MockSerialPort::new();
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(10));

        let started = Instant::now();
        let sent = link.send(b"x").await.unwrap();
        assert!(!sent);
        // The 10ms channel timeout must not cut response collection short
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_command_send_discards_stale_input_first() {
        let port = MockSerialPort::new();
        port.push_read(b"LEFTOVER OK\r\n"); // stale line from a previous exchange
        port.respond_on_write(b"ERROR\r\n");
        let mut link = CommandLink::with_port(Box::new(port.clone()), Duration::from_millis(100));

        let sent = link.send(b"x").await.unwrap();
        assert!(!sent, "stale OK must not be classified as this response");
        assert_eq!(port.discard_count(), 1);
        assert_eq!(link.last_response(), ["ERROR"]);
    }

    #[tokio::test]
    async fn test_command_collects_lines_until_terminal_token() {
        let port = MockSerialPort::new();
        port.respond_on_write(b"+READY\r\nSENDING\r\nignored after terminal\r\n");
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(100));

        let sent = link.send(b"x").await.unwrap();
        assert!(sent);
        // Collection stops at the first terminal line
        assert_eq!(link.last_response(), ["+READY", "SENDING"]);
    }

    #[tokio::test]
    async fn test_command_token_match_is_case_insensitive() {
        let port = MockSerialPort::new();
        port.respond_on_write(b"ok\r\n");
        let mut link = CommandLink::with_port(Box::new(port), Duration::from_millis(100));

        assert!(link.send(b"x").await.unwrap());
    }
}
