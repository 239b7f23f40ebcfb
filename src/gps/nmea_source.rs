//! # NMEA Serial Fix Source
//!
//! Reads NMEA sentences from a serial channel and extracts position fixes.
//!
//! Sentence interpretation is delegated to the `nmea` crate; this source only
//! handles line framing, the acquisition deadline, and mapping the parsed
//! GGA/RMC sentences onto the normalized [`Fix`] shape.

use nmea::sentences::{FixType, GgaData, RmcData};
use nmea::{parse_str, ParseResult};
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::error::{LoraBridgeError, Result};
use crate::gps::fix::{Fix, FixQuality};
use crate::serial::{self, LineReader, SerialIo};

/// Fix source reading NMEA text sentences from a serial channel
pub struct NmeaSource {
    path: String,
    baud: u32,
    port: Option<Box<dyn SerialIo>>,
    lines: LineReader,
}

impl NmeaSource {
    /// Create a source that will open `path` lazily on first use
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            port: None,
            lines: LineReader::new(),
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
            lines: LineReader::new(),
        }
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

    /// Read sentences until a position fix is parsed or `budget` elapses
    ///
    /// Lines that are not valid NMEA, and sentence types other than GGA and
    /// RMC, are skipped. A read failure ends the attempt for this cycle.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(fix))` - A GGA or RMC sentence was parsed
    /// * `Ok(None)` - Budget elapsed, or the channel read failed
    ///
    /// # Errors
    ///
    /// Returns error if the channel has to be opened and opening fails
    pub async fn get_fix(&mut self, budget: Duration) -> Result<Option<Fix>> {
        self.open()?;
        let deadline = Instant::now() + budget;

        let Self { port, lines, .. } = self;
        let Some(port) = port.as_deref_mut() else {
            return Err(LoraBridgeError::Serial("channel not open".to_string()));
        };

        loop {
            let line = match lines.next_line(port, deadline).await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => {
                    debug!("Serial read error: {}", e);
                    return Ok(None);
                }
            };
            if line.is_empty() {
                continue;
            }

            match parse_str(&line) {
                Ok(ParseResult::GGA(gga)) => return Ok(Some(fix_from_gga(&gga))),
                Ok(ParseResult::RMC(rmc)) => return Ok(Some(fix_from_rmc(&rmc))),
                Ok(_) => continue,
                Err(_) => {
                    // Not a sentence we can use; the stream interleaves
                    // proprietary lines with standard ones
                    continue;
                }
            }
        }
    }
}

/// GGA: position, altitude, fix quality, satellites, HDOP
fn fix_from_gga(gga: &GgaData) -> Fix {
    Fix {
        stamp: gga.fix_time.map(|t| t.format("%H:%M:%S").to_string()),
        lat: gga.latitude,
        lon: gga.longitude,
        alt: gga.altitude.map(f64::from),
        quality: gga.fix_type.map(quality_from),
        num_sats: gga.fix_satellites,
        hdop: gga.hdop,
        imu: None,
    }
}

/// RMC: date, time, position
fn fix_from_rmc(rmc: &RmcData) -> Fix {
    let stamp = match (rmc.fix_date, rmc.fix_time) {
        (Some(date), Some(time)) => Some(format!(
            "{}T{}",
            date.format("%Y-%m-%d"),
            time.format("%H:%M:%S")
        )),
        _ => None,
    };

    Fix {
        stamp,
        lat: rmc.lat,
        lon: rmc.lon,
        ..Fix::default()
    }
}

fn quality_from(fix_type: FixType) -> FixQuality {
    match fix_type {
        FixType::Invalid => FixQuality::NoFix,
        FixType::DGps => FixQuality::DifferentialGps,
        _ => FixQuality::Gps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port::mocks::MockSerialPort;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

    #[tokio::test]
    async fn test_gga_sentence_yields_full_fix() {
        let port = MockSerialPort::new();
        port.push_read(GGA.as_bytes());

        let mut source = NmeaSource::with_port(Box::new(port));
        let fix = source
            .get_fix(Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fix.stamp.as_deref(), Some("12:35:19"));
        assert!((fix.lat.unwrap() - 48.1173).abs() < 1e-4);
        assert!((fix.lon.unwrap() - 11.5167).abs() < 1e-4);
        assert!((fix.alt.unwrap() - 545.4).abs() < 1e-3);
        assert_eq!(fix.quality, Some(FixQuality::Gps));
        assert_eq!(fix.num_sats, Some(8));
        assert!((fix.hdop.unwrap() - 0.9).abs() < 1e-6);
        assert!(fix.imu.is_none());
    }

    #[tokio::test]
    async fn test_rmc_sentence_yields_position_and_stamp() {
        let port = MockSerialPort::new();
        port.push_read(RMC.as_bytes());

        let mut source = NmeaSource::with_port(Box::new(port));
        let fix = source
            .get_fix(Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fix.stamp.as_deref(), Some("1994-03-23T12:35:19"));
        assert!((fix.lat.unwrap() - 48.1173).abs() < 1e-4);
        assert!((fix.lon.unwrap() - 11.5167).abs() < 1e-4);
        assert!(fix.alt.is_none());
        assert!(fix.quality.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_lines_are_skipped() {
        let port = MockSerialPort::new();
        port.push_read(b"garbage line\r\n");
        port.push_read(b"$PUBX,00,something,proprietary*00\r\n");
        port.push_read(GGA.as_bytes());

        let mut source = NmeaSource::with_port(Box::new(port));
        let fix = source.get_fix(Duration::from_secs(1)).await.unwrap();
        assert!(fix.unwrap().has_position());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_sentence_returns_none() {
        let port = MockSerialPort::new();
        let mut source = NmeaSource::with_port(Box::new(port));

        let fix = source.get_fix(Duration::from_millis(200)).await.unwrap();
        assert!(fix.is_none());
    }

    #[tokio::test]
    async fn test_read_error_ends_cycle_without_fix() {
        let port = MockSerialPort::new();
        port.push_read_error(std::io::ErrorKind::BrokenPipe);

        let mut source = NmeaSource::with_port(Box::new(port));
        let fix = source.get_fix(Duration::from_secs(1)).await.unwrap();
        assert!(fix.is_none());
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_from(FixType::Invalid), FixQuality::NoFix);
        assert_eq!(quality_from(FixType::Gps), FixQuality::Gps);
        assert_eq!(quality_from(FixType::DGps), FixQuality::DifferentialGps);
        assert_eq!(quality_from(FixType::Rtk), FixQuality::Gps);
    }
}
