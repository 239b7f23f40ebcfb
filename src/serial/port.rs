//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for serial channel I/O operations
///
/// Both radio link modes and both hardware GPS backends talk to their
/// channel exclusively through this trait, so protocol behavior can be
/// exercised against scripted ports.
#[async_trait]
pub trait SerialIo: Send {
    /// Read available bytes into `buf`, returning the count read
    ///
    /// May return fewer bytes than requested, including zero when the
    /// channel currently has nothing to deliver.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes, returning how many the channel accepted
    async fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Write the full buffer to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;

    /// Discard any unread bytes buffered on the input side
    fn discard_input(&mut self) -> io::Result<()>;
}

/// Wrapper around `tokio_serial::SerialStream` that implements `SerialIo`
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl std::fmt::Debug for TokioSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioSerialPort").finish_non_exhaustive()
    }
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

fn serial_to_io(err: tokio_serial::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[async_trait]
impl SerialIo for TokioSerialPort {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        use tokio::io::AsyncWriteExt;
        self.port.write(data).await
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }

    fn discard_input(&mut self) -> io::Result<()> {
        use tokio_serial::SerialPort;

        let pending = self.port.bytes_to_read().map_err(serial_to_io)?;
        if pending > 0 {
            self.port
                .clear(tokio_serial::ClearBuffer::Input)
                .map_err(serial_to_io)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockSerialPort;
    use super::*;

    #[tokio::test]
    async fn test_mock_read_pops_chunks_in_order() {
        let mut port = MockSerialPort::new();
        port.push_read(b"abc");
        port.push_read(b"def");

        let mut buf = [0u8; 16];
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"def");
        assert_eq!(port.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_read_splits_oversized_chunks() {
        let mut port = MockSerialPort::new();
        port.push_read(b"abcdef");

        let mut buf = [0u8; 4];
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abcd");
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ef");
    }

    #[tokio::test]
    async fn test_mock_discard_clears_pending_reads() {
        let mut port = MockSerialPort::new();
        port.push_read(b"stale");

        port.discard_input().unwrap();
        assert_eq!(port.discard_count(), 1);

        let mut buf = [0u8; 8];
        assert_eq!(port.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_response_released_by_write_all() {
        let mut port = MockSerialPort::new();
        port.respond_on_write(b"OK\r\n");

        let mut buf = [0u8; 8];
        assert_eq!(port.read(&mut buf).await.unwrap(), 0, "response not readable before write");

        port.write_all(b"AT\r\n").await.unwrap();
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"OK\r\n");
    }
}
