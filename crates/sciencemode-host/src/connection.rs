//! Byte-stream transports.
//!
//! A [`Connection`] moves raw bytes; framing happens above it. Reads never
//! block: they return whatever arrived since the last call, possibly
//! nothing.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ConnectionError;

/// A byte-stream transport to the device.
pub trait Connection: Send {
    /// Open the transport.
    fn open(&mut self) -> Result<(), ConnectionError>;

    /// Close the transport. Closing a closed connection is a no-op.
    fn close(&mut self) -> Result<(), ConnectionError>;

    /// Whether the transport is open.
    fn is_open(&self) -> bool;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), ConnectionError>;

    /// Return all bytes available now, empty if none.
    fn read(&mut self) -> Result<Vec<u8>, ConnectionError>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn open(&mut self) -> Result<(), ConnectionError> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        (**self).write(data)
    }

    fn read(&mut self) -> Result<Vec<u8>, ConnectionError> {
        (**self).read()
    }
}

// ============================================================================
// In-memory pipe
// ============================================================================

#[derive(Debug, Default)]
struct Pipe {
    open: bool,
    /// Bytes written by the host, not yet taken by the peer.
    to_device: Vec<u8>,
    /// Bytes injected by the peer, not yet read by the host.
    to_host: Vec<u8>,
}

/// An in-memory connection whose other end is a [`MemoryPeer`].
#[derive(Debug, Default)]
pub struct MemoryConnection {
    pipe: Arc<Mutex<Pipe>>,
}

/// The device end of a [`MemoryConnection`].
#[derive(Debug, Clone)]
pub struct MemoryPeer {
    pipe: Arc<Mutex<Pipe>>,
}

impl MemoryConnection {
    /// Create a closed connection and its peer.
    pub fn new() -> (Self, MemoryPeer) {
        let pipe = Arc::new(Mutex::new(Pipe::default()));
        (
            MemoryConnection { pipe: pipe.clone() },
            MemoryPeer { pipe },
        )
    }
}

impl Connection for MemoryConnection {
    fn open(&mut self) -> Result<(), ConnectionError> {
        self.pipe.lock().open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        let mut pipe = self.pipe.lock();
        pipe.open = false;
        pipe.to_host.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.pipe.lock().open
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        let mut pipe = self.pipe.lock();
        if !pipe.open {
            return Err(ConnectionError::Closed);
        }
        pipe.to_device.extend_from_slice(data);
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>, ConnectionError> {
        let mut pipe = self.pipe.lock();
        if !pipe.open {
            return Err(ConnectionError::Closed);
        }
        Ok(std::mem::take(&mut pipe.to_host))
    }
}

impl MemoryPeer {
    /// Queue bytes for the host to read.
    pub fn inject(&self, data: &[u8]) {
        self.pipe.lock().to_host.extend_from_slice(data);
    }

    /// Take everything the host has written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.pipe.lock().to_device)
    }

    /// Whether the host side is open.
    pub fn is_open(&self) -> bool {
        self.pipe.lock().open
    }

    /// Close the pipe from the device side; host reads and writes fail.
    pub fn disconnect(&self) {
        self.pipe.lock().open = false;
    }
}

// ============================================================================
// Serial port
// ============================================================================

#[cfg(feature = "serial")]
pub use serial::SerialPortConnection;

#[cfg(feature = "serial")]
mod serial {
    use std::io::{Read, Write};
    use std::time::Duration;

    use serialport::SerialPort;
    use tracing::debug;

    use super::Connection;
    use crate::config::SerialConfig;
    use crate::error::ConnectionError;

    /// A connection over a serial port.
    pub struct SerialPortConnection {
        config: SerialConfig,
        port: Option<Box<dyn SerialPort>>,
    }

    impl SerialPortConnection {
        /// Create a closed connection for `config`.
        pub fn new(config: SerialConfig) -> Self {
            SerialPortConnection { config, port: None }
        }

        fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, ConnectionError> {
            self.port.as_mut().ok_or(ConnectionError::Closed)
        }
    }

    impl Connection for SerialPortConnection {
        fn open(&mut self) -> Result<(), ConnectionError> {
            let port = serialport::new(&self.config.path, self.config.baud_rate)
                .timeout(Duration::ZERO)
                .open()?;
            debug!(
                "SerialPortConnection[{}]: opened at {} baud",
                self.config.path, self.config.baud_rate
            );
            self.port = Some(port);
            Ok(())
        }

        fn close(&mut self) -> Result<(), ConnectionError> {
            if self.port.take().is_some() {
                debug!("SerialPortConnection[{}]: closed", self.config.path);
            }
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.port.is_some()
        }

        fn write(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
            let port = self.port()?;
            port.write_all(data)?;
            port.flush()?;
            Ok(())
        }

        fn read(&mut self) -> Result<Vec<u8>, ConnectionError> {
            let port = self.port()?;
            let available = port.bytes_to_read()? as usize;
            if available == 0 {
                return Ok(Vec::new());
            }
            let mut buf = vec![0u8; available];
            match port.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    Ok(buf)
                }
                Err(err) if err.kind() == std::io::ErrorKind::TimedOut => Ok(Vec::new()),
                Err(err) => Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pipe() {
        let (mut conn, peer) = MemoryConnection::new();
        assert!(matches!(conn.write(&[1]), Err(ConnectionError::Closed)));

        conn.open().unwrap();
        assert!(peer.is_open());
        conn.write(&[1, 2]).unwrap();
        conn.write(&[3]).unwrap();
        assert_eq!(peer.take_written(), vec![1, 2, 3]);
        assert!(peer.take_written().is_empty());

        assert!(conn.read().unwrap().is_empty());
        peer.inject(&[9, 8]);
        assert_eq!(conn.read().unwrap(), vec![9, 8]);
    }

    #[test]
    fn test_peer_disconnect() {
        let (mut conn, peer) = MemoryConnection::new();
        conn.open().unwrap();
        peer.disconnect();
        assert!(!conn.is_open());
        assert!(matches!(conn.read(), Err(ConnectionError::Closed)));
    }

    #[test]
    fn test_boxed_connection() {
        let (conn, peer) = MemoryConnection::new();
        let mut boxed: Box<dyn Connection> = Box::new(conn);
        boxed.open().unwrap();
        boxed.write(&[7]).unwrap();
        assert_eq!(peer.take_written(), vec![7]);
    }
}
