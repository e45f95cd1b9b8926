//! Host error types.

use std::time::Duration;

use sciencemode_protocol::{Command, DyscomGetType, FramingError, ProtocolError, ResultAndError};
use thiserror::Error;

/// Errors raised by a [`Connection`](crate::Connection).
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// I/O failure on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection is not open.
    #[error("connection is closed")]
    Closed,

    /// Serial port failure.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while receiving a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileTransferError {
    /// No block arrived in time.
    #[error("no file block {block} within {timeout:?}")]
    BlockTimeout {
        /// Block number waited for.
        block: u32,
        /// Time waited.
        timeout: Duration,
    },

    /// The device sent more data than announced.
    #[error("file larger than announced: expected {expected} bytes, got {actual}")]
    SizeExceeded {
        /// Announced size.
        expected: u64,
        /// Bytes received so far.
        actual: u64,
    },

    /// The block number space ran out before the file was complete.
    #[error("no block number after {block}")]
    BlockNumberOverflow {
        /// Last block received.
        block: u32,
    },

    /// The block stream ended.
    #[error("file block stream closed")]
    StreamClosed,
}

/// Errors surfaced by the request/response layer and the command layers.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Transport failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Payload could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Unrecoverable framing failure.
    #[error(transparent)]
    Framing(#[from] FramingError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No acknowledgement arrived in time.
    #[error("{command:?} #{packet_number}: no acknowledgement within {timeout:?}")]
    Timeout {
        /// Command sent.
        command: Command,
        /// Packet number used.
        packet_number: u8,
        /// Time waited.
        timeout: Duration,
    },

    /// The device reported a failure.
    #[error("{label} failed: {code}")]
    Device {
        /// Operation that failed.
        label: &'static str,
        /// Device result code.
        code: ResultAndError,
    },

    /// The device answered with an acknowledgement of another type.
    #[error("{label}: unexpected acknowledgement {actual:?}")]
    UnexpectedAck {
        /// Operation that was running.
        label: &'static str,
        /// Command of the received acknowledgement.
        actual: Command,
    },

    /// A dyscom get answered a different sub-type than asked for.
    #[error("{label}: expected {expected:?}, device answered {actual:?}")]
    UnexpectedGetType {
        /// Operation that was running.
        label: &'static str,
        /// Sub-type requested.
        expected: DyscomGetType,
        /// Sub-type received.
        actual: DyscomGetType,
    },

    /// Mid-level stimulation reported an error on at least one channel.
    #[error("{label}: channel error {channels:?}")]
    ChannelError {
        /// Operation that was running.
        label: &'static str,
        /// Error flag per channel.
        channels: [bool; 4],
    },

    /// Every packet number is waiting for an acknowledgement.
    #[error("no free packet number")]
    NoFreePacketNumber,

    /// The connection went away while a request was waiting.
    #[error("connection lost")]
    ConnectionLost,

    /// No tokio runtime to run the read loop on.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// File transfer failure.
    #[error(transparent)]
    FileTransfer(#[from] FileTransferError),
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Map a device result code to `Ok` or [`LayerError::Device`].
pub fn check_result(code: ResultAndError, label: &'static str) -> LayerResult<()> {
    if code.is_ok() {
        Ok(())
    } else {
        Err(LayerError::Device { label, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_device_error_display() {
        let err = check_result(ResultAndError::Busy, "DyscomStart").unwrap_err();
        assert_eq!(err.to_string(), "DyscomStart failed: Busy (21)");
    }

    proptest! {
        #[test]
        fn prop_only_no_error_passes(code in any::<u8>()) {
            let result = check_result(ResultAndError::from(code), "Test");
            prop_assert_eq!(result.is_ok(), code == 0);
        }
    }
}
