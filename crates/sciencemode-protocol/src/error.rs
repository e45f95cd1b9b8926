//! Protocol error types.

use sciencemode_bits::BitError;
use thiserror::Error;

use crate::commands::Command;

/// Errors raised while encoding or decoding packet payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload is too short for the acknowledgement it should hold.
    #[error("{command:?} payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Command being decoded.
        command: Command,
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Encoded packet does not fit into one frame.
    #[error("payload too large: maximum {max} bytes, got {actual}")]
    PayloadTooLarge {
        /// Maximum allowed payload length.
        max: usize,
        /// Actual payload length.
        actual: usize,
    },

    /// A field holds a value outside its enumeration.
    #[error("invalid value {value} for {field}")]
    InvalidValue {
        /// Field or enumeration name.
        field: &'static str,
        /// Raw value.
        value: u64,
    },

    /// An outgoing parameter cannot be represented on the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No decoder is registered for this command code.
    #[error("no acknowledgement decoder for command code {0}")]
    UnknownCommand(u16),

    /// Bit layout failure.
    #[error(transparent)]
    Bits(#[from] BitError),
}

impl ProtocolError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ProtocolError::InvalidArgument(message.into())
    }

    /// Check that `data` holds at least `expected` bytes for `command`.
    pub fn ensure_len(command: Command, data: &[u8], expected: usize) -> Result<(), ProtocolError> {
        if data.len() < expected {
            return Err(ProtocolError::PayloadTooShort {
                command,
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// Errors raised by the frame reassembler.
///
/// All variants except [`FramingError::Unsynchronizable`] are recovered
/// locally by discarding bytes up to the next start byte.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// A new start byte appeared before the current frame was complete.
    #[error("truncated frame: new start byte after {len} bytes")]
    Truncated {
        /// Bytes of the abandoned frame.
        len: usize,
    },

    /// A header byte was not properly stuffed.
    #[error("malformed frame header")]
    InvalidHeader,

    /// Length field outside the valid range.
    #[error("invalid frame length {length}")]
    InvalidLength {
        /// Length announced by the header.
        length: usize,
    },

    /// Frame did not end with the stop byte.
    #[error("bad terminator 0x{0:02X}")]
    BadTerminator(u8),

    /// Stuffing byte at the end of the body.
    #[error("invalid byte stuffing")]
    InvalidStuffing,

    /// Checksum did not match the body.
    #[error("checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    ChecksumMismatch {
        /// Checksum from the header.
        expected: u16,
        /// Checksum computed over the body.
        actual: u16,
    },

    /// Command code without a registered acknowledgement.
    #[error("unknown command code {code} (packet number {packet_number})")]
    UnknownCommand {
        /// Raw command code.
        code: u16,
        /// Packet number from the command word.
        packet_number: u8,
    },

    /// No valid frame found within the resynchronisation window.
    #[error("stream unsynchronizable: {discarded} bytes without a valid frame")]
    Unsynchronizable {
        /// Number of discarded bytes.
        discarded: usize,
    },
}

impl FramingError {
    /// Returns true if the byte stream cannot be recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FramingError::Unsynchronizable { .. })
    }
}
