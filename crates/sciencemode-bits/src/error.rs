//! Error types for bit-level encoding.

use thiserror::Error;

/// Errors that can occur while building or reading bit layouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// Byte export was requested while the bit length is not a multiple of 8.
    #[error("bit length {bits} is not byte aligned")]
    Unaligned {
        /// Current length in bits.
        bits: usize,
    },

    /// A field wider than the supported 64 bits was requested.
    #[error("field width {width} exceeds 64 bits")]
    WidthTooLarge {
        /// Requested width in bits.
        width: usize,
    },

    /// A byte span reaches beyond the written data.
    #[error("byte span {offset}..{end} out of range (length {len} bytes)")]
    SpanOutOfRange {
        /// First byte of the span.
        offset: usize,
        /// One past the last byte of the span.
        end: usize,
        /// Number of bytes available.
        len: usize,
    },

    /// A field value does not fit into its declared width.
    #[error("value {value} does not fit field '{field}' ({width} bits)")]
    FieldOverflow {
        /// Field name from the layout.
        field: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Declared width in bits.
        width: usize,
    },

    /// Wrong number of values or bytes for a layout.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected count.
        expected: usize,
        /// Actual count.
        actual: usize,
    },
}

/// Result type alias for bit operations.
pub type BitResult<T> = Result<T, BitError>;
