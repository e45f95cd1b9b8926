//! Bit-level building blocks for the ScienceMode wire protocol.
//!
//! Device payloads are described as bit layouts: fields of arbitrary width
//! written at absolute bit offsets, least-significant bit first, with some
//! multi-byte spans transmitted most-significant byte first. This crate
//! provides the three pieces every payload encoder and decoder is built on:
//!
//! - [`BitVector`]: a growable, bit-addressable buffer.
//! - [`ByteBuilder`]: integer and byte composition on top of a `BitVector`,
//!   including the byte-order reversal (`swap`) used for big-endian spans.
//! - [`BitLayout`]: a declarative table of named fields (offset + width)
//!   that encodes and decodes a fixed-size structure in one call.
//!
//! # Example
//!
//! ```rust
//! use sciencemode_bits::ByteBuilder;
//!
//! let mut bb = ByteBuilder::new();
//! bb.set_bits(0, 0, 10).unwrap();
//! bb.set_bits(340, 10, 10).unwrap();
//! bb.set_bits(200, 20, 12).unwrap();
//! bb.swap(0, 4).unwrap();
//! assert_eq!(bb.to_bytes().unwrap(), vec![0x0C, 0x85, 0x50, 0x00]);
//! ```

mod bit_vector;
mod byte_builder;
mod error;
mod layout;

pub use bit_vector::*;
pub use byte_builder::*;
pub use error::*;
pub use layout::*;
