//! Byte composition on top of [`BitVector`].

use crate::bit_vector::BitVector;
use crate::error::{BitError, BitResult};

/// Maximum width of a single integer field.
pub const MAX_FIELD_WIDTH: usize = 64;

/// Composes byte sequences from integers, bit fields and raw bytes.
///
/// Fields are written least-significant bit first, either appended at the
/// next free bit or placed at an absolute bit offset. [`ByteBuilder::swap`]
/// reverses the byte order of a span afterwards, which is how big-endian
/// multi-byte device fields are produced from a little-endian bit layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuilder {
    data: BitVector,
}

impl ByteBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        ByteBuilder {
            data: BitVector::new(),
        }
    }

    /// Create a builder pre-filled with `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        ByteBuilder {
            data: BitVector::from_bytes(data),
        }
    }

    /// Current length in bits.
    pub fn bit_len(&self) -> usize {
        self.data.len()
    }

    /// Current length in whole bytes (rounded up).
    pub fn byte_len(&self) -> usize {
        self.data.len().div_ceil(8)
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the low `bit_length` bits of `value` starting at `bit_position`.
    ///
    /// Storage is extended as needed. Higher bits of `value` are ignored.
    pub fn set_bits(&mut self, value: u64, bit_position: usize, bit_length: usize) -> BitResult<()> {
        check_width(bit_length)?;
        self.data.store(bit_position, bit_length, value);
        Ok(())
    }

    /// Read `bit_length` bits starting at `bit_position`.
    ///
    /// Bits that were never written read as zero.
    pub fn get_bits(&self, bit_position: usize, bit_length: usize) -> BitResult<u64> {
        check_width(bit_length)?;
        Ok(self.data.load(bit_position, bit_length))
    }

    /// Append `bit_length` bits of `value` at the next free bit.
    pub fn append_bits(&mut self, value: u64, bit_length: usize) -> BitResult<()> {
        let position = self.data.len();
        self.set_bits(value, position, bit_length)
    }

    /// Append a full byte.
    pub fn append_byte(&mut self, value: u8) {
        let position = self.data.len();
        self.data.store(position, 8, u64::from(value));
    }

    /// Append raw bytes.
    pub fn append_bytes(&mut self, data: &[u8]) {
        self.data.extend_from_bytes(data);
    }

    /// Append `byte_count` bytes of `value`, optionally most-significant byte first.
    pub fn append_value(&mut self, value: u64, byte_count: usize, big_endian: bool) -> BitResult<()> {
        let start = self.data.len();
        self.append_bits(value, byte_count * 8)?;
        if big_endian {
            if start % 8 != 0 {
                return Err(BitError::Unaligned { bits: start });
            }
            self.swap(start / 8, byte_count)?;
        }
        Ok(())
    }

    /// Reverse the order of `byte_count` bytes starting at `byte_offset`.
    ///
    /// The span must lie within the written data. Applying the same swap
    /// twice restores the original bytes.
    pub fn swap(&mut self, byte_offset: usize, byte_count: usize) -> BitResult<()> {
        let len = self.byte_len();
        let end = byte_offset + byte_count;
        if end > len {
            return Err(BitError::SpanOutOfRange {
                offset: byte_offset,
                end,
                len,
            });
        }

        let span: Vec<u64> = (byte_offset..end)
            .map(|i| self.get_bits(i * 8, 8))
            .collect::<BitResult<_>>()?;
        for (x, byte) in span.into_iter().enumerate() {
            self.set_bits(byte, (end - x - 1) * 8, 8)?;
        }
        Ok(())
    }

    /// Export the content as bytes. Fails if the bit length is not byte aligned.
    pub fn to_bytes(&self) -> BitResult<Vec<u8>> {
        self.data.to_bytes()
    }

    /// Remove all content.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

fn check_width(bit_length: usize) -> BitResult<()> {
    if bit_length > MAX_FIELD_WIDTH {
        return Err(BitError::WidthTooLarge { width: bit_length });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pulse_point_vector() {
        // duration 200us, current 20 -> c = 2 * 20 + 300 = 340
        let mut bb = ByteBuilder::new();
        bb.set_bits(0, 0, 10).unwrap();
        bb.set_bits(340, 10, 10).unwrap();
        bb.set_bits(200, 20, 12).unwrap();

        assert_eq!(bb.get_bits(0, 10).unwrap(), 0);
        assert_eq!(bb.get_bits(10, 10).unwrap(), 340);
        assert_eq!(bb.get_bits(20, 12).unwrap(), 200);
        assert_eq!(bb.to_bytes().unwrap(), vec![0x00, 0x50, 0x85, 0x0C]);

        bb.swap(0, 4).unwrap();
        assert_eq!(bb.to_bytes().unwrap(), vec![0x0C, 0x85, 0x50, 0x00]);
    }

    #[test]
    fn test_append_byte_and_value() {
        let mut bb = ByteBuilder::new();
        bb.append_byte(0x12);
        bb.append_value(0x3456, 2, false).unwrap();
        bb.append_value(0x789A, 2, true).unwrap();
        assert_eq!(bb.to_bytes().unwrap(), vec![0x12, 0x56, 0x34, 0x78, 0x9A]);
    }

    #[test]
    fn test_out_of_order_writes() {
        let mut bb = ByteBuilder::new();
        bb.set_bits(0xA, 12, 4).unwrap();
        bb.set_bits(0x5, 0, 4).unwrap();
        assert_eq!(bb.to_bytes().unwrap(), vec![0x05, 0xA0]);
    }

    #[test]
    fn test_swap_out_of_range() {
        let mut bb = ByteBuilder::from_bytes(&[1, 2, 3]);
        assert_eq!(
            bb.swap(1, 3),
            Err(BitError::SpanOutOfRange { offset: 1, end: 4, len: 3 })
        );
    }

    #[test]
    fn test_unaligned_tail_reported() {
        let mut bb = ByteBuilder::new();
        bb.append_bits(1, 3).unwrap();
        assert_eq!(bb.to_bytes(), Err(BitError::Unaligned { bits: 3 }));
    }

    #[test]
    fn test_width_too_large() {
        let mut bb = ByteBuilder::new();
        assert_eq!(bb.set_bits(0, 0, 65), Err(BitError::WidthTooLarge { width: 65 }));
    }

    #[test]
    fn test_clear() {
        let mut bb = ByteBuilder::from_bytes(&[9, 9]);
        bb.clear();
        assert!(bb.is_empty());
        bb.append_byte(7);
        assert_eq!(bb.to_bytes().unwrap(), vec![7]);
    }

    proptest! {
        #[test]
        fn prop_swap_twice_is_identity(
            data in proptest::collection::vec(any::<u8>(), 1..64),
            offset in 0usize..64,
            count in 0usize..64,
        ) {
            let offset = offset % data.len();
            let count = count % (data.len() - offset + 1);
            let mut bb = ByteBuilder::from_bytes(&data);
            bb.swap(offset, count).unwrap();
            bb.swap(offset, count).unwrap();
            prop_assert_eq!(bb.to_bytes().unwrap(), data);
        }

        #[test]
        fn prop_fields_round_trip(a in 0u64..(1 << 10), b in 0u64..(1 << 10), c in 0u64..(1 << 12)) {
            let mut bb = ByteBuilder::new();
            // written out of declaration order
            bb.set_bits(c, 20, 12).unwrap();
            bb.set_bits(a, 0, 10).unwrap();
            bb.set_bits(b, 10, 10).unwrap();
            let bytes = bb.to_bytes().unwrap();

            let read = ByteBuilder::from_bytes(&bytes);
            prop_assert_eq!(read.get_bits(0, 10).unwrap(), a);
            prop_assert_eq!(read.get_bits(10, 10).unwrap(), b);
            prop_assert_eq!(read.get_bits(20, 12).unwrap(), c);
        }
    }
}
