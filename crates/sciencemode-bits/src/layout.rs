//! Declarative fixed-size bit layouts.
//!
//! A [`BitLayout`] names every field of a fixed-size structure with its bit
//! offset and width, plus whether the finished bytes are transmitted in
//! reversed order. Payload code then writes and reads whole structures
//! instead of repeating bit arithmetic per command.

use crate::byte_builder::ByteBuilder;
use crate::error::{BitError, BitResult};

/// One named field in a [`BitLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Field name, used in overflow errors.
    pub name: &'static str,
    /// Bit offset relative to the start of the structure.
    pub offset: usize,
    /// Width in bits.
    pub width: usize,
}

impl BitField {
    /// Declare a field.
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        BitField { name, offset, width }
    }

    /// Largest value that fits the field.
    pub fn max_value(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

/// A fixed-size structure made of [`BitField`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLayout {
    /// Fields in declaration order.
    pub fields: &'static [BitField],
    /// Size of the structure in bytes.
    pub byte_len: usize,
    /// Reverse the byte order of the whole structure after writing.
    pub swapped: bool,
}

impl BitLayout {
    /// Declare a layout.
    pub const fn new(fields: &'static [BitField], byte_len: usize, swapped: bool) -> Self {
        BitLayout {
            fields,
            byte_len,
            swapped,
        }
    }

    /// Write `values` (one per field, declaration order) at `byte_offset`.
    ///
    /// Every value is checked against its field width before anything is
    /// written.
    pub fn write(&self, bb: &mut ByteBuilder, byte_offset: usize, values: &[u64]) -> BitResult<()> {
        if values.len() != self.fields.len() {
            return Err(BitError::LengthMismatch {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        for (field, &value) in self.fields.iter().zip(values) {
            if value > field.max_value() {
                return Err(BitError::FieldOverflow {
                    field: field.name,
                    value,
                    width: field.width,
                });
            }
        }

        let base = byte_offset * 8;
        // reserve the full structure so unused bits are zero
        for x in 0..self.byte_len {
            bb.set_bits(0, base + x * 8, 8)?;
        }
        for (field, &value) in self.fields.iter().zip(values) {
            bb.set_bits(value, base + field.offset, field.width)?;
        }
        if self.swapped {
            bb.swap(byte_offset, self.byte_len)?;
        }
        Ok(())
    }

    /// Encode `values` into a standalone byte vector.
    pub fn encode(&self, values: &[u64]) -> BitResult<Vec<u8>> {
        let mut bb = ByteBuilder::new();
        self.write(&mut bb, 0, values)?;
        bb.to_bytes()
    }

    /// Decode field values from the first `byte_len` bytes of `data`.
    pub fn decode(&self, data: &[u8]) -> BitResult<Vec<u64>> {
        if data.len() < self.byte_len {
            return Err(BitError::LengthMismatch {
                expected: self.byte_len,
                actual: data.len(),
            });
        }
        let mut bb = ByteBuilder::from_bytes(&data[..self.byte_len]);
        if self.swapped {
            bb.swap(0, self.byte_len)?;
        }
        self.fields
            .iter()
            .map(|field| bb.get_bits(field.offset, field.width))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const POINT: BitLayout = BitLayout::new(
        &[
            BitField::new("reserved", 0, 10),
            BitField::new("current", 10, 10),
            BitField::new("duration", 20, 12),
        ],
        4,
        true,
    );

    #[test]
    fn test_encode_swapped_layout() {
        assert_eq!(POINT.encode(&[0, 340, 200]).unwrap(), vec![0x0C, 0x85, 0x50, 0x00]);
    }

    #[test]
    fn test_write_at_offset() {
        let mut bb = ByteBuilder::new();
        bb.append_byte(0xEE);
        POINT.write(&mut bb, 1, &[0, 340, 200]).unwrap();
        assert_eq!(bb.to_bytes().unwrap(), vec![0xEE, 0x0C, 0x85, 0x50, 0x00]);
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            POINT.encode(&[0, 1024, 0]),
            Err(BitError::FieldOverflow { field: "current", value: 1024, width: 10 })
        );
    }

    #[test]
    fn test_wrong_value_count() {
        assert_eq!(
            POINT.encode(&[1, 2]),
            Err(BitError::LengthMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_decode_short_input() {
        assert_eq!(
            POINT.decode(&[0, 1]),
            Err(BitError::LengthMismatch { expected: 4, actual: 2 })
        );
    }

    proptest! {
        #[test]
        fn prop_layout_round_trip(current in 0u64..1024, duration in 0u64..4096) {
            let bytes = POINT.encode(&[0, current, duration]).unwrap();
            prop_assert_eq!(bytes.len(), 4);
            prop_assert_eq!(POINT.decode(&bytes).unwrap(), vec![0, current, duration]);
        }
    }
}
