//! Growable bit-addressable storage.

use bitvec::prelude::*;

use crate::error::{BitError, BitResult};

/// An ordered sequence of bits addressed by absolute position.
///
/// Bit `n` lives in byte `n / 8` at bit `n % 8` (least-significant bit
/// first). Writing past the current length extends the vector; any bit that
/// was never written reads as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVector {
    bits: BitVec<u8, Lsb0>,
}

impl BitVector {
    /// Create an empty bit vector.
    pub fn new() -> Self {
        BitVector { bits: BitVec::new() }
    }

    /// Create an empty bit vector with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        BitVector {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Create a bit vector holding a copy of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        BitVector {
            bits: BitVec::from_slice(data),
        }
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if no bit has been written.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns true if the length is a multiple of 8.
    pub fn is_byte_aligned(&self) -> bool {
        self.bits.len() % 8 == 0
    }

    /// Read the bit at `position`. Bits beyond the length read as `false`.
    pub fn get(&self, position: usize) -> bool {
        self.bits.get(position).is_some_and(|bit| *bit)
    }

    /// Write the bit at `position`, extending the vector if needed.
    pub fn set(&mut self, position: usize, bit: bool) {
        self.ensure_len(position + 1);
        self.bits.set(position, bit);
    }

    /// Append one bit at the end.
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Read `width` bits (at most 64) starting at `position` as an integer,
    /// least-significant bit first. Bits beyond the length read as zero.
    pub fn load(&self, position: usize, width: usize) -> u64 {
        let end = (position + width.min(64)).min(self.bits.len());
        if position >= end {
            return 0;
        }
        self.bits[position..end].load_le::<u64>()
    }

    /// Write the low `width` bits (at most 64) of `value` starting at
    /// `position`, extending the vector if needed.
    pub fn store(&mut self, position: usize, width: usize, value: u64) {
        let width = width.min(64);
        if width == 0 {
            return;
        }
        self.ensure_len(position + width);
        self.bits[position..position + width].store_le(value);
    }

    /// Append all bits of `data` at the current end.
    pub fn extend_from_bytes(&mut self, data: &[u8]) {
        self.bits.extend_from_bitslice(data.view_bits::<Lsb0>());
    }

    /// Export the bits as bytes.
    ///
    /// Fails with [`BitError::Unaligned`] if the length is not a multiple of 8;
    /// an unaligned tail is never silently padded or dropped.
    pub fn to_bytes(&self) -> BitResult<Vec<u8>> {
        if !self.is_byte_aligned() {
            return Err(BitError::Unaligned { bits: self.len() });
        }
        Ok(self
            .bits
            .chunks_exact(8)
            .map(|byte| byte.load_le::<u8>())
            .collect())
    }

    /// Remove all bits.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    fn ensure_len(&mut self, bits: usize) {
        if bits > self.bits.len() {
            self.bits.resize(bits, false);
        }
    }
}
