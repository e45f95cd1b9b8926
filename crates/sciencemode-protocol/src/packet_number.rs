//! Cyclic packet number allocation.

use crate::constants::PACKET_NUMBER_COUNT;
use crate::error::ProtocolError;

/// Hands out packet numbers cyclically over `0..count`.
///
/// Owned by a single correlation layer; not shared between callers.
#[derive(Debug, Clone)]
pub struct PacketNumberGenerator {
    next: u8,
    count: u8,
}

impl Default for PacketNumberGenerator {
    fn default() -> Self {
        PacketNumberGenerator {
            next: 0,
            count: PACKET_NUMBER_COUNT as u8,
        }
    }
}

impl PacketNumberGenerator {
    /// Create a generator over the full packet number space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator over `0..count`; `count` must be 1 to 64.
    pub fn with_count(count: usize) -> Result<Self, ProtocolError> {
        if count == 0 || count > PACKET_NUMBER_COUNT {
            return Err(ProtocolError::invalid_argument(format!(
                "packet number count must be 1 to {}, got {}",
                PACKET_NUMBER_COUNT, count
            )));
        }
        Ok(PacketNumberGenerator {
            next: 0,
            count: count as u8,
        })
    }

    /// Size of the number space.
    pub fn count(&self) -> usize {
        usize::from(self.count)
    }

    /// Return the next packet number and advance.
    pub fn next(&mut self) -> u8 {
        let number = self.next;
        self.next = (self.next + 1) % self.count;
        number
    }

    /// Return the next number for which `in_use` is false.
    ///
    /// Returns `None` when the whole space is in use.
    pub fn next_free(&mut self, mut in_use: impl FnMut(u8) -> bool) -> Option<u8> {
        for _ in 0..self.count {
            let number = self.next();
            if !in_use(number) {
                return Some(number);
            }
        }
        None
    }

    /// Restart at zero.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_after_count() {
        let mut generator = PacketNumberGenerator::new();
        let numbers: Vec<u8> = (0..66).map(|_| generator.next()).collect();
        assert_eq!(numbers[0], 0);
        assert_eq!(numbers[63], 63);
        assert_eq!(numbers[64], 0);
        assert_eq!(numbers[65], 1);
    }

    #[test]
    fn test_custom_count() {
        let mut generator = PacketNumberGenerator::with_count(3).unwrap();
        assert_eq!([generator.next(), generator.next(), generator.next(), generator.next()], [0, 1, 2, 0]);
        assert!(PacketNumberGenerator::with_count(0).is_err());
        assert!(PacketNumberGenerator::with_count(65).is_err());
    }

    #[test]
    fn test_next_free_skips_used() {
        let mut generator = PacketNumberGenerator::with_count(4).unwrap();
        assert_eq!(generator.next_free(|n| n < 2), Some(2));
        assert_eq!(generator.next_free(|n| n == 3), Some(0));
        assert_eq!(generator.next_free(|_| true), None);
    }

    #[test]
    fn test_reset() {
        let mut generator = PacketNumberGenerator::new();
        generator.next();
        generator.next();
        generator.reset();
        assert_eq!(generator.next(), 0);
    }
}
