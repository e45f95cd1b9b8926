//! Common types used in the protocol.

use sciencemode_bits::{BitField, BitLayout, ByteBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Declare a closed one-byte enumeration with checked conversion from the wire.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)*
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::error::ProtocolError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)*
                    other => Err($crate::error::ProtocolError::InvalidValue {
                        field: stringify!($name),
                        value: u64::from(other),
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum! {
    /// Stimulation channel.
    #[derive(Default, Serialize, Deserialize)]
    pub enum Channel {
        /// Red channel.
        #[default]
        Red = 0,
        /// Blue channel.
        Blue = 1,
        /// Black channel.
        Black = 2,
        /// White channel.
        White = 3,
    }
}

wire_enum! {
    /// Electrode connector.
    #[derive(Default, Serialize, Deserialize)]
    pub enum Connector {
        /// Yellow connector.
        #[default]
        Yellow = 0,
        /// Green connector.
        Green = 1,
    }
}

wire_enum! {
    /// High-voltage level for low-level stimulation.
    #[derive(Default, Serialize, Deserialize)]
    pub enum HighVoltage {
        /// Device default.
        #[default]
        Default = 0,
        /// High voltage off.
        Off = 1,
        /// 30 V.
        V30 = 2,
        /// 60 V.
        V60 = 3,
        /// 90 V.
        V90 = 4,
        /// 120 V.
        V120 = 5,
        /// 150 V.
        V150 = 6,
    }
}

/// Largest pulse duration representable on the wire.
pub const MAX_POINT_DURATION_US: u16 = (1 << 12) - 1;
/// Current range accepted by the point encoding.
pub const MAX_POINT_CURRENT_MA: i16 = 150;

const POINT_CURRENT_OFFSET: i32 = 300;

/// Bit layout of one stimulation point (transmitted high byte first).
pub const CHANNEL_POINT_LAYOUT: BitLayout = BitLayout::new(
    &[
        BitField::new("reserved", 0, 10),
        BitField::new("current", 10, 10),
        BitField::new("duration", 20, 12),
    ],
    4,
    true,
);

/// One point of a stimulation pulse shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPoint {
    /// Duration of the point in microseconds.
    pub duration_us: u16,
    /// Current in milliampere (negative for the opposite phase).
    pub current_ma: i16,
}

impl ChannelPoint {
    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    /// Create a new point.
    pub fn new(duration_us: u16, current_ma: i16) -> Self {
        ChannelPoint {
            duration_us,
            current_ma,
        }
    }

    /// Append the 4-byte wire form of this point.
    pub fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.duration_us > MAX_POINT_DURATION_US {
            return Err(ProtocolError::invalid_argument(format!(
                "point duration {} us exceeds {} us",
                self.duration_us, MAX_POINT_DURATION_US
            )));
        }
        if self.current_ma.unsigned_abs() > MAX_POINT_CURRENT_MA.unsigned_abs() {
            return Err(ProtocolError::invalid_argument(format!(
                "point current {} mA outside +/-{} mA",
                self.current_ma, MAX_POINT_CURRENT_MA
            )));
        }

        let c = 2 * i32::from(self.current_ma) + POINT_CURRENT_OFFSET;
        let offset = bb.byte_len();
        CHANNEL_POINT_LAYOUT.write(bb, offset, &[0, c as u64, u64::from(self.duration_us)])?;
        Ok(())
    }

    /// Encode this point into its 4-byte wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut bb = ByteBuilder::new();
        self.write(&mut bb)?;
        Ok(bb.to_bytes()?)
    }

    /// Decode a point from its 4-byte wire form.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let fields = CHANNEL_POINT_LAYOUT.decode(data)?;
        let current = (fields[1] as i32 - POINT_CURRENT_OFFSET) / 2;
        Ok(ChannelPoint {
            duration_us: fields[2] as u16,
            current_ma: current as i16,
        })
    }
}

/// Encode `value` into exactly `byte_count` bytes, zero padded.
///
/// The string is truncated so that the last byte is always a terminating zero.
pub fn str_to_fixed_bytes(value: &str, byte_count: usize) -> Vec<u8> {
    let mut buf = vec![0u8; byte_count];
    let bytes = value.as_bytes();
    let len = bytes.len().min(byte_count.saturating_sub(1));
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Decode a zero-terminated string from at most `byte_count` bytes.
pub fn fixed_bytes_to_str(data: &[u8], byte_count: usize) -> String {
    let data = &data[..byte_count.min(data.len())];
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}
