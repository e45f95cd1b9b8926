//! Packet and acknowledgement model.
//!
//! Outgoing commands implement [`Payload`] (and [`Request`] when the device
//! answers them); incoming frames decode into an [`AckPayload`] type. The
//! closed set of acknowledgement types is gathered in the [`PacketAck`]
//! enum, which is what the framing layer hands to the correlation layer.

use bytes::Bytes;
use sciencemode_bits::ByteBuilder;

use crate::commands::Command;
use crate::dyscom::*;
use crate::error::ProtocolError;
use crate::general::*;
use crate::low_level::*;
use crate::mid_level::*;
use crate::result::ResultAndError;

/// An outgoing command payload.
pub trait Payload {
    /// Command code sent on the wire.
    const COMMAND: Command;

    /// Write the payload bytes. Most commands carry no payload.
    fn write(&self, _bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// A command the device answers with an acknowledgement.
pub trait Request: Payload {
    /// Acknowledgement type of this request.
    type Ack: AckPayload;
}

/// An incoming acknowledgement payload.
///
/// `Default` provides the values used when no payload is available: result
/// `NoError`, empty strings, zero numbers.
pub trait AckPayload: Default + Sized + Into<PacketAck> + TryFrom<PacketAck, Error = PacketAck> {
    /// Command code this acknowledgement arrives with.
    const COMMAND: Command;

    /// Decode the payload bytes.
    fn decode(data: &[u8]) -> Result<Self, ProtocolError>;

    /// Device-reported outcome.
    fn result_error(&self) -> ResultAndError;
}

/// An encoded outgoing packet: command code plus payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    command: Command,
    data: Bytes,
}

impl Packet {
    /// Encode a payload into a packet.
    pub fn new<P: Payload>(payload: &P) -> Result<Self, ProtocolError> {
        let mut bb = ByteBuilder::new();
        payload.write(&mut bb)?;
        Ok(Packet {
            command: P::COMMAND,
            data: Bytes::from(bb.to_bytes()?),
        })
    }

    /// Build a packet from an already encoded payload.
    pub fn from_raw(command: Command, data: impl Into<Bytes>) -> Self {
        Packet {
            command,
            data: data.into(),
        }
    }

    /// Command code.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Payload bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Read the leading result byte of an acknowledgement.
pub(crate) fn read_result(command: Command, data: &[u8]) -> Result<ResultAndError, ProtocolError> {
    ProtocolError::ensure_len(command, data, 1)?;
    Ok(ResultAndError::from(data[0]))
}

/// Signature of a registered acknowledgement decoder.
pub type DecodeFn = fn(&[u8]) -> Result<PacketAck, ProtocolError>;

fn decode_as<T: AckPayload>(data: &[u8]) -> Result<PacketAck, ProtocolError> {
    T::decode(data).map(Into::into)
}

macro_rules! packet_acks {
    ($($(#[$meta:meta])* $variant:ident($ty:ty)),* $(,)?) => {
        /// A decoded acknowledgement (or unsolicited device frame) of any type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum PacketAck {
            $($(#[$meta])* $variant($ty),)*
        }

        impl PacketAck {
            /// Command code of the acknowledgement.
            pub fn command(&self) -> Command {
                match self {
                    $(PacketAck::$variant(_) => <$ty as AckPayload>::COMMAND,)*
                }
            }

            /// Device-reported outcome.
            pub fn result_error(&self) -> ResultAndError {
                match self {
                    $(PacketAck::$variant(ack) => ack.result_error(),)*
                }
            }
        }

        $(
            impl From<$ty> for PacketAck {
                fn from(ack: $ty) -> Self {
                    PacketAck::$variant(ack)
                }
            }

            impl TryFrom<PacketAck> for $ty {
                type Error = PacketAck;

                fn try_from(ack: PacketAck) -> Result<Self, PacketAck> {
                    match ack {
                        PacketAck::$variant(ack) => Ok(ack),
                        #[allow(unreachable_patterns)]
                        other => Err(other),
                    }
                }
            }
        )*

        /// Decoder table for every acknowledgement type.
        pub(crate) const DECODERS: &[(Command, DecodeFn)] = &[
            $((<$ty as AckPayload>::COMMAND, decode_as::<$ty>),)*
        ];
    };
}

packet_acks! {
    /// General get version.
    GetVersion(GetVersionAck),
    /// General get device id.
    GetDeviceId(GetDeviceIdAck),
    /// General reset.
    Reset(ResetAck),
    /// Device rejected an unrecognised request.
    UnknownCommand(UnknownCommandAck),
    /// Low-level init.
    LowLevelInit(LowLevelInitAck),
    /// Low-level channel config.
    LowLevelChannelConfig(LowLevelChannelConfigAck),
    /// Low-level stop.
    LowLevelStop(LowLevelStopAck),
    /// Mid-level init.
    MidLevelInit(MidLevelInitAck),
    /// Mid-level update.
    MidLevelUpdate(MidLevelUpdateAck),
    /// Mid-level stop.
    MidLevelStop(MidLevelStopAck),
    /// Mid-level get current data.
    MidLevelGetCurrentData(MidLevelGetCurrentDataAck),
    /// Dyscom init.
    DyscomInit(DyscomInitAck),
    /// Dyscom start.
    DyscomStart(DyscomStartAck),
    /// Dyscom stop.
    DyscomStop(DyscomStopAck),
    /// Dyscom get (any sub-type).
    DyscomGet(DyscomGetAck),
    /// Dyscom power module.
    DyscomPowerModule(DyscomPowerModuleAck),
    /// Unsolicited file block.
    DyscomSendFile(DyscomSendFile),
}

/// Declare an acknowledgement that only carries the result byte.
macro_rules! result_only_ack {
    ($(#[$meta:meta])* $name:ident, $command:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            /// Device-reported outcome.
            pub result_error: $crate::result::ResultAndError,
        }

        impl $crate::packet::AckPayload for $name {
            const COMMAND: $crate::commands::Command = $command;

            fn decode(data: &[u8]) -> Result<Self, $crate::error::ProtocolError> {
                Ok($name {
                    result_error: $crate::packet::read_result(Self::COMMAND, data)?,
                })
            }

            fn result_error(&self) -> $crate::result::ResultAndError {
                self.result_error
            }
        }
    };
}

/// Declare a request without payload.
macro_rules! empty_request {
    ($(#[$meta:meta])* $name:ident, $command:expr, $ack:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $crate::packet::Payload for $name {
            const COMMAND: $crate::commands::Command = $command;
        }

        impl $crate::packet::Request for $name {
            type Ack = $ack;
        }
    };
}

pub(crate) use empty_request;
pub(crate) use result_only_ack;
