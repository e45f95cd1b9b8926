//! Stream-level protocol session: packets in, decoded acknowledgements out.

use crate::commands::Command;
use crate::error::{FramingError, ProtocolError};
use crate::factory::PacketFactory;
use crate::frame::{Frame, FrameCodec};
use crate::packet::{Packet, PacketAck};

/// One frame read from the device.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Packet number of the frame.
    pub packet_number: u8,
    /// Command code of the frame.
    pub command: Command,
    /// Decoded acknowledgement, or the payload decode failure.
    pub ack: Result<PacketAck, ProtocolError>,
}

/// Encodes outgoing packets and reassembles incoming acknowledgements.
///
/// Bytes from the transport are fed in with [`Protocol::feed`] in chunks of
/// any size; [`Protocol::next_frame`] yields complete frames.
#[derive(Debug, Default)]
pub struct Protocol {
    codec: FrameCodec,
    factory: PacketFactory,
}

impl Protocol {
    /// Create a new protocol session.
    pub fn new() -> Self {
        Protocol {
            codec: FrameCodec::new(),
            factory: PacketFactory::new(),
        }
    }

    /// Encode `packet` with `packet_number` into wire bytes.
    pub fn encode_packet(&self, packet: &Packet, packet_number: u8) -> Result<Vec<u8>, ProtocolError> {
        let frame = Frame::new(packet.command().code(), packet_number, packet.data().clone());
        let bytes = FrameCodec::encode(&frame)?;
        log::trace!(
            "tx {:?} #{} {}",
            packet.command(),
            packet_number,
            hex::encode(&bytes)
        );
        Ok(bytes)
    }

    /// Feed received data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.codec.push(data);
    }

    /// Try to decode the next frame.
    ///
    /// Returns `None` if more data is needed. Frames with a command code
    /// outside the protocol are framing errors; frames whose payload fails
    /// to decode are returned with `ack` set to the error so the caller can
    /// fail the matching request.
    pub fn next_frame(&mut self) -> Option<Result<DecodedFrame, FramingError>> {
        let frame = match self.codec.decode()? {
            Ok(frame) => frame,
            Err(err) => return Some(Err(err)),
        };
        let Some(command) = Command::from_code(frame.code) else {
            log::debug!("frame with unknown command code {}", frame.code);
            return Some(Err(FramingError::UnknownCommand {
                code: frame.code,
                packet_number: frame.packet_number,
            }));
        };
        let ack = self.factory.decode(command, &frame.payload);
        if let Err(err) = &ack {
            log::debug!("{:?} #{}: {}", command, frame.packet_number, err);
        }
        Some(Ok(DecodedFrame {
            packet_number: frame.packet_number,
            command,
            ack,
        }))
    }

    /// Number of bytes waiting for a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.codec.buffered_len()
    }

    /// Drop all buffered bytes.
    pub fn reset(&mut self) {
        self.codec.clear();
    }
}
