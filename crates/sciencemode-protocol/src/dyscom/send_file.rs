//! File transfer frames.
//!
//! The device pushes a measurement file as a sequence of `SendFile` blocks
//! without being asked; the host confirms each block by number with
//! [`DyscomSendFileAck`]. Block numbers count blocks of one transfer and are
//! unrelated to packet numbers.

use bytes::{Buf, Bytes};
use sciencemode_bits::ByteBuilder;

use crate::commands::Command;
use crate::error::ProtocolError;
use crate::packet::{AckPayload, Payload};
use crate::result::ResultAndError;

/// Size of the block header: number (u32) and size (u16), big-endian.
pub const SEND_FILE_HEADER_SIZE: usize = 6;

/// One block of file data sent by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DyscomSendFile {
    /// Position of the block in the transfer.
    pub block_number: u32,
    /// Declared number of data bytes.
    pub block_size: u16,
    /// Block data.
    pub data: Bytes,
}

impl AckPayload for DyscomSendFile {
    const COMMAND: Command = Command::DlSendFile;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        ProtocolError::ensure_len(Self::COMMAND, data, SEND_FILE_HEADER_SIZE)?;
        let mut buf = data;
        let block_number = buf.get_u32();
        let block_size = buf.get_u16();
        ProtocolError::ensure_len(
            Self::COMMAND,
            data,
            SEND_FILE_HEADER_SIZE + usize::from(block_size),
        )?;
        Ok(DyscomSendFile {
            block_number,
            block_size,
            data: Bytes::copy_from_slice(&buf[..usize::from(block_size)]),
        })
    }

    /// File blocks carry no result byte; always `NoError`.
    fn result_error(&self) -> ResultAndError {
        ResultAndError::NoError
    }
}

/// Host confirmation of one received file block.
///
/// Sent without waiting for any answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DyscomSendFileAck {
    /// Number of the confirmed block.
    pub block_number: u32,
}

impl Payload for DyscomSendFileAck {
    const COMMAND: Command = Command::DlSendFileAck;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        bb.append_value(u64::from(self.block_number), 4, true)?;
        Ok(())
    }
}
