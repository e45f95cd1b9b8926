//! Frame encoding/decoding utilities.
//!
//! Every frame is delimited by a start and a stop byte. The header carries a
//! CRC-16 of the body and the total frame length; its bytes are always
//! stuffed. Body bytes that collide with a control byte are stuffed as well.
//!
//! ```text
//! +------+-----------+-----------+-----------+-----------+---------------+------+
//! | 0xF0 | 81 crcH^55| 81 crcL^55| 81 lenH^55| 81 lenL^55| stuffed body  | 0x0F |
//! +------+-----------+-----------+-----------+-----------+---------------+------+
//! ```
//!
//! The body is a 2-byte command word (command code and packet number)
//! followed by the payload.

use bytes::{Buf, Bytes, BytesMut};
use crc::{Crc, CRC_16_XMODEM};
use sciencemode_bits::{BitField, BitLayout};

use crate::constants::{
    COMMAND_CODE_BITS, COMMAND_WORD_SIZE, HEADER_STUFFED_SIZE, MAX_FRAME_SIZE, MIN_FRAME_SIZE,
    PACKET_NUMBER_BITS, RESYNC_LIMIT, START_BYTE, STOP_BYTE, STUFFING_BYTE, STUFFING_KEY,
};
use crate::error::{FramingError, ProtocolError};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Offset of the first body byte in a frame.
const BODY_OFFSET: usize = 1 + HEADER_STUFFED_SIZE;

const COMMAND_WORD: BitLayout = BitLayout::new(
    &[
        BitField::new("command", 0, COMMAND_CODE_BITS),
        BitField::new("packet_number", COMMAND_CODE_BITS, PACKET_NUMBER_BITS),
    ],
    COMMAND_WORD_SIZE,
    true,
);

/// One decoded frame: raw command code, packet number and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw command code.
    pub code: u16,
    /// Packet number used for correlation.
    pub packet_number: u8,
    /// Payload bytes after the command word.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(code: u16, packet_number: u8, payload: impl Into<Bytes>) -> Self {
        Frame {
            code,
            packet_number,
            payload: payload.into(),
        }
    }
}

fn is_control(byte: u8) -> bool {
    matches!(byte, START_BYTE | STOP_BYTE | STUFFING_BYTE)
}

fn push_stuffed(buf: &mut Vec<u8>, byte: u8) {
    buf.push(STUFFING_BYTE);
    buf.push(byte ^ STUFFING_KEY);
}

/// Checksum of an unstuffed frame body.
pub fn checksum(body: &[u8]) -> u16 {
    CRC16.checksum(body)
}

/// A codec for reading and writing frames.
///
/// Incoming bytes are accumulated with [`FrameCodec::push`] in chunks of
/// any size; [`FrameCodec::decode`] extracts one frame at a time and keeps
/// partial frames buffered.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Consecutive bytes discarded while looking for a start byte.
    discarded: usize,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(MAX_FRAME_SIZE),
            discarded: 0,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Encode a frame for transmission.
    pub fn encode(frame: &Frame) -> Result<Vec<u8>, ProtocolError> {
        let word = COMMAND_WORD.encode(&[
            u64::from(frame.code),
            u64::from(frame.packet_number),
        ])?;
        let mut body = Vec::with_capacity(COMMAND_WORD_SIZE + frame.payload.len());
        body.extend_from_slice(&word);
        body.extend_from_slice(&frame.payload);

        let mut stuffed = Vec::with_capacity(body.len() + 8);
        for &byte in &body {
            if is_control(byte) {
                push_stuffed(&mut stuffed, byte);
            } else {
                stuffed.push(byte);
            }
        }

        let length = BODY_OFFSET + stuffed.len() + 1;
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                max: MAX_FRAME_SIZE,
                actual: length,
            });
        }

        let crc = checksum(&body);
        let mut buf = Vec::with_capacity(length);
        buf.push(START_BYTE);
        for byte in crc.to_be_bytes().into_iter().chain((length as u16).to_be_bytes()) {
            push_stuffed(&mut buf, byte);
        }
        buf.extend_from_slice(&stuffed);
        buf.push(STOP_BYTE);
        Ok(buf)
    }

    /// Try to decode a complete frame from the buffer.
    ///
    /// Returns `None` if more data is needed. A framing error discards the
    /// offending bytes; the next call continues at the following start byte.
    pub fn decode(&mut self) -> Option<Result<Frame, FramingError>> {
        if let Some(err) = self.skip_to_start() {
            return Some(Err(err));
        }
        if self.buffer.is_empty() {
            return None;
        }
        match self.try_frame() {
            Ok(Some(frame)) => {
                self.discarded = 0;
                Some(Ok(frame))
            }
            Ok(None) => None,
            Err(err) => {
                log::debug!("framing error: {}", err);
                Some(Err(err))
            }
        }
    }

    /// Discard bytes before the next start byte.
    ///
    /// The discard count only resets once a frame decodes, so noise that
    /// happens to contain start bytes still escalates.
    fn skip_to_start(&mut self) -> Option<FramingError> {
        let position = self.buffer.iter().position(|&b| b == START_BYTE);
        let skip = position.unwrap_or(self.buffer.len());
        if skip > 0 {
            log::trace!("discarding {} bytes before start byte", skip);
            self.buffer.advance(skip);
            self.discarded += skip;
        }
        if self.discarded > RESYNC_LIMIT {
            let discarded = self.discarded;
            self.discarded = 0;
            return Some(FramingError::Unsynchronizable { discarded });
        }
        None
    }

    /// Drop the start byte of a broken frame and report `err`.
    fn reject(&mut self, drop: usize, err: FramingError) -> Result<Option<Frame>, FramingError> {
        self.buffer.advance(drop);
        self.discarded += drop;
        Err(err)
    }

    /// Parse the frame at the front of the buffer, which starts with a start byte.
    fn try_frame(&mut self) -> Result<Option<Frame>, FramingError> {
        let available = self.buffer.len().min(BODY_OFFSET);
        for position in (1..available).step_by(2) {
            let byte = self.buffer[position];
            if byte == START_BYTE {
                return self.reject(position, FramingError::Truncated { len: position });
            }
            if byte != STUFFING_BYTE {
                return self.reject(1, FramingError::InvalidHeader);
            }
        }
        if self.buffer.len() < BODY_OFFSET {
            return Ok(None);
        }

        let header: Vec<u8> = (0..4)
            .map(|i| self.buffer[2 + 2 * i] ^ STUFFING_KEY)
            .collect();
        let expected_crc = u16::from_be_bytes([header[0], header[1]]);
        let length = usize::from(u16::from_be_bytes([header[2], header[3]]));
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&length) {
            return self.reject(1, FramingError::InvalidLength { length });
        }

        // body bytes never hold a raw control byte
        let scan_end = self.buffer.len().min(length - 1);
        for position in BODY_OFFSET..scan_end {
            match self.buffer[position] {
                START_BYTE => {
                    return self.reject(position, FramingError::Truncated { len: position });
                }
                STOP_BYTE => return self.reject(1, FramingError::InvalidLength { length }),
                _ => {}
            }
        }
        if self.buffer.len() < length {
            return Ok(None);
        }
        let terminator = self.buffer[length - 1];
        if terminator != STOP_BYTE {
            return self.reject(1, FramingError::BadTerminator(terminator));
        }

        let raw = self.buffer.split_to(length);
        log::trace!("rx frame {}", hex::encode(&raw));
        match parse_body(&raw[BODY_OFFSET..length - 1], expected_crc, length) {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => {
                self.discarded += length;
                Err(err)
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarded = 0;
    }
}

/// Unstuff and verify the body of a complete frame.
fn parse_body(stuffed: &[u8], expected_crc: u16, length: usize) -> Result<Frame, FramingError> {
    let mut body = Vec::with_capacity(stuffed.len());
    let mut bytes = stuffed.iter();
    while let Some(&byte) = bytes.next() {
        if byte == STUFFING_BYTE {
            match bytes.next() {
                Some(&stuffed) => body.push(stuffed ^ STUFFING_KEY),
                None => return Err(FramingError::InvalidStuffing),
            }
        } else {
            body.push(byte);
        }
    }
    if body.len() < COMMAND_WORD_SIZE {
        return Err(FramingError::InvalidLength { length });
    }

    let actual_crc = checksum(&body);
    if actual_crc != expected_crc {
        return Err(FramingError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    let word = COMMAND_WORD
        .decode(&body[..COMMAND_WORD_SIZE])
        .map_err(|_| FramingError::InvalidHeader)?;
    Ok(Frame {
        code: word[0] as u16,
        packet_number: word[1] as u8,
        payload: Bytes::copy_from_slice(&body[COMMAND_WORD_SIZE..]),
    })
}
