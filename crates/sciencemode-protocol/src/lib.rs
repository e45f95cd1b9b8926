//! ScienceMode Device Protocol
//!
//! This crate provides the packet model and framing for talking to a
//! ScienceMode stimulation and measurement device over a byte stream.
//!
//! # Protocol Overview
//!
//! Every exchange is a frame carrying a 10-bit command code, a 6-bit packet
//! number and a payload. The host sends requests; the device answers each
//! with the matching acknowledgement carrying the same packet number. The
//! only exception are file blocks of the dyscom family, which the device
//! pushes on its own.
//!
//! Commands are grouped into families:
//!
//! - **General**: device id, firmware version, reset
//! - **Low level**: single pulses timed by the host
//! - **Mid level**: periodic patterns repeated by the device
//! - **Dyscom**: measurement control, queries and file transfer
//!
//! # Example
//!
//! ```rust
//! use sciencemode_protocol::{Command, Frame, FrameCodec, GetDeviceId, Packet, PacketAck, Protocol};
//!
//! let mut protocol = Protocol::new();
//! let packet = Packet::new(&GetDeviceId).unwrap();
//! let wire = protocol.encode_packet(&packet, 0).unwrap();
//! assert_eq!(wire[0], 0xF0);
//!
//! // the device answers with result 0 and a 10 character id
//! let mut payload = vec![0];
//! payload.extend_from_slice(b"0123456789");
//! let reply = FrameCodec::encode(&Frame::new(Command::GetDeviceIdAck.code(), 0, payload)).unwrap();
//! protocol.feed(&reply);
//!
//! let frame = protocol.next_frame().unwrap().unwrap();
//! assert!(matches!(frame.ack, Ok(PacketAck::GetDeviceId(_))));
//! ```

mod commands;
mod constants;
mod dyscom;
mod error;
mod factory;
mod frame;
mod general;
mod low_level;
mod mid_level;
mod packet;
mod packet_number;
mod protocol;
mod result;
mod types;

pub use commands::*;
pub use constants::*;
pub use dyscom::*;
pub use error::*;
pub use factory::*;
pub use frame::*;
pub use general::*;
pub use low_level::*;
pub use mid_level::*;
pub use packet::*;
pub use packet_number::*;
pub use protocol::*;
pub use result::*;
pub use types::*;
