//! Lookup from acknowledgement command code to its decoder.

use std::collections::HashMap;

use crate::commands::Command;
use crate::error::ProtocolError;
use crate::packet::{DecodeFn, PacketAck, DECODERS};

/// Registry of acknowledgement decoders, keyed by command.
#[derive(Debug, Clone)]
pub struct PacketFactory {
    decoders: HashMap<Command, DecodeFn>,
}

impl Default for PacketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketFactory {
    /// Create a factory that knows every acknowledgement of the protocol.
    pub fn new() -> Self {
        PacketFactory {
            decoders: DECODERS.iter().copied().collect(),
        }
    }

    /// Whether a decoder exists for `command`.
    pub fn is_registered(&self, command: Command) -> bool {
        self.decoders.contains_key(&command)
    }

    /// Decode `payload` as the acknowledgement registered for `command`.
    pub fn decode(&self, command: Command, payload: &[u8]) -> Result<PacketAck, ProtocolError> {
        let decode = self
            .decoders
            .get(&command)
            .ok_or(ProtocolError::UnknownCommand(command.code()))?;
        decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general::ResetAck;
    use crate::result::ResultAndError;

    #[test]
    fn test_decode_registered() {
        let factory = PacketFactory::new();
        let ack = factory.decode(Command::ResetAck, &[21]).unwrap();
        assert_eq!(ack, PacketAck::Reset(ResetAck { result_error: ResultAndError::Busy }));
    }

    #[test]
    fn test_requests_have_no_decoder() {
        let factory = PacketFactory::new();
        assert!(!factory.is_registered(Command::Reset));
        assert_eq!(
            factory.decode(Command::Reset, &[]),
            Err(ProtocolError::UnknownCommand(52))
        );
    }

    #[test]
    fn test_every_ack_is_registered() {
        let factory = PacketFactory::new();
        for code in 0..1024u16 {
            let Some(command) = Command::from_code(code) else { continue };
            if let Some(ack) = command.ack() {
                assert!(factory.is_registered(ack), "{:?} has no decoder", ack);
            }
        }
        assert!(factory.is_registered(Command::DlSendFile));
        assert!(factory.is_registered(Command::UnknownCommand));
    }
}
