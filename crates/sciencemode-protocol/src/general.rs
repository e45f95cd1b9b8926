//! General device commands: identity, version and reset.

use crate::commands::Command;
use crate::constants::DEVICE_ID_SIZE;
use crate::error::ProtocolError;
use crate::packet::{empty_request, read_result, result_only_ack, AckPayload};
use crate::result::ResultAndError;
use crate::types::fixed_bytes_to_str;

empty_request!(
    /// Request the device id.
    GetDeviceId,
    Command::GetDeviceId,
    GetDeviceIdAck
);

/// Acknowledge for [`GetDeviceId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDeviceIdAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Device id (10 ASCII characters).
    pub device_id: String,
}

impl AckPayload for GetDeviceIdAck {
    const COMMAND: Command = Command::GetDeviceIdAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(GetDeviceIdAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 1 + DEVICE_ID_SIZE)?;
        Ok(GetDeviceIdAck {
            result_error,
            device_id: fixed_bytes_to_str(&data[1..], DEVICE_ID_SIZE),
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

empty_request!(
    /// Reset the device.
    Reset,
    Command::Reset,
    ResetAck
);

result_only_ack!(
    /// Acknowledge for [`Reset`].
    ResetAck,
    Command::ResetAck
);

empty_request!(
    /// Request firmware versions.
    GetVersion,
    Command::GetVersion,
    GetVersionAck
);

/// A firmware version triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Revision.
    pub revision: u8,
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Acknowledge for [`GetVersion`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetVersionAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Main controller firmware.
    pub main: FirmwareVersion,
    /// Stimulation controller firmware.
    pub stimulation: FirmwareVersion,
}

impl AckPayload for GetVersionAck {
    const COMMAND: Command = Command::GetVersionAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(GetVersionAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 7)?;
        Ok(GetVersionAck {
            result_error,
            main: FirmwareVersion {
                major: data[1],
                minor: data[2],
                revision: data[3],
            },
            stimulation: FirmwareVersion {
                major: data[4],
                minor: data[5],
                revision: data[6],
            },
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

/// Sent by the device in place of an acknowledgement when it does not
/// recognise a request.
///
/// This frame has no result byte; [`AckPayload::result_error`] reports
/// `InvalidCmdError` so that callers see the rejection as a device error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownCommandAck {
    /// Command code the device rejected (0 if not reported).
    pub command_code: u16,
}

impl AckPayload for UnknownCommandAck {
    const COMMAND: Command = Command::UnknownCommand;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let command_code = if data.len() >= 2 {
            u16::from_be_bytes([data[0], data[1]])
        } else {
            0
        };
        Ok(UnknownCommandAck { command_code })
    }

    fn result_error(&self) -> ResultAndError {
        ResultAndError::InvalidCmdError
    }
}
