//! Dyscom get: one request selected by a sub-type byte.
//!
//! Every acknowledgement starts with the result byte and the echoed
//! sub-type; the remaining bytes depend on the sub-type and decode into one
//! [`DyscomGetValue`] variant. Multi-byte numbers are little-endian here,
//! unlike the rest of the protocol.

use bytes::Buf;
use sciencemode_bits::ByteBuilder;
use serde::{Deserialize, Serialize};

use super::types::{DyscomEnergyState, DyscomFileByNameMode, DyscomGetType, DyscomOperationMode};
use crate::commands::Command;
use crate::constants::{DYSCOM_DEVICE_ID_SIZE, FILE_NAME_SIZE, FIRMWARE_VERSION_SIZE};
use crate::error::ProtocolError;
use crate::packet::{read_result, AckPayload, Payload, Request};
use crate::result::ResultAndError;
use crate::types::fixed_bytes_to_str;

/// Query a value of the measurement subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DyscomGet {
    /// Which value to query.
    pub kind: DyscomGetType,
}

impl DyscomGet {
    /// Create a query for `kind`.
    pub fn new(kind: DyscomGetType) -> Self {
        DyscomGet { kind }
    }
}

impl Payload for DyscomGet {
    const COMMAND: Command = Command::DlGet;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.kind == DyscomGetType::Unused {
            return Err(ProtocolError::invalid_argument("dyscom get needs a sub-type"));
        }
        bb.append_byte(self.kind.into());
        Ok(())
    }
}

impl Request for DyscomGet {
    type Ack = DyscomGetAck;
}

/// Storage readiness and usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomFileSystemStatus {
    /// Storage can be used.
    pub ready: bool,
    /// Used bytes.
    pub used_size: u64,
    /// Free bytes.
    pub free_size: u64,
}

/// Metadata of the file selected for transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomFileByName {
    /// File name.
    pub file_name: String,
    /// First block to be sent.
    pub block_offset: u32,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of blocks the transfer will take.
    pub number_of_blocks: u32,
    /// Transfer mode.
    pub mode: DyscomFileByNameMode,
}

/// Name, size and checksum of a stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomFileInfo {
    /// File name.
    pub file_name: String,
    /// File size in bytes.
    pub file_size: u64,
    /// File checksum.
    pub checksum: u16,
}

/// Battery telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomBatteryStatus {
    /// Voltage in millivolt.
    pub voltage_mv: u16,
    /// Current in milliampere, negative while discharging.
    pub current_ma: i16,
    /// Charge in percent.
    pub percentage: u8,
    /// Temperature in degree Celsius.
    pub temperature_c: i8,
    /// Energy state.
    pub energy_state: DyscomEnergyState,
}

/// Sub-type specific part of a [`DyscomGetAck`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DyscomGetValue {
    /// No value (device reported an error).
    #[default]
    None,
    /// File system status.
    FileSystemStatus(DyscomFileSystemStatus),
    /// Number of stored measurements.
    ListOfMeasurementMetaInfo(u16),
    /// File selected for transfer.
    FileByName(DyscomFileByName),
    /// Operation mode.
    OperationMode(DyscomOperationMode),
    /// Device id.
    DeviceId(String),
    /// Firmware version.
    FirmwareVersion(String),
    /// Stored file info.
    FileInfo(DyscomFileInfo),
    /// Battery status.
    BatteryStatus(DyscomBatteryStatus),
}

/// Size of the sub-type specific part, after result and sub-type bytes.
fn value_size(kind: DyscomGetType) -> usize {
    match kind {
        DyscomGetType::Unused => 0,
        DyscomGetType::FileSystemStatus => 1 + 8 + 8,
        DyscomGetType::ListOfMeasurementMetaInfo => 2,
        DyscomGetType::FileByName => FILE_NAME_SIZE + 4 + 8 + 4 + 1,
        DyscomGetType::OperationMode => 1,
        DyscomGetType::DeviceId => DYSCOM_DEVICE_ID_SIZE,
        DyscomGetType::FirmwareVersion => FIRMWARE_VERSION_SIZE,
        DyscomGetType::FileInfo => FILE_NAME_SIZE + 8 + 2,
        DyscomGetType::BatteryStatus => 2 + 2 + 1 + 1 + 1,
    }
}

fn read_name(buf: &mut &[u8], size: usize) -> String {
    let name = fixed_bytes_to_str(*buf, size);
    buf.advance(size);
    name
}

fn decode_value(kind: DyscomGetType, mut buf: &[u8]) -> Result<DyscomGetValue, ProtocolError> {
    let value = match kind {
        DyscomGetType::Unused => DyscomGetValue::None,
        DyscomGetType::FileSystemStatus => DyscomGetValue::FileSystemStatus(DyscomFileSystemStatus {
            ready: buf.get_u8() != 0,
            used_size: buf.get_u64_le(),
            free_size: buf.get_u64_le(),
        }),
        DyscomGetType::ListOfMeasurementMetaInfo => {
            DyscomGetValue::ListOfMeasurementMetaInfo(buf.get_u16_le())
        }
        DyscomGetType::FileByName => DyscomGetValue::FileByName(DyscomFileByName {
            file_name: read_name(&mut buf, FILE_NAME_SIZE),
            block_offset: buf.get_u32_le(),
            file_size: buf.get_u64_le(),
            number_of_blocks: buf.get_u32_le(),
            mode: DyscomFileByNameMode::try_from(buf.get_u8())?,
        }),
        DyscomGetType::OperationMode => {
            DyscomGetValue::OperationMode(DyscomOperationMode::try_from(buf.get_u8())?)
        }
        DyscomGetType::DeviceId => {
            DyscomGetValue::DeviceId(fixed_bytes_to_str(buf, DYSCOM_DEVICE_ID_SIZE))
        }
        DyscomGetType::FirmwareVersion => {
            DyscomGetValue::FirmwareVersion(fixed_bytes_to_str(buf, FIRMWARE_VERSION_SIZE))
        }
        DyscomGetType::FileInfo => DyscomGetValue::FileInfo(DyscomFileInfo {
            file_name: read_name(&mut buf, FILE_NAME_SIZE),
            file_size: buf.get_u64_le(),
            checksum: buf.get_u16_le(),
        }),
        DyscomGetType::BatteryStatus => DyscomGetValue::BatteryStatus(DyscomBatteryStatus {
            voltage_mv: buf.get_u16_le(),
            current_ma: buf.get_i16_le(),
            percentage: buf.get_u8(),
            temperature_c: buf.get_i8(),
            energy_state: DyscomEnergyState::try_from(buf.get_u8())?,
        }),
    };
    Ok(value)
}

/// Acknowledge for [`DyscomGet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DyscomGetAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Echoed sub-type.
    pub kind: DyscomGetType,
    /// Decoded value, [`DyscomGetValue::None`] on error.
    pub value: DyscomGetValue,
}

impl Default for DyscomGetAck {
    fn default() -> Self {
        DyscomGetAck {
            result_error: ResultAndError::NoError,
            kind: DyscomGetType::Unused,
            value: DyscomGetValue::None,
        }
    }
}

impl AckPayload for DyscomGetAck {
    const COMMAND: Command = Command::DlGetAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        let kind = match data.get(1) {
            Some(&kind) => DyscomGetType::try_from(kind)?,
            None if !result_error.is_ok() => DyscomGetType::Unused,
            None => return Err(ProtocolError::PayloadTooShort {
                command: Self::COMMAND,
                expected: 2,
                actual: data.len(),
            }),
        };
        if !result_error.is_ok() {
            return Ok(DyscomGetAck {
                result_error,
                kind,
                value: DyscomGetValue::None,
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 2 + value_size(kind))?;
        Ok(DyscomGetAck {
            result_error,
            kind,
            value: decode_value(kind, &data[2..])?,
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}
