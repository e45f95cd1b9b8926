//! Dyscom power module: switch a module of the measurement device.

use sciencemode_bits::ByteBuilder;

use super::types::{DyscomPowerModulePowerType, DyscomPowerModuleType};
use crate::commands::Command;
use crate::error::ProtocolError;
use crate::packet::{read_result, AckPayload, Payload, Request};
use crate::result::ResultAndError;

/// Switch a power module on or off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DyscomPowerModule {
    /// Module to switch.
    pub module: DyscomPowerModuleType,
    /// Requested state.
    pub power: DyscomPowerModulePowerType,
}

impl Payload for DyscomPowerModule {
    const COMMAND: Command = Command::DlPowerModule;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        bb.append_byte(self.module.into());
        bb.append_byte(self.power.into());
        Ok(())
    }
}

impl Request for DyscomPowerModule {
    type Ack = DyscomPowerModuleAck;
}

/// Acknowledge for [`DyscomPowerModule`], echoing module and state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DyscomPowerModuleAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Echoed module.
    pub module: DyscomPowerModuleType,
    /// Echoed state.
    pub power: DyscomPowerModulePowerType,
}

impl AckPayload for DyscomPowerModuleAck {
    const COMMAND: Command = Command::DlPowerModuleAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(DyscomPowerModuleAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 3)?;
        Ok(DyscomPowerModuleAck {
            result_error,
            module: DyscomPowerModuleType::try_from(data[1])?,
            power: DyscomPowerModulePowerType::try_from(data[2])?,
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_echo() {
        let ack = DyscomPowerModuleAck::decode(&[0, 2, 1]).unwrap();
        assert_eq!(ack.module, DyscomPowerModuleType::MemoryCard);
        assert_eq!(ack.power, DyscomPowerModulePowerType::SwitchOn);
    }

    #[test]
    fn test_ack_invalid_module() {
        assert!(matches!(
            DyscomPowerModuleAck::decode(&[0, 9, 1]),
            Err(ProtocolError::InvalidValue { field: "DyscomPowerModuleType", value: 9 })
        ));
    }
}
