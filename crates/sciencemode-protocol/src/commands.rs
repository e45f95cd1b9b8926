//! Command codes.

use crate::constants::*;

/// Every command code of the protocol, requests and acknowledgements alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// Low-level init.
    LlInit,
    /// Low-level init acknowledge.
    LlInitAck,
    /// Low-level channel config.
    LlChannelConfig,
    /// Low-level channel config acknowledge.
    LlChannelConfigAck,
    /// Low-level stop.
    LlStop,
    /// Low-level stop acknowledge.
    LlStopAck,
    /// Get version.
    GetVersion,
    /// Get version acknowledge.
    GetVersionAck,
    /// Device-side rejection of an unrecognised request.
    UnknownCommand,
    /// Get device id.
    GetDeviceId,
    /// Get device id acknowledge.
    GetDeviceIdAck,
    /// Reset.
    Reset,
    /// Reset acknowledge.
    ResetAck,
    /// Mid-level init.
    MlInit,
    /// Mid-level init acknowledge.
    MlInitAck,
    /// Mid-level update.
    MlUpdate,
    /// Mid-level update acknowledge.
    MlUpdateAck,
    /// Mid-level stop.
    MlStop,
    /// Mid-level stop acknowledge.
    MlStopAck,
    /// Mid-level get current data.
    MlGetCurrentData,
    /// Mid-level get current data acknowledge.
    MlGetCurrentDataAck,
    /// Dyscom init.
    DlInit,
    /// Dyscom init acknowledge.
    DlInitAck,
    /// Dyscom start.
    DlStart,
    /// Dyscom start acknowledge.
    DlStartAck,
    /// Dyscom stop.
    DlStop,
    /// Dyscom stop acknowledge.
    DlStopAck,
    /// Dyscom file block (device → host).
    DlSendFile,
    /// Dyscom file block acknowledge (host → device).
    DlSendFileAck,
    /// Dyscom get.
    DlGet,
    /// Dyscom get acknowledge.
    DlGetAck,
    /// Dyscom power module.
    DlPowerModule,
    /// Dyscom power module acknowledge.
    DlPowerModuleAck,
}

impl Command {
    /// Get the wire code for this command.
    pub fn code(&self) -> u16 {
        match self {
            Command::LlInit => CMD_LL_INIT,
            Command::LlInitAck => CMD_LL_INIT_ACK,
            Command::LlChannelConfig => CMD_LL_CHANNEL_CONFIG,
            Command::LlChannelConfigAck => CMD_LL_CHANNEL_CONFIG_ACK,
            Command::LlStop => CMD_LL_STOP,
            Command::LlStopAck => CMD_LL_STOP_ACK,
            Command::GetVersion => CMD_GET_VERSION,
            Command::GetVersionAck => CMD_GET_VERSION_ACK,
            Command::UnknownCommand => CMD_UNKNOWN_COMMAND,
            Command::GetDeviceId => CMD_GET_DEVICE_ID,
            Command::GetDeviceIdAck => CMD_GET_DEVICE_ID_ACK,
            Command::Reset => CMD_RESET,
            Command::ResetAck => CMD_RESET_ACK,
            Command::MlInit => CMD_ML_INIT,
            Command::MlInitAck => CMD_ML_INIT_ACK,
            Command::MlUpdate => CMD_ML_UPDATE,
            Command::MlUpdateAck => CMD_ML_UPDATE_ACK,
            Command::MlStop => CMD_ML_STOP,
            Command::MlStopAck => CMD_ML_STOP_ACK,
            Command::MlGetCurrentData => CMD_ML_GET_CURRENT_DATA,
            Command::MlGetCurrentDataAck => CMD_ML_GET_CURRENT_DATA_ACK,
            Command::DlInit => CMD_DL_INIT,
            Command::DlInitAck => CMD_DL_INIT_ACK,
            Command::DlStart => CMD_DL_START,
            Command::DlStartAck => CMD_DL_START_ACK,
            Command::DlStop => CMD_DL_STOP,
            Command::DlStopAck => CMD_DL_STOP_ACK,
            Command::DlSendFile => CMD_DL_SEND_FILE,
            Command::DlSendFileAck => CMD_DL_SEND_FILE_ACK,
            Command::DlGet => CMD_DL_GET,
            Command::DlGetAck => CMD_DL_GET_ACK,
            Command::DlPowerModule => CMD_DL_POWER_MODULE,
            Command::DlPowerModuleAck => CMD_DL_POWER_MODULE_ACK,
        }
    }

    /// Look up a command by its wire code.
    pub fn from_code(code: u16) -> Option<Self> {
        let command = match code {
            CMD_LL_INIT => Command::LlInit,
            CMD_LL_INIT_ACK => Command::LlInitAck,
            CMD_LL_CHANNEL_CONFIG => Command::LlChannelConfig,
            CMD_LL_CHANNEL_CONFIG_ACK => Command::LlChannelConfigAck,
            CMD_LL_STOP => Command::LlStop,
            CMD_LL_STOP_ACK => Command::LlStopAck,
            CMD_GET_VERSION => Command::GetVersion,
            CMD_GET_VERSION_ACK => Command::GetVersionAck,
            CMD_UNKNOWN_COMMAND => Command::UnknownCommand,
            CMD_GET_DEVICE_ID => Command::GetDeviceId,
            CMD_GET_DEVICE_ID_ACK => Command::GetDeviceIdAck,
            CMD_RESET => Command::Reset,
            CMD_RESET_ACK => Command::ResetAck,
            CMD_ML_INIT => Command::MlInit,
            CMD_ML_INIT_ACK => Command::MlInitAck,
            CMD_ML_UPDATE => Command::MlUpdate,
            CMD_ML_UPDATE_ACK => Command::MlUpdateAck,
            CMD_ML_STOP => Command::MlStop,
            CMD_ML_STOP_ACK => Command::MlStopAck,
            CMD_ML_GET_CURRENT_DATA => Command::MlGetCurrentData,
            CMD_ML_GET_CURRENT_DATA_ACK => Command::MlGetCurrentDataAck,
            CMD_DL_INIT => Command::DlInit,
            CMD_DL_INIT_ACK => Command::DlInitAck,
            CMD_DL_START => Command::DlStart,
            CMD_DL_START_ACK => Command::DlStartAck,
            CMD_DL_STOP => Command::DlStop,
            CMD_DL_STOP_ACK => Command::DlStopAck,
            CMD_DL_SEND_FILE => Command::DlSendFile,
            CMD_DL_SEND_FILE_ACK => Command::DlSendFileAck,
            CMD_DL_GET => Command::DlGet,
            CMD_DL_GET_ACK => Command::DlGetAck,
            CMD_DL_POWER_MODULE => Command::DlPowerModule,
            CMD_DL_POWER_MODULE_ACK => Command::DlPowerModuleAck,
            _ => return None,
        };
        Some(command)
    }

    /// The acknowledgement the device answers this request with, if any.
    pub fn ack(&self) -> Option<Command> {
        match self {
            Command::LlInit => Some(Command::LlInitAck),
            Command::LlChannelConfig => Some(Command::LlChannelConfigAck),
            Command::LlStop => Some(Command::LlStopAck),
            Command::GetVersion => Some(Command::GetVersionAck),
            Command::GetDeviceId => Some(Command::GetDeviceIdAck),
            Command::Reset => Some(Command::ResetAck),
            Command::MlInit => Some(Command::MlInitAck),
            Command::MlUpdate => Some(Command::MlUpdateAck),
            Command::MlStop => Some(Command::MlStopAck),
            Command::MlGetCurrentData => Some(Command::MlGetCurrentDataAck),
            Command::DlInit => Some(Command::DlInitAck),
            Command::DlStart => Some(Command::DlStartAck),
            Command::DlStop => Some(Command::DlStopAck),
            Command::DlGet => Some(Command::DlGetAck),
            Command::DlPowerModule => Some(Command::DlPowerModuleAck),
            _ => None,
        }
    }

    /// Returns true for frames the device sends without being asked.
    pub fn is_unsolicited(&self) -> bool {
        matches!(self, Command::DlSendFile)
    }
}
