//! Device-reported outcome codes.

use std::fmt;

/// Outcome code carried in the first payload byte of almost every
/// acknowledgement. `NoError` (0) means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultAndError {
    /// Command executed successfully.
    #[default]
    NoError,
    /// Transfer error.
    TransferError,
    /// Invalid parameter.
    ParameterError,
    /// Protocol error.
    ProtocolError,
    /// Stimulation processor timeout.
    UcStimTimeoutError,
    /// EMG timeout.
    EmgTimeoutError,
    /// EMG register error.
    EmgRegisterError,
    /// Subsystem not initialised.
    NotInitializedError,
    /// High voltage error.
    HvError,
    /// Demultiplexer timeout.
    DemuxTimeoutError,
    /// Electrode error.
    ElectrodeError,
    /// Invalid command.
    InvalidCmdError,
    /// Demultiplexer parameter error.
    DemuxParameterError,
    /// Demultiplexer not initialised.
    DemuxNotInitializedError,
    /// Demultiplexer transfer error.
    DemuxTransferError,
    /// Demultiplexer unknown acknowledge.
    DemuxUnknownAckError,
    /// Pulse timeout.
    PulseTimeoutError,
    /// Fuel gauge error.
    FuelGaugeError,
    /// Live signal error.
    LiveSignalError,
    /// File transmission timeout.
    FileTransmissionTimeout,
    /// File not found.
    FileNotFound,
    /// Device busy.
    Busy,
    /// File error.
    FileError,
    /// Command not supported.
    CommandNotSupported,
    /// Code not in the documented table.
    Unknown(u8),
}

impl ResultAndError {
    /// Returns true for `NoError`.
    pub fn is_ok(&self) -> bool {
        *self == ResultAndError::NoError
    }
}

impl From<u8> for ResultAndError {
    fn from(code: u8) -> Self {
        match code {
            0 => ResultAndError::NoError,
            1 => ResultAndError::TransferError,
            2 => ResultAndError::ParameterError,
            3 => ResultAndError::ProtocolError,
            4 => ResultAndError::UcStimTimeoutError,
            5 => ResultAndError::EmgTimeoutError,
            6 => ResultAndError::EmgRegisterError,
            7 => ResultAndError::NotInitializedError,
            8 => ResultAndError::HvError,
            9 => ResultAndError::DemuxTimeoutError,
            10 => ResultAndError::ElectrodeError,
            11 => ResultAndError::InvalidCmdError,
            12 => ResultAndError::DemuxParameterError,
            13 => ResultAndError::DemuxNotInitializedError,
            14 => ResultAndError::DemuxTransferError,
            15 => ResultAndError::DemuxUnknownAckError,
            16 => ResultAndError::PulseTimeoutError,
            17 => ResultAndError::FuelGaugeError,
            18 => ResultAndError::LiveSignalError,
            19 => ResultAndError::FileTransmissionTimeout,
            20 => ResultAndError::FileNotFound,
            21 => ResultAndError::Busy,
            22 => ResultAndError::FileError,
            23 => ResultAndError::CommandNotSupported,
            _ => ResultAndError::Unknown(code),
        }
    }
}

impl From<ResultAndError> for u8 {
    fn from(result: ResultAndError) -> Self {
        match result {
            ResultAndError::NoError => 0,
            ResultAndError::TransferError => 1,
            ResultAndError::ParameterError => 2,
            ResultAndError::ProtocolError => 3,
            ResultAndError::UcStimTimeoutError => 4,
            ResultAndError::EmgTimeoutError => 5,
            ResultAndError::EmgRegisterError => 6,
            ResultAndError::NotInitializedError => 7,
            ResultAndError::HvError => 8,
            ResultAndError::DemuxTimeoutError => 9,
            ResultAndError::ElectrodeError => 10,
            ResultAndError::InvalidCmdError => 11,
            ResultAndError::DemuxParameterError => 12,
            ResultAndError::DemuxNotInitializedError => 13,
            ResultAndError::DemuxTransferError => 14,
            ResultAndError::DemuxUnknownAckError => 15,
            ResultAndError::PulseTimeoutError => 16,
            ResultAndError::FuelGaugeError => 17,
            ResultAndError::LiveSignalError => 18,
            ResultAndError::FileTransmissionTimeout => 19,
            ResultAndError::FileNotFound => 20,
            ResultAndError::Busy => 21,
            ResultAndError::FileError => 22,
            ResultAndError::CommandNotSupported => 23,
            ResultAndError::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ResultAndError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultAndError::Unknown(code) => write!(f, "unknown result (0x{:02X})", code),
            other => write!(f, "{:?} ({})", other, u8::from(*other)),
        }
    }
}
