//! Dyscom init: configure and arm the measurement subsystem.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use sciencemode_bits::ByteBuilder;
use serde::{Deserialize, Serialize};

use super::types::{DyscomFilterType, DyscomInitState, DyscomSamplingRate};
use crate::commands::Command;
use crate::constants::MEASUREMENT_FILE_ID_SIZE;
use crate::error::ProtocolError;
use crate::packet::{read_result, AckPayload, Payload, Request};
use crate::result::ResultAndError;
use crate::types::{fixed_bytes_to_str, str_to_fixed_bytes};

/// Size of the encoded date-time block.
pub const DATETIME_SIZE: usize = 11;

/// Feature switches of dyscom init, one bit each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomInitFlags {
    /// Stream samples to the host while measuring.
    pub live_data: bool,
    /// Record samples to the memory card.
    pub sd_storage: bool,
    /// Emit timing test signals.
    pub timing_test: bool,
}

impl DyscomInitFlags {
    fn bits(&self) -> u8 {
        u8::from(self.live_data) | (u8::from(self.sd_storage) << 1) | (u8::from(self.timing_test) << 2)
    }
}

/// Parameters of dyscom init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyscomInitParams {
    /// Feature switches.
    pub flags: DyscomInitFlags,
    /// Front-end filter.
    pub filter: DyscomFilterType,
    /// Id of the measurement file to create, at most 59 characters.
    pub measurement_file_id: String,
    /// Local time stamped on the measurement.
    pub datetime: NaiveDateTime,
    /// Whether daylight saving time is in effect at `datetime`.
    pub dst: bool,
}

impl Default for DyscomInitParams {
    fn default() -> Self {
        DyscomInitParams {
            flags: DyscomInitFlags::default(),
            filter: DyscomFilterType::default(),
            measurement_file_id: String::new(),
            datetime: Local::now().naive_local(),
            dst: false,
        }
    }
}

/// Encode a date-time the way the measurement subsystem expects it.
pub fn datetime_to_bytes(datetime: &NaiveDateTime, dst: bool) -> Result<Vec<u8>, ProtocolError> {
    if datetime.year() < 1900 {
        return Err(ProtocolError::invalid_argument(format!(
            "year {} before 1900",
            datetime.year()
        )));
    }
    let mut bb = ByteBuilder::new();
    bb.append_byte(datetime.hour() as u8);
    bb.append_byte(u8::from(dst));
    bb.append_byte(datetime.day() as u8);
    bb.append_byte(datetime.minute() as u8);
    bb.append_byte(datetime.month() as u8);
    bb.append_byte(datetime.second() as u8);
    bb.append_byte(datetime.weekday().num_days_from_sunday() as u8);
    bb.append_value(u64::from(datetime.ordinal0()), 2, true)?;
    bb.append_value((datetime.year() - 1900) as u64, 2, true)?;
    Ok(bb.to_bytes()?)
}

/// Initialise the measurement subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DyscomInit {
    /// Init parameters.
    pub params: DyscomInitParams,
}

impl Payload for DyscomInit {
    const COMMAND: Command = Command::DlInit;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.params.measurement_file_id.len() >= MEASUREMENT_FILE_ID_SIZE {
            return Err(ProtocolError::invalid_argument(format!(
                "measurement file id longer than {} bytes",
                MEASUREMENT_FILE_ID_SIZE - 1
            )));
        }
        bb.append_byte(self.params.flags.bits());
        bb.append_byte(self.params.filter.into());
        bb.append_bytes(&str_to_fixed_bytes(
            &self.params.measurement_file_id,
            MEASUREMENT_FILE_ID_SIZE,
        ));
        bb.append_bytes(&datetime_to_bytes(&self.params.datetime, self.params.dst)?);
        Ok(())
    }
}

impl Request for DyscomInit {
    type Ack = DyscomInitAck;
}

/// Decoded outcome of dyscom init.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DyscomInitResult {
    /// Reported init state.
    pub init_state: DyscomInitState,
    /// Output frequency the front end runs at.
    pub output_frequency: DyscomSamplingRate,
    /// Echoed measurement file id.
    pub measurement_file_id: String,
}

/// Acknowledge for [`DyscomInit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DyscomInitAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Decoded fields.
    pub result: DyscomInitResult,
}

impl AckPayload for DyscomInitAck {
    const COMMAND: Command = Command::DlInitAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(DyscomInitAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 3 + MEASUREMENT_FILE_ID_SIZE)?;
        Ok(DyscomInitAck {
            result_error,
            result: DyscomInitResult {
                init_state: DyscomInitState::try_from(data[1])?,
                output_frequency: DyscomSamplingRate::try_from(data[2])?,
                measurement_file_id: fixed_bytes_to_str(&data[3..], MEASUREMENT_FILE_ID_SIZE),
            },
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use chrono::NaiveDate;

    fn sample_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    #[test]
    fn test_datetime_bytes() {
        let bytes = datetime_to_bytes(&sample_datetime(), true).unwrap();
        // 2024-03-05 is a Tuesday and day 65 of a leap year
        assert_eq!(bytes, vec![14, 1, 5, 7, 3, 9, 2, 0, 64, 0, 124]);
        assert_eq!(bytes.len(), DATETIME_SIZE);
    }

    #[test]
    fn test_init_payload_layout() {
        let init = DyscomInit {
            params: DyscomInitParams {
                flags: DyscomInitFlags {
                    live_data: true,
                    sd_storage: true,
                    timing_test: false,
                },
                filter: DyscomFilterType::Predefined2,
                measurement_file_id: "run-1".to_string(),
                datetime: sample_datetime(),
                dst: false,
            },
        };
        let packet = Packet::new(&init).unwrap();
        let data = packet.data();
        assert_eq!(data.len(), 2 + MEASUREMENT_FILE_ID_SIZE + DATETIME_SIZE);
        assert_eq!(data[0], 0b011);
        assert_eq!(data[1], 2);
        assert_eq!(&data[2..8], b"run-1\0");
        assert_eq!(data[2 + MEASUREMENT_FILE_ID_SIZE - 1], 0);
    }

    #[test]
    fn test_init_rejects_long_file_id() {
        let init = DyscomInit {
            params: DyscomInitParams {
                measurement_file_id: "x".repeat(MEASUREMENT_FILE_ID_SIZE),
                ..Default::default()
            },
        };
        assert!(matches!(Packet::new(&init), Err(ProtocolError::InvalidArgument(_))));
    }

    #[test]
    fn test_init_ack() {
        let mut data = vec![0, 2, 4];
        data.extend(str_to_fixed_bytes("run-1", MEASUREMENT_FILE_ID_SIZE));
        let ack = DyscomInitAck::decode(&data).unwrap();
        assert_eq!(ack.result.init_state, DyscomInitState::Successful);
        assert_eq!(ack.result.output_frequency, DyscomSamplingRate::Hz1000);
        assert_eq!(ack.result.measurement_file_id, "run-1");

        assert!(DyscomInitAck::decode(&[0, 2, 4]).is_err());
        assert_eq!(DyscomInitAck::decode(&[21]).unwrap().result_error, ResultAndError::Busy);
    }
}
