//! Mid-level stimulation commands: the device repeats an uploaded pattern.
//!
//! A pattern is one [`ChannelConfiguration`] per channel, uploaded with
//! [`MidLevelUpdate`]. The device keeps stimulating until [`MidLevelStop`] or
//! until it stops receiving [`MidLevelGetCurrentData`] polls.

use sciencemode_bits::{BitField, BitLayout, ByteBuilder};
use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::constants::{CHANNEL_COUNT, MAX_POINTS_PER_CHANNEL};
use crate::error::ProtocolError;
use crate::packet::{empty_request, read_result, result_only_ack, AckPayload, Payload, Request};
use crate::result::ResultAndError;
use crate::types::ChannelPoint;

/// Largest ramp value (number of pulses to reach full current).
pub const MAX_RAMP: u8 = 15;
/// Largest period representable in 0.5 ms ticks.
pub const MAX_PERIOD_TICKS: u16 = (1 << 14) - 1;

const CHANNEL_HEADER: BitLayout = BitLayout::new(
    &[
        BitField::new("point_count", 0, 4),
        BitField::new("ramp", 4, 4),
        BitField::new("period", 8, 14),
    ],
    3,
    true,
);

/// Initialise mid-level stimulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidLevelInit {
    /// Stop stimulation on every error, not only on fatal ones.
    pub stop_on_all_errors: bool,
}

impl Payload for MidLevelInit {
    const COMMAND: Command = Command::MlInit;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        bb.set_bits(u64::from(self.stop_on_all_errors), 0, 1)?;
        bb.set_bits(0, 1, 7)?;
        Ok(())
    }
}

impl Request for MidLevelInit {
    type Ack = MidLevelInitAck;
}

result_only_ack!(
    /// Acknowledge for [`MidLevelInit`].
    MidLevelInitAck,
    Command::MlInitAck
);

/// Stimulation pattern of one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfiguration {
    /// Whether the channel takes part in the pattern.
    pub is_active: bool,
    /// Pulses until full current is reached, 0 to 15.
    pub ramp: u8,
    /// Time between pulses in milliseconds, resolution 0.5 ms.
    pub period_ms: f64,
    /// Pulse shape, 1 to 16 points.
    pub points: Vec<ChannelPoint>,
}

impl ChannelConfiguration {
    /// Create an active channel configuration.
    pub fn new(ramp: u8, period_ms: f64, points: Vec<ChannelPoint>) -> Self {
        ChannelConfiguration {
            is_active: true,
            ramp,
            period_ms,
            points,
        }
    }

    fn period_ticks(&self) -> Result<u16, ProtocolError> {
        let ticks = (self.period_ms * 2.0).round();
        if !ticks.is_finite() || ticks < 0.0 || ticks > f64::from(MAX_PERIOD_TICKS) {
            return Err(ProtocolError::invalid_argument(format!(
                "period {} ms outside 0 to {} ms",
                self.period_ms,
                f64::from(MAX_PERIOD_TICKS) / 2.0
            )));
        }
        Ok(ticks as u16)
    }

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.points.is_empty() || self.points.len() > MAX_POINTS_PER_CHANNEL {
            return Err(ProtocolError::invalid_argument(format!(
                "active channel needs 1 to {} points, got {}",
                MAX_POINTS_PER_CHANNEL,
                self.points.len()
            )));
        }
        if self.ramp > MAX_RAMP {
            return Err(ProtocolError::invalid_argument(format!(
                "ramp {} exceeds {}",
                self.ramp, MAX_RAMP
            )));
        }
        let offset = bb.byte_len();
        CHANNEL_HEADER.write(
            bb,
            offset,
            &[
                (self.points.len() - 1) as u64,
                u64::from(self.ramp),
                u64::from(self.period_ticks()?),
            ],
        )?;
        for point in &self.points {
            point.write(bb)?;
        }
        Ok(())
    }
}

/// Upload a stimulation pattern. Index in `channels` is the channel number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MidLevelUpdate {
    /// One configuration per channel.
    pub channels: Vec<ChannelConfiguration>,
}

impl Payload for MidLevelUpdate {
    const COMMAND: Command = Command::MlUpdate;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.channels.len() > CHANNEL_COUNT {
            return Err(ProtocolError::invalid_argument(format!(
                "at most {} channels, got {}",
                CHANNEL_COUNT,
                self.channels.len()
            )));
        }
        let mask = self
            .channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active)
            .fold(0u8, |mask, (index, _)| mask | (1 << index));
        bb.append_byte(mask);
        for config in self.channels.iter().filter(|c| c.is_active) {
            config.write(bb)?;
        }
        Ok(())
    }
}

impl Request for MidLevelUpdate {
    type Ack = MidLevelUpdateAck;
}

result_only_ack!(
    /// Acknowledge for [`MidLevelUpdate`].
    MidLevelUpdateAck,
    Command::MlUpdateAck
);

/// Data selection byte of [`MidLevelGetCurrentData`]: stimulation state.
pub const CURRENT_DATA_STIMULATION: u8 = 1;

/// Poll the stimulation state; also serves as keep-alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidLevelGetCurrentData;

impl Payload for MidLevelGetCurrentData {
    const COMMAND: Command = Command::MlGetCurrentData;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        bb.append_byte(CURRENT_DATA_STIMULATION);
        Ok(())
    }
}

impl Request for MidLevelGetCurrentData {
    type Ack = MidLevelGetCurrentDataAck;
}

/// Acknowledge for [`MidLevelGetCurrentData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidLevelGetCurrentDataAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Stimulation running, per channel.
    pub is_stimulation_active: [bool; CHANNEL_COUNT],
    /// Error detected, per channel.
    pub channel_error: [bool; CHANNEL_COUNT],
}

impl MidLevelGetCurrentDataAck {
    /// Whether any channel reported an error.
    pub fn has_channel_error(&self) -> bool {
        self.channel_error.iter().any(|&e| e)
    }
}

fn unpack_mask(mask: u8) -> [bool; CHANNEL_COUNT] {
    let mut flags = [false; CHANNEL_COUNT];
    for (index, flag) in flags.iter_mut().enumerate() {
        *flag = mask & (1 << index) != 0;
    }
    flags
}

impl AckPayload for MidLevelGetCurrentDataAck {
    const COMMAND: Command = Command::MlGetCurrentDataAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(MidLevelGetCurrentDataAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 4)?;
        if data[1] != CURRENT_DATA_STIMULATION {
            return Err(ProtocolError::InvalidValue {
                field: "current data selection",
                value: u64::from(data[1]),
            });
        }
        Ok(MidLevelGetCurrentDataAck {
            result_error,
            is_stimulation_active: unpack_mask(data[2]),
            channel_error: unpack_mask(data[3]),
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

empty_request!(
    /// Stop mid-level stimulation.
    MidLevelStop,
    Command::MlStop,
    MidLevelStopAck
);

result_only_ack!(
    /// Acknowledge for [`MidLevelStop`].
    MidLevelStopAck,
    Command::MlStopAck
);
