//! Low-level stimulation commands: the host times every pulse itself.

use sciencemode_bits::{BitField, BitLayout, ByteBuilder};

use crate::commands::Command;
use crate::constants::MAX_POINTS_PER_CHANNEL;
use crate::error::ProtocolError;
use crate::packet::{empty_request, read_result, result_only_ack, AckPayload, Payload, Request};
use crate::result::ResultAndError;
use crate::types::{Channel, ChannelPoint, Connector, HighVoltage};

/// Initialise low-level stimulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowLevelInit {
    /// High-voltage level to use.
    pub high_voltage: HighVoltage,
}

impl Payload for LowLevelInit {
    const COMMAND: Command = Command::LlInit;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        bb.set_bits(u8::from(self.high_voltage).into(), 0, 3)?;
        bb.set_bits(0, 3, 5)?;
        Ok(())
    }
}

impl Request for LowLevelInit {
    type Ack = LowLevelInitAck;
}

result_only_ack!(
    /// Acknowledge for [`LowLevelInit`].
    LowLevelInitAck,
    Command::LlInitAck
);

const CHANNEL_CONFIG_HEADER: BitLayout = BitLayout::new(
    &[
        BitField::new("channel", 0, 2),
        BitField::new("connector", 2, 1),
        BitField::new("point_count", 8, 4),
    ],
    2,
    false,
);

/// Configure one channel and emit a single pulse immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowLevelChannelConfig {
    /// Channel to stimulate.
    pub channel: Channel,
    /// Connector the electrodes are attached to.
    pub connector: Connector,
    /// Pulse shape, 1 to 16 points.
    pub points: Vec<ChannelPoint>,
}

impl Payload for LowLevelChannelConfig {
    const COMMAND: Command = Command::LlChannelConfig;

    fn write(&self, bb: &mut ByteBuilder) -> Result<(), ProtocolError> {
        if self.points.is_empty() || self.points.len() > MAX_POINTS_PER_CHANNEL {
            return Err(ProtocolError::invalid_argument(format!(
                "channel config needs 1 to {} points, got {}",
                MAX_POINTS_PER_CHANNEL,
                self.points.len()
            )));
        }
        CHANNEL_CONFIG_HEADER.write(
            bb,
            0,
            &[
                u8::from(self.channel).into(),
                u8::from(self.connector).into(),
                (self.points.len() - 1) as u64,
            ],
        )?;
        for point in &self.points {
            point.write(bb)?;
        }
        Ok(())
    }
}

impl Request for LowLevelChannelConfig {
    type Ack = LowLevelChannelConfigAck;
}

/// Acknowledge for [`LowLevelChannelConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowLevelChannelConfigAck {
    /// Device-reported outcome.
    pub result_error: ResultAndError,
    /// Electrode error detected on the channel.
    pub electrode_error: bool,
    /// Channel that was stimulated.
    pub channel: Channel,
    /// Connector that was used.
    pub connector: Connector,
}

impl AckPayload for LowLevelChannelConfigAck {
    const COMMAND: Command = Command::LlChannelConfigAck;

    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let result_error = read_result(Self::COMMAND, data)?;
        if !result_error.is_ok() {
            return Ok(LowLevelChannelConfigAck {
                result_error,
                ..Default::default()
            });
        }
        ProtocolError::ensure_len(Self::COMMAND, data, 3)?;
        Ok(LowLevelChannelConfigAck {
            result_error,
            electrode_error: data[1] != 0,
            channel: Channel::try_from(data[2] & 0x03)?,
            connector: Connector::try_from((data[2] >> 2) & 0x01)?,
        })
    }

    fn result_error(&self) -> ResultAndError {
        self.result_error
    }
}

empty_request!(
    /// Stop low-level stimulation.
    LowLevelStop,
    Command::LlStop,
    LowLevelStopAck
);

result_only_ack!(
    /// Acknowledge for [`LowLevelStop`].
    LowLevelStopAck,
    Command::LlStopAck
);
