//! Low-level command layer.

use sciencemode_protocol::{
    Channel, ChannelPoint, Connector, HighVoltage, LowLevelChannelConfig, LowLevelChannelConfigAck,
    LowLevelInit, LowLevelStop, Packet,
};

use crate::error::LayerResult;
use crate::layer::Layer;

/// Single pulses, timed by the host.
#[derive(Clone, Copy)]
pub struct LowLevel<'a> {
    layer: &'a Layer,
}

impl<'a> LowLevel<'a> {
    /// Wrap `layer`.
    pub fn new(layer: &'a Layer) -> Self {
        LowLevel { layer }
    }

    /// Initialise low-level stimulation.
    pub async fn init(&self, high_voltage: HighVoltage) -> LayerResult<()> {
        self.layer
            .request(&LowLevelInit { high_voltage }, "LowLevelInit")
            .await?;
        Ok(())
    }

    /// Emit one pulse on `channel` and wait for the device to confirm it.
    pub async fn channel_config(
        &self,
        channel: Channel,
        connector: Connector,
        points: Vec<ChannelPoint>,
    ) -> LayerResult<LowLevelChannelConfigAck> {
        let request = LowLevelChannelConfig {
            channel,
            connector,
            points,
        };
        self.layer.request(&request, "LowLevelChannelConfig").await
    }

    /// Emit one pulse without waiting for the acknowledgement.
    pub fn send_channel_config(
        &self,
        channel: Channel,
        connector: Connector,
        points: Vec<ChannelPoint>,
    ) -> LayerResult<()> {
        let packet = Packet::new(&LowLevelChannelConfig {
            channel,
            connector,
            points,
        })?;
        self.layer.send_packet(&packet)?;
        Ok(())
    }

    /// Stop low-level stimulation.
    pub async fn stop(&self) -> LayerResult<()> {
        self.layer.request(&LowLevelStop, "LowLevelStop").await?;
        Ok(())
    }
}
