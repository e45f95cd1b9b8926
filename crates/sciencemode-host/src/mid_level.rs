//! Mid-level command layer.

use sciencemode_protocol::{
    ChannelConfiguration, MidLevelGetCurrentData, MidLevelInit, MidLevelStop, MidLevelUpdate,
    CHANNEL_COUNT,
};

use crate::error::{LayerError, LayerResult};
use crate::layer::Layer;

/// Periodic stimulation patterns run by the device.
///
/// The device stops a pattern when it is not polled with
/// [`MidLevel::get_current_data`] for a while.
#[derive(Clone, Copy)]
pub struct MidLevel<'a> {
    layer: &'a Layer,
}

impl<'a> MidLevel<'a> {
    /// Wrap `layer`.
    pub fn new(layer: &'a Layer) -> Self {
        MidLevel { layer }
    }

    /// Initialise mid-level stimulation.
    pub async fn init(&self, stop_on_all_errors: bool) -> LayerResult<()> {
        self.layer
            .request(&MidLevelInit { stop_on_all_errors }, "MidLevelInit")
            .await?;
        Ok(())
    }

    /// Upload a pattern, one configuration per channel.
    pub async fn update(&self, channels: &[ChannelConfiguration]) -> LayerResult<()> {
        let request = MidLevelUpdate {
            channels: channels.to_vec(),
        };
        self.layer.request(&request, "MidLevelUpdate").await?;
        Ok(())
    }

    /// Poll the pattern; returns which channels are stimulating.
    ///
    /// Fails with [`LayerError::ChannelError`] if any channel reports an error.
    pub async fn get_current_data(&self) -> LayerResult<[bool; CHANNEL_COUNT]> {
        let label = "MidLevelGetCurrentData";
        let ack = self.layer.request(&MidLevelGetCurrentData, label).await?;
        if ack.has_channel_error() {
            return Err(LayerError::ChannelError {
                label,
                channels: ack.channel_error,
            });
        }
        Ok(ack.is_stimulation_active)
    }

    /// Stop stimulation.
    pub async fn stop(&self) -> LayerResult<()> {
        self.layer.request(&MidLevelStop, "MidLevelStop").await?;
        Ok(())
    }
}
