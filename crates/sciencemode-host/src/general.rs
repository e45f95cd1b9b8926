//! General command layer.

use sciencemode_protocol::{FirmwareVersion, GetDeviceId, GetVersion, Reset};

use crate::error::LayerResult;
use crate::layer::Layer;

/// Firmware versions of both controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// Main controller.
    pub main: FirmwareVersion,
    /// Stimulation controller.
    pub stimulation: FirmwareVersion,
}

/// Device identity, version and reset.
#[derive(Clone, Copy)]
pub struct General<'a> {
    layer: &'a Layer,
}

impl<'a> General<'a> {
    /// Wrap `layer`.
    pub fn new(layer: &'a Layer) -> Self {
        General { layer }
    }

    /// Read the device id.
    pub async fn get_device_id(&self) -> LayerResult<String> {
        let ack = self.layer.request(&GetDeviceId, "GetDeviceId").await?;
        Ok(ack.device_id)
    }

    /// Read the firmware versions.
    pub async fn get_version(&self) -> LayerResult<VersionInfo> {
        let ack = self.layer.request(&GetVersion, "GetVersion").await?;
        Ok(VersionInfo {
            main: ack.main,
            stimulation: ack.stimulation,
        })
    }

    /// Reset the device.
    pub async fn reset(&self) -> LayerResult<()> {
        self.layer.request(&Reset, "Reset").await?;
        Ok(())
    }
}
