//! Dyscom command layer: measurement control, queries and file download.

use sciencemode_protocol::{
    DyscomBatteryStatus, DyscomFileByName, DyscomFileInfo, DyscomFileSystemStatus, DyscomGet,
    DyscomGetType, DyscomGetValue, DyscomInit, DyscomInitParams, DyscomInitResult,
    DyscomOperationMode, DyscomPowerModule, DyscomPowerModulePowerType, DyscomPowerModuleType,
    DyscomStart, DyscomStop, Packet,
};

use crate::error::{LayerError, LayerResult};
use crate::file_transfer::{FileReceiver, ReceivedFile};
use crate::layer::Layer;

/// Query one dyscom value and unwrap the expected variant.
macro_rules! get_value {
    ($self:ident, $kind:ident, $label:literal) => {{
        match $self.get(DyscomGetType::$kind, $label).await? {
            DyscomGetValue::$kind(value) => Ok(value),
            _ => Err(LayerError::UnexpectedGetType {
                label: $label,
                expected: DyscomGetType::$kind,
                actual: DyscomGetType::Unused,
            }),
        }
    }};
}

/// Measurement subsystem commands.
#[derive(Clone, Copy)]
pub struct Dyscom<'a> {
    layer: &'a Layer,
}

impl<'a> Dyscom<'a> {
    /// Wrap `layer`.
    pub fn new(layer: &'a Layer) -> Self {
        Dyscom { layer }
    }

    /// Initialise the measurement subsystem.
    pub async fn init(&self, params: DyscomInitParams) -> LayerResult<DyscomInitResult> {
        let ack = self.layer.request(&DyscomInit { params }, "DyscomInit").await?;
        Ok(ack.result)
    }

    async fn get(&self, kind: DyscomGetType, label: &'static str) -> LayerResult<DyscomGetValue> {
        let ack = self.layer.request(&DyscomGet::new(kind), label).await?;
        if ack.kind != kind {
            return Err(LayerError::UnexpectedGetType {
                label,
                expected: kind,
                actual: ack.kind,
            });
        }
        Ok(ack.value)
    }

    /// Storage readiness and usage.
    pub async fn get_file_system_status(&self) -> LayerResult<DyscomFileSystemStatus> {
        get_value!(self, FileSystemStatus, "DyscomGetFileSystemStatus")
    }

    /// Number of stored measurements.
    pub async fn get_list_of_measurement_meta_info(&self) -> LayerResult<u16> {
        get_value!(self, ListOfMeasurementMetaInfo, "DyscomGetListOfMeasurementMetaInfo")
    }

    /// Metadata of the file selected for transfer.
    pub async fn get_file_by_name(&self) -> LayerResult<DyscomFileByName> {
        get_value!(self, FileByName, "DyscomGetFileByName")
    }

    /// Measurement device id.
    pub async fn get_device_id(&self) -> LayerResult<String> {
        get_value!(self, DeviceId, "DyscomGetDeviceId")
    }

    /// Measurement firmware version.
    pub async fn get_firmware_version(&self) -> LayerResult<String> {
        get_value!(self, FirmwareVersion, "DyscomGetFirmwareVersion")
    }

    /// Name, size and checksum of the stored file.
    pub async fn get_file_info(&self) -> LayerResult<DyscomFileInfo> {
        get_value!(self, FileInfo, "DyscomGetFileInfo")
    }

    /// Battery telemetry.
    pub async fn get_battery(&self) -> LayerResult<DyscomBatteryStatus> {
        get_value!(self, BatteryStatus, "DyscomGetBatteryStatus")
    }

    /// Current operation mode.
    pub async fn get_operation_mode(&self) -> LayerResult<DyscomOperationMode> {
        get_value!(self, OperationMode, "DyscomGetOperationMode")
    }

    /// Ask for the operation mode without waiting for the answer.
    pub fn send_get_operation_mode(&self) -> LayerResult<()> {
        let packet = Packet::new(&DyscomGet::new(DyscomGetType::OperationMode))?;
        self.layer.send_packet(&packet)?;
        Ok(())
    }

    /// Switch a power module; returns the state echoed by the device.
    pub async fn power_module(
        &self,
        module: DyscomPowerModuleType,
        power: DyscomPowerModulePowerType,
    ) -> LayerResult<(DyscomPowerModuleType, DyscomPowerModulePowerType)> {
        let ack = self
            .layer
            .request(&DyscomPowerModule { module, power }, "DyscomPowerModule")
            .await?;
        Ok((ack.module, ack.power))
    }

    /// Start a measurement.
    pub async fn start(&self) -> LayerResult<()> {
        self.layer.request(&DyscomStart, "DyscomStart").await?;
        Ok(())
    }

    /// Stop a measurement.
    pub async fn stop(&self) -> LayerResult<()> {
        self.layer.request(&DyscomStop, "DyscomStop").await?;
        Ok(())
    }

    /// Receive the blocks of `file` as the device pushes them.
    pub async fn receive_file(&self, file: &DyscomFileByName) -> LayerResult<ReceivedFile> {
        FileReceiver::new(self.layer, file).receive().await
    }
}
