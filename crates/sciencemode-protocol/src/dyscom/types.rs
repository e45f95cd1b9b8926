//! Enumerations of the dyscom measurement subsystem.

use serde::{Deserialize, Serialize};

use crate::types::wire_enum;

wire_enum! {
    /// Sub-type selector of the dyscom get command.
    pub enum DyscomGetType {
        /// Not a valid query.
        Unused = 0,
        /// Storage readiness and usage.
        FileSystemStatus = 1,
        /// Number of stored measurements.
        ListOfMeasurementMetaInfo = 2,
        /// Metadata of the measurement file selected for transfer.
        FileByName = 3,
        /// Current operation mode.
        OperationMode = 4,
        /// Measurement device id.
        DeviceId = 5,
        /// Measurement firmware version.
        FirmwareVersion = 6,
        /// Name, size and checksum of a stored file.
        FileInfo = 7,
        /// Battery telemetry.
        BatteryStatus = 8,
    }
}

wire_enum! {
    /// How a file is transferred.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomFileByNameMode {
        /// No transfer mode reported.
        #[default]
        Undefined = 0,
        /// File is sent in several blocks.
        MultiBlock = 1,
        /// File fits a single block.
        SingleBlock = 2,
    }
}

wire_enum! {
    /// Operation mode of the measurement subsystem.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomOperationMode {
        /// Not reported.
        #[default]
        Undefined = 0,
        /// Idle.
        Idle = 1,
        /// Preparing a live measurement.
        LiveMeasuringPre = 2,
        /// Live measurement running.
        LiveMeasuring = 3,
        /// Preparing a recording.
        RecordPre = 4,
        /// Recording to storage.
        Record = 5,
        /// Preparing a file transfer.
        DatatransferPre = 6,
        /// File transfer running.
        Datatransfer = 7,
        /// File transfer finished.
        DatatransferPost = 8,
        /// Invalid state.
        Invalid = 9,
    }
}

wire_enum! {
    /// Power module addressed by the power module command.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomPowerModuleType {
        /// Measurement front end.
        #[default]
        Measurement = 0,
        /// Bluetooth radio.
        Bluetooth = 1,
        /// Memory card.
        MemoryCard = 2,
    }
}

wire_enum! {
    /// Requested power state of a module.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomPowerModulePowerType {
        /// Switch the module off.
        #[default]
        SwitchOff = 0,
        /// Switch the module on.
        SwitchOn = 1,
    }
}

wire_enum! {
    /// Signal filter applied by the measurement front end.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomFilterType {
        /// No filter.
        #[default]
        Undefined = 0,
        /// Predefined filter 1.
        Predefined1 = 1,
        /// Predefined filter 2.
        Predefined2 = 2,
        /// Predefined filter 3.
        Predefined3 = 3,
    }
}

wire_enum! {
    /// State reported by dyscom init.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomInitState {
        /// Not reported.
        #[default]
        Unused = 0,
        /// Subsystem not initialised.
        Uninitialized = 1,
        /// Initialisation succeeded.
        Successful = 2,
        /// Initialisation failed.
        Failed = 3,
    }
}

wire_enum! {
    /// Output frequency of the measurement front end.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomSamplingRate {
        /// Not reported.
        #[default]
        Undefined = 0,
        /// 125 Hz.
        Hz125 = 1,
        /// 250 Hz.
        Hz250 = 2,
        /// 500 Hz.
        Hz500 = 3,
        /// 1 kHz.
        Hz1000 = 4,
        /// 2 kHz.
        Hz2000 = 5,
        /// 4 kHz.
        Hz4000 = 6,
    }
}

wire_enum! {
    /// Battery energy state.
    #[derive(Default, Serialize, Deserialize)]
    pub enum DyscomEnergyState {
        /// Not reported.
        #[default]
        Undefined = 0,
        /// Running on battery.
        Discharging = 1,
        /// Charging.
        Charging = 2,
        /// Fully charged.
        Full = 3,
    }
}
