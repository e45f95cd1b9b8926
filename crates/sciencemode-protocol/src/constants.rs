//! Protocol constants
//!
//! Framing bytes, size limits and the command codes of the ScienceMode
//! device protocol. Command codes are 10-bit values; every request code is
//! followed by the code of its acknowledgement.

// ============================================================================
// Framing
// ============================================================================

/// First byte of every frame.
pub const START_BYTE: u8 = 0xF0;
/// Last byte of every frame.
pub const STOP_BYTE: u8 = 0x0F;
/// Escape byte preceding a stuffed byte.
pub const STUFFING_BYTE: u8 = 0x81;
/// XOR key applied to stuffed bytes.
pub const STUFFING_KEY: u8 = 0x55;

/// Size of the always-stuffed header (checksum + length, 2 bytes each).
pub const HEADER_STUFFED_SIZE: usize = 8;
/// Size of the command word (command code + packet number).
pub const COMMAND_WORD_SIZE: usize = 2;
/// Smallest possible frame: start, header, command word, stop.
pub const MIN_FRAME_SIZE: usize = 1 + HEADER_STUFFED_SIZE + COMMAND_WORD_SIZE + 1;
/// Largest frame the device sends or accepts.
pub const MAX_FRAME_SIZE: usize = 1200;

/// Bytes discarded since the last valid frame after which the stream is
/// considered unsynchronizable.
pub const RESYNC_LIMIT: usize = 4096;

/// Width of the packet number field in the command word.
pub const PACKET_NUMBER_BITS: usize = 6;
/// Number of distinct packet numbers.
pub const PACKET_NUMBER_COUNT: usize = 1 << PACKET_NUMBER_BITS;
/// Width of the command code field in the command word.
pub const COMMAND_CODE_BITS: usize = 10;

// ============================================================================
// Command Codes: low level
// ============================================================================

/// Initialise low-level stimulation.
pub const CMD_LL_INIT: u16 = 0;
/// Acknowledge for low-level init.
pub const CMD_LL_INIT_ACK: u16 = 1;
/// Configure a channel and emit one pulse train.
pub const CMD_LL_CHANNEL_CONFIG: u16 = 2;
/// Acknowledge for low-level channel config.
pub const CMD_LL_CHANNEL_CONFIG_ACK: u16 = 3;
/// Stop low-level stimulation.
pub const CMD_LL_STOP: u16 = 4;
/// Acknowledge for low-level stop.
pub const CMD_LL_STOP_ACK: u16 = 5;

// ============================================================================
// Command Codes: general
// ============================================================================

/// Get firmware versions.
pub const CMD_GET_VERSION: u16 = 10;
/// Acknowledge for get version.
pub const CMD_GET_VERSION_ACK: u16 = 11;
/// Sent by the device when it does not recognise a request.
pub const CMD_UNKNOWN_COMMAND: u16 = 40;
/// Get the device id.
pub const CMD_GET_DEVICE_ID: u16 = 50;
/// Acknowledge for get device id.
pub const CMD_GET_DEVICE_ID_ACK: u16 = 51;
/// Reset the device.
pub const CMD_RESET: u16 = 52;
/// Acknowledge for reset.
pub const CMD_RESET_ACK: u16 = 53;

// ============================================================================
// Command Codes: mid level
// ============================================================================

/// Initialise mid-level stimulation.
pub const CMD_ML_INIT: u16 = 30;
/// Acknowledge for mid-level init.
pub const CMD_ML_INIT_ACK: u16 = 31;
/// Upload a stimulation pattern.
pub const CMD_ML_UPDATE: u16 = 32;
/// Acknowledge for mid-level update.
pub const CMD_ML_UPDATE_ACK: u16 = 33;
/// Stop mid-level stimulation.
pub const CMD_ML_STOP: u16 = 34;
/// Acknowledge for mid-level stop.
pub const CMD_ML_STOP_ACK: u16 = 35;
/// Poll stimulation state (keep-alive).
pub const CMD_ML_GET_CURRENT_DATA: u16 = 36;
/// Acknowledge for mid-level get current data.
pub const CMD_ML_GET_CURRENT_DATA_ACK: u16 = 37;

// ============================================================================
// Command Codes: dyscom
// ============================================================================

/// Initialise the measurement subsystem.
pub const CMD_DL_INIT: u16 = 60;
/// Acknowledge for dyscom init.
pub const CMD_DL_INIT_ACK: u16 = 61;
/// Start a measurement.
pub const CMD_DL_START: u16 = 62;
/// Acknowledge for dyscom start.
pub const CMD_DL_START_ACK: u16 = 63;
/// Stop a measurement.
pub const CMD_DL_STOP: u16 = 64;
/// Acknowledge for dyscom stop.
pub const CMD_DL_STOP_ACK: u16 = 65;
/// One block of a file transfer (device → host, unsolicited).
pub const CMD_DL_SEND_FILE: u16 = 66;
/// Host acknowledgement of one file block (host → device).
pub const CMD_DL_SEND_FILE_ACK: u16 = 67;
/// Query a value selected by a sub-type byte.
pub const CMD_DL_GET: u16 = 68;
/// Acknowledge for dyscom get.
pub const CMD_DL_GET_ACK: u16 = 69;
/// Switch a power module.
pub const CMD_DL_POWER_MODULE: u16 = 70;
/// Acknowledge for dyscom power module.
pub const CMD_DL_POWER_MODULE_ACK: u16 = 71;

// ============================================================================
// Field sizes
// ============================================================================

/// Length of the general device id string.
pub const DEVICE_ID_SIZE: usize = 10;
/// Length of the dyscom device id string.
pub const DYSCOM_DEVICE_ID_SIZE: usize = 22;
/// Length of file names in dyscom payloads.
pub const FILE_NAME_SIZE: usize = 128;
/// Length of the firmware version string in dyscom payloads.
pub const FIRMWARE_VERSION_SIZE: usize = 128;
/// Length of the measurement file id in dyscom init.
pub const MEASUREMENT_FILE_ID_SIZE: usize = 60;
/// Number of stimulation channels.
pub const CHANNEL_COUNT: usize = 4;
/// Maximum points per channel configuration.
pub const MAX_POINTS_PER_CHANNEL: usize = 16;
