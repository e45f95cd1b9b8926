//! Host configuration.
//!
//! All values have defaults; a YAML file only needs the keys it changes:
//!
//! ```yaml
//! layer:
//!   response_timeout_ms: 500
//!   max_in_flight: 4
//! serial:
//!   path: /dev/ttyUSB0
//! ```

use std::path::Path;
use std::time::Duration;

use sciencemode_protocol::PACKET_NUMBER_COUNT;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// Layer
// ============================================================================

/// Settings of the request/response layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Time to wait for an acknowledgement.
    pub response_timeout_ms: u64,
    /// Interval between reads of the connection.
    pub poll_interval_ms: u64,
    /// Requests allowed to wait for an acknowledgement at once.
    pub max_in_flight: usize,
    /// Size of the packet number space, 1 to 64.
    pub packet_number_count: usize,
    /// Time to wait for the next file block.
    pub file_block_timeout_ms: u64,
    /// File blocks buffered before the reader drops them.
    pub file_block_capacity: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        LayerConfig {
            response_timeout_ms: 1000,
            poll_interval_ms: 1,
            max_in_flight: 1,
            packet_number_count: PACKET_NUMBER_COUNT,
            file_block_timeout_ms: 5000,
            file_block_capacity: 64,
        }
    }
}

impl LayerConfig {
    /// Acknowledgement timeout.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Read loop interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// File block timeout.
    pub fn file_block_timeout(&self) -> Duration {
        Duration::from_millis(self.file_block_timeout_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packet_number_count == 0 || self.packet_number_count > PACKET_NUMBER_COUNT {
            return Err(ConfigError::Invalid(format!(
                "packet_number_count must be 1 to {}, got {}",
                PACKET_NUMBER_COUNT, self.packet_number_count
            )));
        }
        if self.max_in_flight == 0 || self.max_in_flight > self.packet_number_count {
            return Err(ConfigError::Invalid(format!(
                "max_in_flight must be 1 to {}, got {}",
                self.packet_number_count, self.max_in_flight
            )));
        }
        if self.response_timeout_ms == 0 {
            return Err(ConfigError::Invalid("response_timeout_ms must not be 0".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must not be 0".to_string()));
        }
        if self.file_block_capacity == 0 {
            return Err(ConfigError::Invalid("file_block_capacity must not be 0".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Serial
// ============================================================================

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    /// Baud rate.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            path: String::new(),
            baud_rate: 3_000_000,
        }
    }
}

// ============================================================================
// File
// ============================================================================

/// Complete host configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Layer settings.
    pub layer: LayerConfig,
    /// Serial port, if the device is attached to one.
    pub serial: Option<SerialConfig>,
}

impl HostConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = serde_yaml::from_str(yaml)?;
        config.layer.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }
}
