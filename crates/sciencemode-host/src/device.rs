//! Device façade: one connection, one layer, four command sets.

use crate::config::LayerConfig;
use crate::connection::Connection;
use crate::dyscom::Dyscom;
use crate::error::LayerResult;
use crate::general::General;
use crate::layer::{Layer, Statistics};
use crate::low_level::LowLevel;
use crate::mid_level::MidLevel;

/// An open ScienceMode device.
pub struct Device {
    layer: Layer,
}

impl Device {
    /// Open `connection` and start the read loop.
    ///
    /// Must be called within a tokio runtime.
    pub fn open<C: Connection + 'static>(connection: C, config: LayerConfig) -> LayerResult<Self> {
        Ok(Device {
            layer: Layer::start(connection, config)?,
        })
    }

    /// Open the serial port described by `serial`.
    #[cfg(feature = "serial")]
    pub fn open_serial(serial: crate::config::SerialConfig, config: LayerConfig) -> LayerResult<Self> {
        Self::open(crate::connection::SerialPortConnection::new(serial), config)
    }

    /// The underlying request/response layer.
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// General commands.
    pub fn general(&self) -> General<'_> {
        General::new(&self.layer)
    }

    /// Low-level stimulation commands.
    pub fn low_level(&self) -> LowLevel<'_> {
        LowLevel::new(&self.layer)
    }

    /// Mid-level stimulation commands.
    pub fn mid_level(&self) -> MidLevel<'_> {
        MidLevel::new(&self.layer)
    }

    /// Measurement commands.
    pub fn dyscom(&self) -> Dyscom<'_> {
        Dyscom::new(&self.layer)
    }

    /// Traffic counters.
    pub fn statistics(&self) -> Statistics {
        self.layer.statistics()
    }

    /// Stop the read loop, fail waiting requests and close the connection.
    pub fn close(&self) -> LayerResult<()> {
        self.layer.close()
    }
}
