//! ScienceMode Host
//!
//! Async host side of the ScienceMode protocol: a request/response layer
//! that correlates acknowledgements by packet number, typed command sets
//! on top of it, and reassembly of files pushed by the measurement
//! subsystem.
//!
//! # Example
//!
//! ```rust,ignore
//! use sciencemode_host::{Device, LayerConfig, MemoryConnection};
//!
//! let (connection, _peer) = MemoryConnection::new();
//! let device = Device::open(connection, LayerConfig::default())?;
//! let id = device.general().get_device_id().await?;
//! device.mid_level().init(false).await?;
//! device.close()?;
//! ```

mod config;
mod connection;
mod device;
mod dyscom;
mod error;
mod file_transfer;
mod general;
mod layer;
mod low_level;
mod mid_level;

pub use config::*;
pub use connection::*;
pub use device::*;
pub use dyscom::*;
pub use error::*;
pub use file_transfer::*;
pub use general::*;
pub use layer::*;
pub use low_level::*;
pub use mid_level::*;
