//! Dyscom: the measurement and file-transfer command family.

mod get;
mod init;
mod power_module;
mod send_file;
mod types;

pub use get::*;
pub use init::*;
pub use power_module::*;
pub use send_file::*;
pub use types::*;

use crate::commands::Command;
use crate::packet::{empty_request, result_only_ack};

empty_request!(
    /// Start a measurement.
    DyscomStart,
    Command::DlStart,
    DyscomStartAck
);

result_only_ack!(
    /// Acknowledge for [`DyscomStart`].
    DyscomStartAck,
    Command::DlStartAck
);

empty_request!(
    /// Stop a measurement.
    DyscomStop,
    Command::DlStop,
    DyscomStopAck
);

result_only_ack!(
    /// Acknowledge for [`DyscomStop`].
    DyscomStopAck,
    Command::DlStopAck
);
