use thiserror::Error;
use toadb_core::types::DeviceSerial;

/// Error surface for bridge invocation and per-device I/O.
///
/// Every variant is a routine operational condition during discovery; the
/// sync loop folds them into failed probes rather than crashing.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge unavailable: {detail}")]
    Unavailable { detail: String },

    #[error("device {serial} has not authorized this host")]
    Unauthorized { serial: DeviceSerial },

    #[error("device {serial} is offline or gone")]
    Offline { serial: DeviceSerial },

    #[error("no usable clock reading from device {serial}: {detail}")]
    ClockUnreadable { serial: DeviceSerial, detail: String },

    #[error("connect to {address} failed: {detail}")]
    ConnectFailed { address: String, detail: String },

    #[error("I/O error running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(command: impl Into<String>, source: std::io::Error) -> BridgeError {
    BridgeError::Io {
        command: command.into(),
        source,
    }
}
