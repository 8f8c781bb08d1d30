//! Bridge client — device enumeration and shell access over adb.
//!
//! The [`Bridge`] trait is the seam between the sync engine and the outside
//! world: production code uses [`AdbBridge`], tests substitute scripted
//! implementations.

pub mod adb;
mod error;

pub use adb::AdbBridge;
pub use error::BridgeError;

use chrono::{DateTime, Utc};
use toadb_core::types::{Device, DeviceSerial, TimezoneHint};

/// Capability interface to the device bridge.
///
/// `ensure_server`, `model`, and `timezone_hint` are best-effort and default
/// to doing nothing; `connect`, `list_devices`, and `read_clock` carry the
/// error taxonomy the sync loop folds into probe outcomes.
pub trait Bridge {
    /// Starts the bridge server if it is not already running. Failure here
    /// is not fatal; enumeration will surface the real error.
    fn ensure_server(&self) {}

    /// Connects to a network-attached device at `host:port`.
    fn connect(&self, address: &str) -> Result<(), BridgeError>;

    /// Enumerates attached devices with their authorization state.
    fn list_devices(&self) -> Result<Vec<Device>, BridgeError>;

    /// Reads the device wall clock as whole-second UTC.
    fn read_clock(&self, serial: &DeviceSerial) -> Result<DateTime<Utc>, BridgeError>;

    /// Human-readable device model, when the device exposes one.
    fn model(&self, _serial: &DeviceSerial) -> Option<String> {
        None
    }

    /// Timezone the device believes it is in, when readable.
    fn timezone_hint(&self, _serial: &DeviceSerial) -> TimezoneHint {
        TimezoneHint::default()
    }
}
