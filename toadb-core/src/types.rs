//! Domain types for device discovery and selection.
//!
//! Device identity is always a [`DeviceSerial`]; never a bare `String`.
//! All types are serializable/deserializable via serde + serde_json.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed device serial as reported by the bridge.
///
/// Network-attached devices use their `host:port` address as the serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceSerial(pub String);

impl DeviceSerial {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Transport implied by the serial shape. `host:port` serials are
    /// network-attached; everything else is USB.
    pub fn transport(&self) -> Transport {
        if self.0.contains(':') {
            Transport::Network
        } else {
            Transport::Usb
        }
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DeviceSerial {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceSerial {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a device is attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Usb,
    Network,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Usb => write!(f, "usb"),
            Transport::Network => write!(f, "network"),
        }
    }
}

/// Authorization state of an attached device.
///
/// Only [`DeviceState::Authorized`] devices accept shell commands; the other
/// states are visible in enumeration but unusable for sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Authorized,
    Unauthorized,
    Offline,
}

impl DeviceState {
    /// Maps a raw bridge state column to a [`DeviceState`]. Anything the
    /// bridge reports that is not `device` or `unauthorized` (e.g. `offline`,
    /// `recovery`, `sideload`) counts as offline for sync purposes.
    pub fn from_bridge(raw: &str) -> Self {
        match raw {
            "device" => DeviceState::Authorized,
            "unauthorized" => DeviceState::Unauthorized,
            _ => DeviceState::Offline,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, DeviceState::Authorized)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Authorized => write!(f, "authorized"),
            DeviceState::Unauthorized => write!(f, "unauthorized"),
            DeviceState::Offline => write!(f, "offline"),
        }
    }
}

/// Which cadence the sync loop is running at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// No successful sync yet; polling at the discovery interval inside the
    /// startup window.
    Discovering,
    /// At least one sync succeeded; polling at the refresh interval with no
    /// window limit.
    Synced,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Discovering => write!(f, "discovering"),
            RunPhase::Synced => write!(f, "synced"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One attached device as seen in a single enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: DeviceSerial,
    pub transport: Transport,
    pub state: DeviceState,
}

impl Device {
    /// Builds a device, inferring the transport from the serial shape.
    pub fn new(serial: DeviceSerial, state: DeviceState) -> Self {
        let transport = serial.transport();
        Self {
            serial,
            transport,
            state,
        }
    }
}

/// The persisted choice of sync source.
///
/// For network devices the connect address is stored alongside the serial so
/// the bridge can re-establish the connection after a reboot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub serial: DeviceSerial,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Selection {
    pub fn for_device(device: &Device) -> Self {
        let address = match device.transport {
            Transport::Network => Some(device.serial.as_str().to_owned()),
            Transport::Usb => None,
        };
        Self {
            serial: device.serial.clone(),
            address,
        }
    }

    /// True when `device` is the one this selection names, matched either by
    /// serial or by the stored connect address.
    pub fn matches(&self, device: &Device) -> bool {
        self.serial == device.serial || self.address.as_deref() == Some(device.serial.as_str())
    }
}

/// A snapshot of the timezone a device reports, used to align the host zone.
///
/// Both fields are best-effort: either may be absent when the device does not
/// expose the property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneHint {
    /// IANA zone id such as `Europe/Berlin`, when the device exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `+HHMM` / `-HHMM` UTC offset string, when the zone id is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

impl TimezoneHint {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.utc_offset.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_display_and_equality() {
        let a = DeviceSerial::from("emulator-5554");
        let b = DeviceSerial::from(String::from("emulator-5554"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "emulator-5554");
    }

    #[test]
    fn transport_inferred_from_serial_shape() {
        assert_eq!(
            DeviceSerial::from("192.168.1.7:5555").transport(),
            Transport::Network
        );
        assert_eq!(DeviceSerial::from("R5CT30XXXX").transport(), Transport::Usb);
    }

    #[test]
    fn state_from_bridge_column() {
        assert_eq!(DeviceState::from_bridge("device"), DeviceState::Authorized);
        assert_eq!(
            DeviceState::from_bridge("unauthorized"),
            DeviceState::Unauthorized
        );
        assert_eq!(DeviceState::from_bridge("offline"), DeviceState::Offline);
        assert_eq!(DeviceState::from_bridge("recovery"), DeviceState::Offline);
    }

    #[test]
    fn selection_for_network_device_keeps_address() {
        let device = Device::new(
            DeviceSerial::from("192.168.1.7:5555"),
            DeviceState::Authorized,
        );
        let selection = Selection::for_device(&device);
        assert_eq!(selection.address.as_deref(), Some("192.168.1.7:5555"));
        assert!(selection.matches(&device));
    }

    #[test]
    fn selection_for_usb_device_has_no_address() {
        let device = Device::new(DeviceSerial::from("emulator-5554"), DeviceState::Authorized);
        let selection = Selection::for_device(&device);
        assert_eq!(selection.address, None);
        assert!(selection.matches(&device));
    }

    #[test]
    fn selection_does_not_match_other_devices() {
        let device = Device::new(DeviceSerial::from("emulator-5554"), DeviceState::Authorized);
        let other = Device::new(DeviceSerial::from("emulator-5556"), DeviceState::Authorized);
        let selection = Selection::for_device(&device);
        assert!(!selection.matches(&other));
    }

    #[test]
    fn selection_serde_roundtrip() {
        let selection = Selection {
            serial: DeviceSerial::from("emulator-5554"),
            address: None,
        };
        let json = serde_json::to_string(&selection).expect("serialize");
        assert!(!json.contains("address"));
        let back: Selection = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(selection, back);
    }
}
