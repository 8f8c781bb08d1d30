//! Device selection policy.
//!
//! Precedence, highest first:
//! 1. the persisted selection, when its device is attached and authorized
//! 2. the sole authorized device, when nothing is persisted
//! 3. nothing — with a reason
//!
//! A persisted selection never falls back to auto-selection: while it exists
//! it names the only device the loop will sync from, even when that device
//! is absent and a different authorized one is attached. Only `reset`
//! removes it.

use std::fmt;

use toadb_core::types::{Device, DeviceSerial, DeviceState, Selection};

/// Outcome of one selection pass over an enumeration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    /// The persisted device, attached and authorized.
    Persisted(Device),
    /// The sole authorized device; nothing is persisted. Never saved.
    AutoSelected(Device),
    /// No usable device this pass.
    Indeterminate(Indeterminate),
}

impl Pick {
    pub fn device(&self) -> Option<&Device> {
        match self {
            Pick::Persisted(device) | Pick::AutoSelected(device) => Some(device),
            Pick::Indeterminate(_) => None,
        }
    }
}

/// Why no device was usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indeterminate {
    NoDevices,
    SelectionMissing {
        serial: DeviceSerial,
    },
    SelectionNotReady {
        serial: DeviceSerial,
        state: DeviceState,
    },
    NoneAuthorized {
        attached: usize,
    },
    MultipleAuthorized {
        authorized: usize,
    },
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indeterminate::NoDevices => write!(f, "no devices attached"),
            Indeterminate::SelectionMissing { serial } => {
                write!(f, "selected device {serial} is not attached")
            }
            Indeterminate::SelectionNotReady { serial, state } => {
                write!(f, "selected device {serial} is {state}")
            }
            Indeterminate::NoneAuthorized { attached } => write!(
                f,
                "{attached} device(s) attached, none authorized; confirm the debugging prompt on the device"
            ),
            Indeterminate::MultipleAuthorized { authorized } => write!(
                f,
                "{authorized} authorized devices and nothing selected; run `toadb list` then `toadb device N`"
            ),
        }
    }
}

/// Picks the device to sync from, if any.
pub fn choose(devices: &[Device], persisted: Option<&Selection>) -> Pick {
    if let Some(selection) = persisted {
        return match devices.iter().find(|device| selection.matches(device)) {
            Some(device) if device.state.is_authorized() => Pick::Persisted(device.clone()),
            Some(device) => Pick::Indeterminate(Indeterminate::SelectionNotReady {
                serial: device.serial.clone(),
                state: device.state,
            }),
            None => Pick::Indeterminate(Indeterminate::SelectionMissing {
                serial: selection.serial.clone(),
            }),
        };
    }

    if devices.is_empty() {
        return Pick::Indeterminate(Indeterminate::NoDevices);
    }

    let authorized: Vec<&Device> = devices
        .iter()
        .filter(|device| device.state.is_authorized())
        .collect();
    match authorized.as_slice() {
        [only] => Pick::AutoSelected((*only).clone()),
        [] => Pick::Indeterminate(Indeterminate::NoneAuthorized {
            attached: devices.len(),
        }),
        many => Pick::Indeterminate(Indeterminate::MultipleAuthorized {
            authorized: many.len(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn device(serial: &str, state: DeviceState) -> Device {
        Device::new(DeviceSerial::from(serial), state)
    }

    fn selection_of(serial: &str) -> Selection {
        Selection {
            serial: DeviceSerial::from(serial),
            address: None,
        }
    }

    #[test]
    fn no_devices_and_no_selection() {
        let pick = choose(&[], None);
        assert_eq!(pick, Pick::Indeterminate(Indeterminate::NoDevices));
    }

    #[test]
    fn sole_authorized_device_is_auto_selected() {
        let devices = vec![
            device("emulator-5554", DeviceState::Authorized),
            device("R5CT30XXXX", DeviceState::Unauthorized),
        ];
        let pick = choose(&devices, None);
        assert_eq!(pick, Pick::AutoSelected(devices[0].clone()));
    }

    #[test]
    fn no_authorized_devices_reports_attached_count() {
        let devices = vec![
            device("a", DeviceState::Unauthorized),
            device("b", DeviceState::Offline),
        ];
        let pick = choose(&devices, None);
        assert_eq!(
            pick,
            Pick::Indeterminate(Indeterminate::NoneAuthorized { attached: 2 })
        );
    }

    #[test]
    fn multiple_authorized_devices_without_selection_is_indeterminate() {
        let devices = vec![
            device("a", DeviceState::Authorized),
            device("b", DeviceState::Authorized),
        ];
        let pick = choose(&devices, None);
        let Pick::Indeterminate(reason) = pick else {
            panic!("expected indeterminate");
        };
        assert_eq!(reason, Indeterminate::MultipleAuthorized { authorized: 2 });
        assert!(reason.to_string().contains("toadb device N"));
    }

    #[test]
    fn persisted_selection_wins_when_attached_and_authorized() {
        let devices = vec![
            device("a", DeviceState::Authorized),
            device("b", DeviceState::Authorized),
        ];
        let selection = selection_of("b");
        let pick = choose(&devices, Some(&selection));
        assert_eq!(pick, Pick::Persisted(devices[1].clone()));
    }

    #[test]
    fn persisted_selection_never_falls_back_when_absent() {
        // The selected device is gone; a perfectly good authorized device is
        // attached. The selection still wins, with nothing picked.
        let devices = vec![device("other", DeviceState::Authorized)];
        let selection = selection_of("mine");
        let pick = choose(&devices, Some(&selection));
        assert_eq!(
            pick,
            Pick::Indeterminate(Indeterminate::SelectionMissing {
                serial: DeviceSerial::from("mine"),
            })
        );
    }

    #[test]
    fn persisted_selection_never_falls_back_when_unauthorized() {
        let devices = vec![
            device("mine", DeviceState::Unauthorized),
            device("other", DeviceState::Authorized),
        ];
        let selection = selection_of("mine");
        let pick = choose(&devices, Some(&selection));
        assert_eq!(
            pick,
            Pick::Indeterminate(Indeterminate::SelectionNotReady {
                serial: DeviceSerial::from("mine"),
                state: DeviceState::Unauthorized,
            })
        );
    }

    #[test]
    fn persisted_network_selection_matches_by_address() {
        let devices = vec![device("192.168.1.7:5555", DeviceState::Authorized)];
        let selection = Selection {
            serial: DeviceSerial::from("192.168.1.7:5555"),
            address: Some("192.168.1.7:5555".to_owned()),
        };
        let pick = choose(&devices, Some(&selection));
        assert_eq!(pick, Pick::Persisted(devices[0].clone()));
    }

    #[test]
    fn offline_selected_device_reports_its_state() {
        let devices = vec![device("mine", DeviceState::Offline)];
        let selection = selection_of("mine");
        let pick = choose(&devices, Some(&selection));
        let Pick::Indeterminate(reason) = pick else {
            panic!("expected indeterminate");
        };
        assert_eq!(reason.to_string(), "selected device mine is offline");
    }
}
