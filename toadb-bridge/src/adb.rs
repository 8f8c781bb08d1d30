//! adb-backed [`Bridge`] implementation.
//!
//! Every call shells out to the `adb` binary and classifies its output.
//! Clock reads walk a fallback chain of shell commands because not every
//! Android build ships the same `date`.

use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::{DateTime, Utc};
use toadb_core::types::{Device, DeviceSerial, DeviceState, TimezoneHint};

use crate::error::{io_err, BridgeError};
use crate::Bridge;

/// Shell commands tried in order until one yields an epoch.
const CLOCK_COMMANDS: &[&[&str]] = &[
    &["date", "+%s"],
    &["toybox", "date", "+%s"],
    &["busybox", "date", "+%s"],
    &["sh", "-c", "date +%s"],
];

/// Properties tried in order for an IANA zone id.
const ZONE_ID_COMMANDS: &[&[&str]] = &[
    &["getprop", "persist.sys.timezone"],
    &["settings", "get", "global", "time_zone"],
];

/// Bridge over a locally installed `adb` binary.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
}

impl AdbBridge {
    pub fn new() -> Self {
        Self::with_program("adb")
    }

    /// Uses an explicit binary path instead of resolving `adb` on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, BridgeError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => BridgeError::Unavailable {
                    detail: format!("{} not found on PATH", self.program.display()),
                },
                _ => io_err(
                    format!("{} {}", self.program.display(), args.join(" ")),
                    source,
                ),
            })
    }

    fn shell(&self, serial: &DeviceSerial, command: &[&str]) -> Result<Output, BridgeError> {
        let mut args: Vec<&str> = vec!["-s", serial.as_str(), "shell"];
        args.extend_from_slice(command);
        self.run(&args)
    }

    fn zone_id(&self, serial: &DeviceSerial) -> Option<String> {
        for command in ZONE_ID_COMMANDS {
            if let Ok(output) = self.shell(serial, command) {
                if output.status.success() {
                    let zone = first_line(&output.stdout);
                    if !zone.is_empty() && zone != "null" {
                        return Some(zone);
                    }
                }
            }
        }
        None
    }

    fn zone_offset(&self, serial: &DeviceSerial) -> Option<String> {
        let output = self.shell(serial, &["date", "+%z"]).ok()?;
        if !output.status.success() {
            return None;
        }
        normalize_offset(&first_line(&output.stdout))
    }
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge for AdbBridge {
    fn ensure_server(&self) {
        if let Err(err) = self.run(&["start-server"]) {
            tracing::debug!(error = %err, "bridge server start failed; continuing");
        }
    }

    fn connect(&self, address: &str) -> Result<(), BridgeError> {
        let output = self.run(&["connect", address])?;
        let stdout = first_line(&output.stdout);
        let stderr = first_line(&output.stderr);
        // adb reports connect failures on stdout with a zero exit code.
        let combined = format!("{stdout} {stderr}").to_ascii_lowercase();
        if !output.status.success()
            || combined.contains("failed")
            || combined.contains("cannot")
            || combined.contains("unable")
        {
            let detail = if stderr.is_empty() { stdout } else { stderr };
            return Err(BridgeError::ConnectFailed {
                address: address.to_owned(),
                detail,
            });
        }
        tracing::debug!(%address, "bridge connect ok");
        Ok(())
    }

    fn list_devices(&self) -> Result<Vec<Device>, BridgeError> {
        let output = self.run(&["devices"])?;
        if !output.status.success() {
            return Err(BridgeError::Unavailable {
                detail: first_line(&output.stderr),
            });
        }
        Ok(parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn read_clock(&self, serial: &DeviceSerial) -> Result<DateTime<Utc>, BridgeError> {
        let mut last_stderr = String::new();
        for command in CLOCK_COMMANDS {
            let output = self.shell(serial, command)?;
            if output.status.success() {
                if let Some(moment) = parse_epoch(&first_line(&output.stdout)) {
                    return Ok(moment);
                }
            }
            let stderr = first_line(&output.stderr);
            if !stderr.is_empty() {
                last_stderr = stderr;
            }
        }
        Err(classify_device_failure(serial, &last_stderr))
    }

    fn model(&self, serial: &DeviceSerial) -> Option<String> {
        let output = self.shell(serial, &["getprop", "ro.product.model"]).ok()?;
        if !output.status.success() {
            return None;
        }
        let model = first_line(&output.stdout);
        (!model.is_empty()).then_some(model)
    }

    fn timezone_hint(&self, serial: &DeviceSerial) -> TimezoneHint {
        TimezoneHint {
            id: self.zone_id(serial),
            utc_offset: self.zone_offset(serial),
        }
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Parses `adb devices` output into devices, skipping the banner and any
/// `* daemon …` startup chatter.
fn parse_devices(text: &str) -> Vec<Device> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices"))
        .filter(|line| !line.starts_with('*'))
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let serial = columns.next()?;
            let state = columns.next()?;
            Some(Device::new(
                DeviceSerial::from(serial),
                DeviceState::from_bridge(state),
            ))
        })
        .collect()
}

/// First line of subprocess output, trimmed. Tolerates CRLF from devices
/// that terminate shell output with `\r\n`.
fn first_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Whole-second epoch in decimal, nothing else.
fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let epoch: i64 = raw.parse().ok()?;
    DateTime::from_timestamp(epoch, 0)
}

/// `+HHMM` / `-HHMM`, rejecting anything else the device might print.
fn normalize_offset(raw: &str) -> Option<String> {
    let head = raw.get(..5)?;
    let digits = head.strip_prefix('+').or_else(|| head.strip_prefix('-'))?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(head.to_owned())
}

/// Maps the stderr of a failed device command to the error taxonomy.
fn classify_device_failure(serial: &DeviceSerial, stderr: &str) -> BridgeError {
    let lowered = stderr.to_ascii_lowercase();
    if lowered.contains("unauthorized") {
        BridgeError::Unauthorized {
            serial: serial.clone(),
        }
    } else if lowered.contains("offline")
        || lowered.contains("not found")
        || lowered.contains("no devices")
    {
        BridgeError::Offline {
            serial: serial.clone(),
        }
    } else {
        BridgeError::ClockUnreadable {
            serial: serial.clone(),
            detail: if stderr.is_empty() {
                "no clock command produced an epoch".to_owned()
            } else {
                stderr.to_owned()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
