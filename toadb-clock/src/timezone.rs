//! Host timezone alignment from a device-reported hint.
//!
//! Strategy order:
//! 1. `timedatectl set-timezone <id>` with the device's IANA zone id
//! 2. symlink `/etc/localtime` to the matching zoneinfo file
//! 3. `timedatectl set-timezone Etc/GMT<h>` derived from the UTC offset
//!
//! All of it is best-effort: a host where none of these work keeps its zone.

use std::process::Command;

use toadb_core::types::TimezoneHint;

/// Applies the strongest available strategy. Returns whether the host zone
/// was actually changed.
pub fn align(hint: &TimezoneHint) -> bool {
    if let Some(id) = hint.id.as_deref() {
        if set_zone(id) || link_zoneinfo(id) {
            tracing::info!(zone = id, "host timezone set from device zone id");
            return true;
        }
    }
    if let Some(offset) = hint.utc_offset.as_deref() {
        if let Some(zone) = etc_gmt_zone(offset) {
            if set_zone(&zone) {
                tracing::info!(zone = %zone, offset, "host timezone set from device UTC offset");
                return true;
            }
        }
    }
    false
}

/// `timedatectl set-timezone` — the systemd path.
fn set_zone(zone: &str) -> bool {
    match Command::new("timedatectl")
        .args(["set-timezone", zone])
        .output()
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Fallback for hosts without systemd: point `/etc/localtime` at the zone
/// file directly and record the name in `/etc/timezone`.
#[cfg(unix)]
fn link_zoneinfo(zone: &str) -> bool {
    let zonefile = std::path::Path::new("/usr/share/zoneinfo").join(zone);
    if !zonefile.exists() {
        return false;
    }
    let linked = Command::new("ln")
        .arg("-sf")
        .arg(&zonefile)
        .arg("/etc/localtime")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if linked {
        let _ = std::fs::write("/etc/timezone", format!("{zone}\n"));
    }
    linked
}
#[cfg(not(unix))]
fn link_zoneinfo(_zone: &str) -> bool {
    false
}

/// Maps `+HHMM`/`-HHMM` to the POSIX-inverted `Etc/GMT` zone: `+0800`
/// becomes `Etc/GMT-8`, `-0300` becomes `Etc/GMT+3`. Offsets with a minute
/// component have no `Etc/GMT` equivalent and yield `None`.
pub fn etc_gmt_zone(offset: &str) -> Option<String> {
    let head = offset.get(..5)?;
    let sign: i32 = if head.starts_with('+') {
        -1
    } else if head.starts_with('-') {
        1
    } else {
        return None;
    };
    let hours: i32 = head.get(1..3)?.parse().ok()?;
    let minutes: u32 = head.get(3..5)?.parse().ok()?;
    if minutes != 0 {
        return None;
    }
    Some(format!("Etc/GMT{:+}", sign * hours))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
