//! System clock backed by host commands.

use std::process::Command;

use chrono::{DateTime, Utc};
use toadb_core::types::TimezoneHint;

use crate::error::ClockError;
use crate::{timezone, HostClock};

/// The real host clock.
///
/// Stepping temporarily disables NTP so the step is not immediately undone,
/// then re-enables it regardless of the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl HostClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn set(&self, to: DateTime<Utc>) -> Result<(), ClockError> {
        set_ntp(false);
        let result = step_clock(to);
        set_ntp(true);
        result
    }

    fn align_timezone(&self, hint: &TimezoneHint) -> bool {
        timezone::align(hint)
    }
}

fn step_clock(to: DateTime<Utc>) -> Result<(), ClockError> {
    let stamp = format!("@{}", to.timestamp());
    let output = Command::new("date")
        .args(["-u", "-s", &stamp])
        .output()
        .map_err(|source| ClockError::Io {
            command: "date",
            source,
        })?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    let detail = if stderr.is_empty() {
        format!("date exited with {}", output.status)
    } else {
        stderr
    };
    Err(classify_set_failure(detail))
}

fn classify_set_failure(detail: String) -> ClockError {
    let lowered = detail.to_ascii_lowercase();
    if lowered.contains("permission denied")
        || lowered.contains("not permitted")
        || lowered.contains("must be root")
    {
        ClockError::PermissionDenied { detail }
    } else {
        ClockError::SetFailed { detail }
    }
}

/// Toggles NTP so a manual step sticks. A host without `timedatectl` just
/// skips the toggle.
fn set_ntp(enabled: bool) {
    let flag = if enabled { "true" } else { "false" };
    match Command::new("timedatectl").args(["set-ntp", flag]).output() {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            tracing::debug!(flag, status = %output.status, "timedatectl set-ntp refused; continuing");
        }
        Err(err) => {
            tracing::debug!(flag, error = %err, "timedatectl not runnable; continuing");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_stderr_classified_as_permission_denied() {
        let err = classify_set_failure("date: cannot set date: Operation not permitted".into());
        assert!(matches!(err, ClockError::PermissionDenied { .. }), "got: {err}");

        let err = classify_set_failure("date: Permission denied".into());
        assert!(matches!(err, ClockError::PermissionDenied { .. }), "got: {err}");
    }

    #[test]
    fn other_stderr_classified_as_set_failed() {
        let err = classify_set_failure("date: invalid date '@x'".into());
        assert!(matches!(err, ClockError::SetFailed { .. }), "got: {err}");
    }
}
