//! Drift measurement and correction policy.
//!
//! A probe brackets the device clock read between two host clock reads and
//! compares the device time against the midpoint of the bracket, so command
//! latency does not inflate the measured offset.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// One bracketed reading of the device clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftSample {
    /// Device wall clock, whole seconds.
    pub device_time: DateTime<Utc>,
    /// Host clock immediately before the read.
    pub read_started: DateTime<Utc>,
    /// Host clock immediately after the read.
    pub read_finished: DateTime<Utc>,
}

impl DriftSample {
    /// Signed offset relative to the host: positive means the device is
    /// ahead. Measured against the midpoint of the read bracket.
    pub fn offset(&self) -> TimeDelta {
        let midpoint = self.read_started + (self.read_finished - self.read_started) / 2;
        self.device_time - midpoint
    }

    /// Host-side duration of the clock read.
    pub fn round_trip(&self) -> TimeDelta {
        self.read_finished - self.read_started
    }
}

/// What a probe should do about a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// |offset| < threshold: leave the host clock alone.
    InSync { offset: TimeDelta },
    /// |offset| >= threshold: step the host clock by `offset`.
    Correct { offset: TimeDelta },
}

impl Verdict {
    pub fn offset(&self) -> TimeDelta {
        match self {
            Verdict::InSync { offset } | Verdict::Correct { offset } => *offset,
        }
    }
}

/// Applies the threshold rule: a correction happens iff |offset| >= threshold.
pub fn evaluate(sample: &DriftSample, threshold: Duration) -> Verdict {
    let offset = sample.offset();
    let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
    if offset.abs() >= threshold {
        Verdict::Correct { offset }
    } else {
        Verdict::InSync { offset }
    }
}

/// `+12.340s` / `-0.500s` for logs.
pub fn format_offset(offset: TimeDelta) -> String {
    let ms = offset.num_milliseconds();
    let sign = if ms < 0 { '-' } else { '+' };
    format!("{sign}{}.{:03}s", ms.abs() / 1000, ms.abs() % 1000)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
