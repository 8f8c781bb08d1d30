//! One probe cycle: connect, enumerate, select, measure, correct.

use chrono::{DateTime, TimeDelta, Utc};
use toadb_bridge::Bridge;
use toadb_clock::HostClock;
use toadb_core::{config::SyncConfig, store::SelectionStore, types::Device};

use crate::drift::{self, DriftSample, Verdict};
use crate::error::ProbeFailure;
use crate::selector::{self, Pick};

/// Record of one probe cycle.
#[derive(Debug)]
pub struct SyncAttempt {
    /// Host time when the cycle finished.
    pub at: DateTime<Utc>,
    pub outcome: ProbeOutcome,
}

/// How a probe cycle ended.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The host clock was stepped by `offset`.
    Corrected { device: Device, offset: TimeDelta },
    /// Drift was below the threshold; the host clock was left alone.
    InSync { device: Device, offset: TimeDelta },
    /// The cycle could not produce a sync.
    Failed { reason: ProbeFailure },
}

impl SyncAttempt {
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, ProbeOutcome::Failed { .. })
    }

    pub fn device(&self) -> Option<&Device> {
        match &self.outcome {
            ProbeOutcome::Corrected { device, .. } | ProbeOutcome::InSync { device, .. } => {
                Some(device)
            }
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

/// Runs one full probe cycle. Every failure mode lands in the outcome; this
/// never returns an error and never panics.
pub fn run_probe<B, C, S>(bridge: &B, clock: &C, store: &S, config: &SyncConfig) -> SyncAttempt
where
    B: Bridge,
    C: HostClock,
    S: SelectionStore,
{
    let outcome = probe_cycle(bridge, clock, store, config);
    SyncAttempt {
        at: clock.now(),
        outcome,
    }
}

fn probe_cycle<B, C, S>(bridge: &B, clock: &C, store: &S, config: &SyncConfig) -> ProbeOutcome
where
    B: Bridge,
    C: HostClock,
    S: SelectionStore,
{
    if let Some(address) = config.connect_address.as_deref() {
        if let Err(err) = bridge.connect(address) {
            // USB devices may still enumerate; keep going.
            tracing::warn!(address, error = %err, "bridge connect failed");
        }
    }

    let devices = match bridge.list_devices() {
        Ok(devices) => devices,
        Err(err) => return fail(err.into()),
    };
    let persisted = match store.load() {
        Ok(persisted) => persisted,
        Err(err) => return fail(err.into()),
    };

    let device = match selector::choose(&devices, persisted.as_ref()) {
        Pick::Persisted(device) => {
            tracing::debug!(serial = %device.serial, "using saved selection");
            device
        }
        Pick::AutoSelected(device) => {
            tracing::debug!(serial = %device.serial, "auto-selected sole authorized device");
            device
        }
        Pick::Indeterminate(reason) => return fail(ProbeFailure::NoDeterminateDevice(reason)),
    };

    let read_started = clock.now();
    let device_time = match bridge.read_clock(&device.serial) {
        Ok(device_time) => device_time,
        Err(err) => return fail(err.into()),
    };
    let read_finished = clock.now();

    let sample = DriftSample {
        device_time,
        read_started,
        read_finished,
    };
    let verdict = drift::evaluate(&sample, config.drift_threshold);

    align_timezone(bridge, clock, &device);

    match verdict {
        Verdict::InSync { offset } => {
            tracing::info!(
                serial = %device.serial,
                offset = %drift::format_offset(offset),
                "drift below threshold; leaving host clock alone",
            );
            ProbeOutcome::InSync { device, offset }
        }
        Verdict::Correct { offset } => match clock.set(clock.now() + offset) {
            Ok(()) => {
                tracing::info!(
                    serial = %device.serial,
                    offset = %drift::format_offset(offset),
                    "host clock stepped to device time",
                );
                ProbeOutcome::Corrected { device, offset }
            }
            Err(err) => fail(err.into()),
        },
    }
}

fn fail(reason: ProbeFailure) -> ProbeOutcome {
    ProbeOutcome::Failed { reason }
}

/// Best-effort timezone alignment, independent of the drift verdict.
fn align_timezone<B, C>(bridge: &B, clock: &C, device: &Device)
where
    B: Bridge,
    C: HostClock,
{
    let hint = bridge.timezone_hint(&device.serial);
    if hint.is_empty() {
        return;
    }
    clock.align_timezone(&hint);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
