//! The discovery/refresh loop.
//!
//! The loop has two phases:
//!
//! - `Discovering` — no successful sync yet. Probes run every
//!   `discovery_interval`; once `startup_window` has elapsed without a
//!   success the loop gives up quietly until the next boot.
//! - `Synced` — at least one sync succeeded. Probes run every
//!   `refresh_interval` with no window limit, and failures never demote the
//!   loop back to `Discovering`.
//!
//! The window is checked at the top of each iteration, before the probe, so
//! a run with `discovery_interval = 5` and `startup_window = 900` performs
//! exactly 180 probes.

use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};
use toadb_bridge::Bridge;
use toadb_clock::HostClock;
use toadb_core::{
    config::SyncConfig,
    store::SelectionStore,
    types::{DeviceSerial, RunPhase},
};

use crate::probe::{self, ProbeOutcome};

/// Whether the loop services one success or keeps refreshing forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run until shutdown; refresh after the first success.
    Daemon,
    /// Exit after the first success.
    Oneshot,
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Oneshot mode: a sync succeeded.
    Synced,
    /// The startup window elapsed with no success.
    WindowElapsed,
    /// A shutdown signal arrived.
    Stopped,
}

/// Drives probes until an outcome is reached.
///
/// Probes run inline on this task; the shutdown signal is honored at the
/// sleep between probes.
pub async fn run<B, C, S>(
    mode: RunMode,
    bridge: &B,
    clock: &C,
    store: &S,
    config: &SyncConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> RunOutcome
where
    B: Bridge,
    C: HostClock,
    S: SelectionStore,
{
    tracing::info!(
        discovery_interval_s = config.discovery_interval.as_secs(),
        startup_window_s = config.startup_window.as_secs(),
        refresh_interval_s = config.refresh_interval.as_secs(),
        drift_threshold_s = config.drift_threshold.as_secs(),
        mode = ?mode,
        "sync loop starting",
    );
    bridge.ensure_server();

    let started = Instant::now();
    let mut phase = RunPhase::Discovering;
    let mut watching: Option<DeviceSerial> = None;

    loop {
        if phase == RunPhase::Discovering && started.elapsed() >= config.startup_window {
            tracing::info!("no successful sync within the startup window; exiting until next boot");
            return RunOutcome::WindowElapsed;
        }

        let attempt = probe::run_probe(bridge, clock, store, config);
        note_watched_device(bridge, &attempt, &mut watching);

        match &attempt.outcome {
            ProbeOutcome::Corrected { .. } | ProbeOutcome::InSync { .. } => {
                if mode == RunMode::Oneshot {
                    return RunOutcome::Synced;
                }
                if phase == RunPhase::Discovering {
                    tracing::info!(
                        refresh_interval_s = config.refresh_interval.as_secs(),
                        "first sync done; switching to refresh cadence",
                    );
                    phase = RunPhase::Synced;
                }
            }
            ProbeOutcome::Failed { reason } => match phase {
                RunPhase::Discovering => {
                    tracing::info!(reason = %reason, "probe failed; still discovering");
                }
                RunPhase::Synced => {
                    tracing::warn!(reason = %reason, "probe failed; retrying at refresh cadence");
                }
            },
        }

        let delay = match phase {
            RunPhase::Discovering => config.discovery_interval,
            RunPhase::Synced => config.refresh_interval,
        };
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.recv() => {
                tracing::info!("stop requested; exiting sync loop");
                return RunOutcome::Stopped;
            }
        }
    }
}

/// Builds a single-threaded runtime, installs the signal handler, and runs
/// the loop to completion.
pub fn start_blocking<B, C, S>(
    mode: RunMode,
    bridge: &B,
    clock: &C,
    store: &S,
    config: &SyncConfig,
) -> Result<RunOutcome, std::io::Error>
where
    B: Bridge,
    C: HostClock,
    S: SelectionStore,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(4);
        tokio::spawn(async move {
            wait_for_stop_signal().await;
            tracing::info!("termination signal received; stopping at the next cycle boundary");
            let _ = shutdown_tx.send(());
        });
        run(mode, bridge, clock, store, config, shutdown_rx).await
    });
    Ok(outcome)
}

/// Logs once per device change which device the loop is syncing from.
fn note_watched_device<B: Bridge>(
    bridge: &B,
    attempt: &probe::SyncAttempt,
    watching: &mut Option<DeviceSerial>,
) {
    let Some(device) = attempt.device() else {
        return;
    };
    if watching.as_ref() == Some(&device.serial) {
        return;
    }
    let model = bridge
        .model(&device.serial)
        .unwrap_or_else(|| "unknown model".to_owned());
    tracing::info!(serial = %device.serial, model = %model, transport = %device.transport, "watching device");
    *watching = Some(device.serial.clone());
}

#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
