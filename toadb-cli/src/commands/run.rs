//! `toadb` (bare), `toadb oneshot`, `toadb resync` — the sync loop entry
//! points. All three share one wiring path and differ only in run mode and
//! how the outcome maps to an exit code.

use anyhow::{bail, Context, Result};

use toadb_bridge::AdbBridge;
use toadb_clock::SystemClock;
use toadb_core::{config::SyncConfig, store::FileStore};
use toadb_sync::scheduler::{self, RunMode, RunOutcome};

/// Foreground daemon. Exits 0 whether the loop ends by signal or by the
/// startup window lapsing with nothing to sync; a supervisor with restart
/// disabled must not see the latter as a crash.
pub fn daemon() -> Result<()> {
    start(RunMode::Daemon)?;
    Ok(())
}

/// Single windowed sync attempt. A window that lapses without success is
/// still exit 0.
pub fn oneshot() -> Result<()> {
    start(RunMode::Oneshot)?;
    Ok(())
}

/// Like `oneshot`, but an unsynced window is a hard failure.
pub fn resync() -> Result<()> {
    match start(RunMode::Oneshot)? {
        RunOutcome::Synced => Ok(()),
        RunOutcome::WindowElapsed => bail!("no device synced within the startup window"),
        RunOutcome::Stopped => bail!("interrupted before any device synced"),
    }
}

fn start(mode: RunMode) -> Result<RunOutcome> {
    let config = SyncConfig::from_env().context("invalid configuration")?;
    let store = FileStore::open_default().context("cannot locate the selection store")?;
    let bridge = AdbBridge::new();
    let clock = SystemClock;

    scheduler::start_blocking(mode, &bridge, &clock, &store, &config)
        .context("failed to start the sync runtime")
}
