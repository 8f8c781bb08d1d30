//! toadb — keep the host clock in step with an Android device's clock.
//!
//! # Usage
//!
//! ```text
//! toadb              # foreground daemon: discover, sync, refresh
//! toadb oneshot      # one windowed sync attempt, then exit
//! toadb resync       # force a sync now; nonzero if nothing syncs
//! toadb list         # numbered table of attached devices
//! toadb device <N>   # pin the Nth listed device
//! toadb reset        # clear the pinned device
//! ```

mod commands;

use std::fs::{File, OpenOptions};

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::device::DeviceArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "toadb",
    version,
    about = "Sync the host clock from an Android device over adb",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one windowed sync attempt and exit.
    Oneshot,

    /// Force a sync now; fail if nothing syncs within the startup window.
    Resync,

    /// Show attached devices, numbered.
    List,

    /// Pin the Nth listed device for all future syncs.
    Device(DeviceArgs),

    /// Clear the pinned device.
    Reset,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        None => commands::run::daemon(),
        Some(Commands::Oneshot) => commands::run::oneshot(),
        Some(Commands::Resync) => commands::run::resync(),
        Some(Commands::List) => commands::list::run(),
        Some(Commands::Device(args)) => args.run(),
        Some(Commands::Reset) => commands::reset::run(),
    }
}

/// Log to stderr by default; `LOG_FILE` redirects to an append-only file,
/// which is how the boot-time service keeps its history across runs.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = std::env::var("LOG_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty());

    match log_file.and_then(|path| open_log_file(&path)) {
        Some(file) => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

fn open_log_file(path: &str) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("cannot append to LOG_FILE {path}: {err}; logging to stderr");
            None
        }
    }
}
