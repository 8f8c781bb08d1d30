//! `toadb list` — numbered device table.
//!
//! This command never fails: a missing bridge or unreadable store still
//! prints a diagnostic and exits 0, so scripts can call it unconditionally.

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use toadb_bridge::{AdbBridge, Bridge};
use toadb_core::{
    config::SyncConfig,
    store::{FileStore, SelectionStore},
    types::{Device, Selection},
};

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "serial")]
    serial: String,
    #[tabled(rename = "transport")]
    transport: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "selected")]
    selected: String,
}

pub fn run() -> Result<()> {
    let bridge = AdbBridge::new();
    bridge.ensure_server();

    if let Some(address) = connect_address().as_deref() {
        if let Err(err) = bridge.connect(address) {
            eprintln!("{} {err}", "warning:".yellow().bold());
        }
    }

    let devices = match bridge.list_devices() {
        Ok(devices) => devices,
        Err(err) => {
            println!("Cannot list devices: {err}");
            return Ok(());
        }
    };
    if devices.is_empty() {
        println!("No devices attached.");
        return Ok(());
    }

    let selection = load_selection();
    print_table(&devices, selection.as_ref());
    Ok(())
}

/// Cadence settings do not matter here, but a bad value should still be
/// visible rather than swallowed.
fn connect_address() -> Option<String> {
    match SyncConfig::from_env() {
        Ok(config) => config.connect_address,
        Err(err) => {
            eprintln!("{} {err}", "warning:".yellow().bold());
            None
        }
    }
}

fn load_selection() -> Option<Selection> {
    let store = match FileStore::open_default() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{} selection store unavailable: {err}", "warning:".yellow().bold());
            return None;
        }
    };
    match store.load() {
        Ok(selection) => selection,
        Err(err) => {
            eprintln!(
                "{} saved selection is unreadable: {err}; run `toadb reset` to discard it",
                "warning:".yellow().bold()
            );
            None
        }
    }
}

fn print_table(devices: &[Device], selection: Option<&Selection>) {
    println!("{}", format!("Attached devices ({})", devices.len()).bold());

    let rows: Vec<DeviceRow> = devices
        .iter()
        .enumerate()
        .map(|(index, device)| DeviceRow {
            number: index + 1,
            serial: device.serial.to_string(),
            transport: device.transport.to_string(),
            state: device.state.to_string(),
            selected: match selection {
                Some(selection) if selection.matches(device) => "*".to_string(),
                _ => String::new(),
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    match selection {
        Some(selection) if !devices.iter().any(|device| selection.matches(device)) => {
            println!(
                "{}",
                format!("Saved selection {} is not attached.", selection.serial).yellow()
            );
        }
        Some(_) => {}
        None => println!("Select with: toadb device N"),
    }
}
