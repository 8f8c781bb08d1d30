//! `toadb device N` — pin the Nth listed device.
//!
//! N is resolved against a fresh enumeration, and the bridge does not
//! promise a stable order between calls. Run `toadb list` right before
//! selecting.

use anyhow::{bail, Context, Result};
use clap::Args;

use toadb_bridge::{AdbBridge, Bridge};
use toadb_core::{
    config::SyncConfig,
    store::{FileStore, SelectionStore},
    types::Selection,
};

/// Arguments for `toadb device`.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Position in the `toadb list` output, starting at 1.
    pub number: usize,
}

impl DeviceArgs {
    pub fn run(self) -> Result<()> {
        let config = SyncConfig::from_env().context("invalid configuration")?;

        let bridge = AdbBridge::new();
        bridge.ensure_server();
        if let Some(address) = config.connect_address.as_deref() {
            if let Err(err) = bridge.connect(address) {
                tracing::warn!(address, error = %err, "connect failed before listing");
            }
        }

        let devices = bridge.list_devices().context("cannot list devices")?;
        if devices.is_empty() {
            bail!("no devices attached; nothing to select");
        }
        let picked = match self
            .number
            .checked_sub(1)
            .and_then(|index| devices.get(index))
        {
            Some(device) => device,
            None => bail!(
                "device {} is out of range; `toadb list` shows {} device(s)",
                self.number,
                devices.len()
            ),
        };

        let store = FileStore::open_default().context("cannot locate the selection store")?;
        store
            .save(&Selection::for_device(picked))
            .context("failed to save the selection")?;
        println!("Selected device: {}", picked.serial);
        Ok(())
    }
}
