//! `toadb reset` — drop the persisted selection. Idempotent, always exit 0.

use anyhow::Result;

use toadb_core::store::{FileStore, SelectionStore};

pub fn run() -> Result<()> {
    let store = match FileStore::open_default() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Nothing to clear: {err}");
            return Ok(());
        }
    };
    match store.clear() {
        Ok(()) => println!("Selection cleared."),
        Err(err) => eprintln!("Could not clear the selection: {err}"),
    }
    Ok(())
}
