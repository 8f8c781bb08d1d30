//! Persisted device selection.
//!
//! # Storage layout
//!
//! ```text
//! <config_dir>/toadb/
//!   selection.json   (mode 0600 — serial plus optional connect address)
//! ```
//!
//! # API pattern
//!
//! [`FileStore::at`] takes an explicit config dir and is what tests use with
//! a `TempDir`; [`FileStore::open_default`] derives the dir from
//! `dirs::config_dir()` and is what the binary uses. Tests must NEVER call
//! `open_default`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::types::Selection;

/// Read/write access to the persisted selection.
///
/// `load` returning `Ok(None)` means "no device has ever been chosen", which
/// is an ordinary state, not an error.
pub trait SelectionStore {
    fn load(&self) -> Result<Option<Selection>, StoreError>;
    fn save(&self, selection: &Selection) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// `<config_dir>/toadb/selection.json` — pure, no I/O.
pub fn selection_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("toadb").join("selection.json")
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// The on-disk store used by the binary.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store rooted at an explicit config dir.
    pub fn at(config_dir: &Path) -> Self {
        Self {
            path: selection_path_at(config_dir),
        }
    }

    /// Store rooted at `dirs::config_dir()` (convenience for the binary).
    pub fn open_default() -> Result<Self, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::ConfigDirNotFound)?;
        Ok(Self::at(&config_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for FileStore {
    fn load(&self) -> Result<Option<Selection>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Atomic save: serialize → `.json.tmp` sibling → `chmod 0600` → `rename`.
    /// The `.tmp` lives in the same directory as the target (same filesystem,
    /// so the rename cannot cross a mount).
    fn save(&self, selection: &Selection) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                set_dir_permissions(dir)?;
            }
        }
        let tmp_path = self.path.with_file_name("selection.json.tmp");
        let json = serde_json::to_string_pretty(selection)?;
        std::fs::write(&tmp_path, json)?;
        set_file_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Removes the selection file. Already-absent is success.
    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Selection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self {
            slot: Mutex::new(Some(selection)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Selection>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SelectionStore for MemoryStore {
    fn load(&self) -> Result<Option<Selection>, StoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, selection: &Selection) -> Result<(), StoreError> {
        *self.slot() = Some(selection.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::types::{Device, DeviceSerial, DeviceState};

    use super::*;

    fn make_config_dir() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn selection() -> Selection {
        Selection::for_device(&Device::new(
            DeviceSerial::from("emulator-5554"),
            DeviceState::Authorized,
        ))
    }

    #[test]
    fn selection_path_is_correct() {
        let dir = make_config_dir();
        let path = selection_path_at(dir.path());
        assert!(path.ends_with("toadb/selection.json"));
    }

    #[test]
    fn load_without_file_is_none() {
        let dir = make_config_dir();
        let store = FileStore::at(dir.path());
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = make_config_dir();
        let store = FileStore::at(dir.path());
        store.save(&selection()).expect("save");
        let loaded = store.load().expect("load").expect("must be present");
        assert_eq!(loaded, selection());
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let dir = make_config_dir();
        let store = FileStore::at(dir.path());
        store.save(&selection()).expect("save");
        let tmp = store.path().with_file_name("selection.json.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = make_config_dir();
        let store = FileStore::at(dir.path());
        store.save(&selection()).expect("save");
        store.clear().expect("first clear");
        store.clear().expect("second clear");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn memory_store_roundtrip_and_clear() {
        let store = MemoryStore::new();
        assert!(store.load().expect("load").is_none());
        store.save(&selection()).expect("save");
        assert_eq!(store.load().expect("load"), Some(selection()));
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn selection_file_mode_is_0600() {
        use std::os::unix::fs::PermissionsExt;
        let dir = make_config_dir();
        let store = FileStore::at(dir.path());
        store.save(&selection()).expect("save");
        let mode = std::fs::metadata(store.path())
            .expect("meta")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}
