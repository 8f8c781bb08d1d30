//! Selection-store error-message and atomic-write-safety integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use std::fs;
use toadb_core::{
    store::{self, FileStore, SelectionStore},
    types::{Device, DeviceSerial, DeviceState, Selection},
    StoreError,
};

fn selection() -> Selection {
    Selection::for_device(&Device::new(
        DeviceSerial::from("emulator-5554"),
        DeviceState::Authorized,
    ))
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_json_returns_parse_error_with_path() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    let dir = config_dir.path().join("toadb");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("selection.json"), b"{ \"serial\": [unclosed").expect("write");

    let err = FileStore::at(config_dir.path()).load().unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("selection.json"), "must contain file path, got: {msg}");
    let source_msg = match &err {
        StoreError::Parse { source, .. } => source.to_string(),
        _ => unreachable!(),
    };
    assert!(!source_msg.is_empty(), "serde_json must provide error context");
}

#[test]
fn load_wrong_type_json_returns_parse_error() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    let dir = config_dir.path().join("toadb");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("selection.json"), b"[\"a list, not an object\"]\n").expect("write");

    let err = FileStore::at(config_dir.path()).load().unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_creates_file_at_expected_path() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    FileStore::at(config_dir.path())
        .save(&selection())
        .expect("save");
    config_dir
        .child("toadb/selection.json")
        .assert(predicate::path::exists());
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    let store = FileStore::at(config_dir.path());
    store.save(&selection()).expect("save");

    let path = store::selection_path_at(config_dir.path());
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("selection.json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let current_bytes = fs::read(&path).expect("read after crash");
    assert_eq!(original_bytes, current_bytes, "original must be unchanged after crash");
    assert!(tmp.exists(), ".tmp orphan must exist (crash = no cleanup)");

    // The next load still sees the last complete selection
    let loaded = store.load().expect("load").expect("present");
    assert_eq!(loaded, selection());
}

#[test]
fn save_overwrites_previous_selection() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    let store = FileStore::at(config_dir.path());
    store.save(&selection()).expect("first save");

    let network = Selection::for_device(&Device::new(
        DeviceSerial::from("192.168.1.7:5555"),
        DeviceState::Authorized,
    ));
    store.save(&network).expect("second save");

    let loaded = store.load().expect("load").expect("present");
    assert_eq!(loaded, network);
    assert_eq!(loaded.address.as_deref(), Some("192.168.1.7:5555"));
}

// ---------------------------------------------------------------------------
// 3. Clear
// ---------------------------------------------------------------------------

#[test]
fn clear_removes_file_and_subsequent_load_is_none() {
    let config_dir = assert_fs::TempDir::new().expect("tempdir");
    let store = FileStore::at(config_dir.path());
    store.save(&selection()).expect("save");
    store.clear().expect("clear");

    config_dir
        .child("toadb/selection.json")
        .assert(predicate::path::missing());
    assert!(store.load().expect("load").is_none());
}
