//! Toadb core library — domain types, configuration, selection persistence.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`config`] — environment-driven [`SyncConfig`]
//! - [`store`] — persisted [`Selection`] with atomic writes
//! - [`error`] — [`StoreError`]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{ConfigError, SyncConfig};
pub use error::StoreError;
pub use store::{FileStore, MemoryStore, SelectionStore};
pub use types::{Device, DeviceSerial, DeviceState, RunPhase, Selection, TimezoneHint, Transport};
