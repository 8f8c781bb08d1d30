//! Toadb sync engine — device selection, drift evaluation, and the
//! discovery/refresh loop.
//!
//! Public API surface:
//! - [`selector`] — [`choose`] over an enumeration snapshot
//! - [`drift`] — offset math and the correction threshold
//! - [`probe`] — [`run_probe`], one full cycle
//! - [`scheduler`] — [`scheduler::run`] / [`scheduler::start_blocking`]

pub mod drift;
mod error;
pub mod probe;
pub mod scheduler;
pub mod selector;

pub use error::ProbeFailure;
pub use probe::{run_probe, ProbeOutcome, SyncAttempt};
pub use scheduler::{RunMode, RunOutcome};
pub use selector::{choose, Indeterminate, Pick};
