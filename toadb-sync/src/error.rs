//! Error types for toadb-sync.

use thiserror::Error;
use toadb_bridge::BridgeError;
use toadb_clock::ClockError;
use toadb_core::StoreError;

use crate::selector::Indeterminate;

/// Why one probe cycle produced no sync.
///
/// Failures are folded into the probe outcome at the cycle boundary; none of
/// them ever crashes the loop.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    #[error("{0}")]
    NoDeterminateDevice(Indeterminate),

    #[error("host clock: {0}")]
    Clock(#[from] ClockError),

    #[error("selection store: {0}")]
    Store(#[from] StoreError),
}
