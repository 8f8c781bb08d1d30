//! Host clock capability — reading, stepping, and timezone alignment.
//!
//! [`HostClock`] is the seam the sync engine drives; [`SystemClock`] is the
//! real implementation backed by `date` and `timedatectl`.

mod error;
pub mod system;
pub mod timezone;

pub use error::ClockError;
pub use system::SystemClock;

use chrono::{DateTime, Utc};
use toadb_core::types::TimezoneHint;

/// Read and mutate the host wall clock.
pub trait HostClock {
    /// Current host time.
    fn now(&self) -> DateTime<Utc>;

    /// Steps the host clock to `to`.
    fn set(&self, to: DateTime<Utc>) -> Result<(), ClockError>;

    /// Aligns the host timezone to a device-reported hint. Best-effort;
    /// returns whether the zone actually changed.
    fn align_timezone(&self, hint: &TimezoneHint) -> bool {
        let _ = hint;
        false
    }
}
