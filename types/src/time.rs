//! Timestamp type used throughout the ledger.
//!
//! Timestamps are Unix epoch seconds (UTC). The daily pool reset boundary is
//! aligned to UTC midnight, so all boundary math lives here next to the type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one day. The pool reset interval.
pub const DAY_SECS: u64 = 24 * 60 * 60;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// The next UTC-midnight-aligned day boundary strictly after this instant.
    ///
    /// An instant exactly on a boundary yields the *following* boundary, so a
    /// sweep that runs at the boundary schedules itself a full day ahead.
    pub fn next_day_boundary(&self) -> Timestamp {
        Timestamp((self.0 / DAY_SECS + 1) * DAY_SECS)
    }

    /// Seconds remaining until the next day boundary.
    pub fn secs_until_day_boundary(&self) -> u64 {
        self.next_day_boundary().0 - self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
