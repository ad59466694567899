//! Daily vote-pool reset.
//!
//! Once per day, at the UTC midnight boundary, every user's pool is
//! overwritten with the capacity derived from their total reputation. The
//! sweep is driven by an explicit async loop rather than a self-rearming
//! timer, and the last completed reset is persisted so a restart that missed
//! a boundary catches up immediately instead of silently skipping a day.

pub mod error;
pub mod format;
pub mod scheduler;

pub use error::SchedulerError;
pub use format::pretty_time_remaining;
pub use scheduler::{PoolScheduler, SweepReport};
