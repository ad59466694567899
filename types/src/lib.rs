//! Fundamental types for the tally reputation ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: platform identifiers, timestamps, vote enums, the daily vote
//! pool, and tunable ledger parameters.

pub mod ids;
pub mod params;
pub mod pool;
pub mod time;
pub mod vote;

pub use ids::{ChannelId, GuildId, MessageId, UserId};
pub use params::LedgerParams;
pub use pool::{LifetimeCounters, PoolCapacity, VotePool};
pub use time::Timestamp;
pub use vote::{VoteDirection, VoteState};
