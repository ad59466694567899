//! Abstract storage traits for the tally reputation ledger.
//!
//! Every storage backend (a document store in production, in-memory for
//! testing) implements these traits. The ledger and scheduler depend only on
//! the traits, never on a concrete engine.
//!
//! Atomicity contract: `upsert_user` and `update_answer` apply their mutator
//! as a single read-modify-write unit per record. A guild's answer record and
//! a user record are *separate* atomic units — callers that touch both must
//! derive their deltas from current stored state so a retry after a partial
//! failure cannot double-count.

pub mod answer;
pub mod error;
pub mod guild;
pub mod meta;
pub mod user;

pub use answer::{AnswerRecord, AnswerStore};
pub use error::StoreError;
pub use guild::{GuildRecord, GuildStore};
pub use meta::MetaStore;
pub use user::{UserRecord, UserStore};

/// The full storage surface the ledger and scheduler operate against.
pub trait ReputationStore: GuildStore + UserStore + AnswerStore + MetaStore {}

impl<S: GuildStore + UserStore + AnswerStore + MetaStore> ReputationStore for S {}
