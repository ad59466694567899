//! The tally vote ledger.
//!
//! Turns a raw vote action into a mutated vote set on the target answer, a
//! reputation delta for the answer's poster, a pool consumption for the
//! voter, and a lifetime counter update — tolerating re-votes, switches, and
//! retractions without double-counting.

pub mod error;
pub mod ledger;
pub mod reputation;
pub mod vote;

pub use error::LedgerError;
pub use ledger::{AcceptOutcome, AcceptReceipt, VoteLedger, VoteReceipt};
pub use reputation::{pool_capacity, total_reputation};
pub use vote::{transition, VoteOutcome, VoteTransition};
