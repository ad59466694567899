//! Ledger-specific errors.

use tally_store::StoreError;
use tally_types::{MessageId, VoteDirection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("message {0} is not a valid answer to vote on")]
    AnswerNotFound(MessageId),

    #[error("you may not vote on your own answer")]
    SelfVote,

    #[error("daily {direction} pool is empty")]
    PoolExhausted { direction: VoteDirection },

    #[error("message {0} has already been converted to an answer")]
    AlreadyConverted(MessageId),

    #[error("channel {0} is not eligible for reputation")]
    ChannelNotEligible(tally_types::ChannelId),

    #[error("answer {0} is no longer valid")]
    PosterMismatch(MessageId),

    #[error("write conflict persisted after {retries} retries")]
    ContentionExhausted { retries: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
