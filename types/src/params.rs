//! Tunable ledger parameters.
//!
//! Every knob of the reputation economy in one struct, so tests and
//! deployments can vary them without touching the ledger code.

use serde::{Deserialize, Serialize};

/// Parameters governing pool capacity, rewards, and write retries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Upvote capacity granted at zero reputation.
    pub base_upvotes: u32,
    /// One extra upvote per this much total reputation.
    pub upvote_rep_divisor: i64,
    /// Upvote capacity ceiling.
    pub max_upvotes: u32,

    /// Downvote capacity granted at zero reputation.
    pub base_downvotes: u32,
    /// One extra downvote per this much total reputation.
    pub downvote_rep_divisor: i64,
    /// Downvote capacity ceiling.
    pub max_downvotes: u32,

    /// One-time reputation awarded when an answer is accepted.
    pub accept_reward: i64,

    /// How many times a write is retried after an optimistic-concurrency
    /// conflict before the operation is surfaced as transient failure.
    pub max_write_retries: u32,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            base_upvotes: 5,
            upvote_rep_divisor: 20,
            max_upvotes: 100,
            base_downvotes: 3,
            downvote_rep_divisor: 5,
            max_downvotes: 10,
            accept_reward: 1,
            max_write_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_economy() {
        let params = LedgerParams::default();
        assert_eq!(params.base_upvotes, 5);
        assert_eq!(params.upvote_rep_divisor, 20);
        assert_eq!(params.max_upvotes, 100);
        assert_eq!(params.base_downvotes, 3);
        assert_eq!(params.downvote_rep_divisor, 5);
        assert_eq!(params.max_downvotes, 10);
    }
}
