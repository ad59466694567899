//! Answer storage trait and record.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tally_types::{ChannelId, GuildId, MessageId, UserId, VoteState};

/// One converted answer message and its live vote sets.
///
/// Invariant: `upvoters` and `downvoters` are disjoint — a voter holds at
/// most one active vote on an answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The answer message id — the unique key.
    pub answer_id: MessageId,
    /// Who posted the answer. Receives the reputation deltas.
    pub poster: UserId,
    /// The channel the answer's thread lives under; reputation is scoped
    /// to it.
    pub channel: ChannelId,
    /// Voters with an active upvote.
    pub upvoters: BTreeSet<UserId>,
    /// Voters with an active downvote.
    pub downvoters: BTreeSet<UserId>,
    /// Set once when the question author accepts this answer.
    pub accepted: bool,
}

impl AnswerRecord {
    pub fn new(answer_id: MessageId, poster: UserId, channel: ChannelId) -> Self {
        Self {
            answer_id,
            poster,
            channel,
            upvoters: BTreeSet::new(),
            downvoters: BTreeSet::new(),
            accepted: false,
        }
    }

    /// Derive a voter's standing from set membership.
    pub fn vote_state(&self, voter: &UserId) -> VoteState {
        if self.upvoters.contains(voter) {
            VoteState::Upvoted
        } else if self.downvoters.contains(voter) {
            VoteState::Downvoted
        } else {
            VoteState::NoVote
        }
    }

    /// Current tally: (upvotes, downvotes).
    pub fn counts(&self) -> (usize, usize) {
        (self.upvoters.len(), self.downvoters.len())
    }
}

/// Trait for answer record storage.
pub trait AnswerStore {
    fn get_answer(&self, guild: &GuildId, answer: &MessageId) -> Result<AnswerRecord, StoreError>;

    /// Create a new answer record. `Duplicate` when one already exists.
    fn put_answer(&self, guild: &GuildId, record: &AnswerRecord) -> Result<(), StoreError>;

    /// Atomic read-modify-write per answer. `NotFound` when the answer was
    /// never converted — voting does not lazily create answers.
    fn update_answer(
        &self,
        guild: &GuildId,
        answer: &MessageId,
        mutate: &mut dyn FnMut(&mut AnswerRecord),
    ) -> Result<AnswerRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::VoteState;

    fn record() -> AnswerRecord {
        AnswerRecord::new(
            MessageId::new("900"),
            UserId::new("poster"),
            ChannelId::new("dev-help"),
        )
    }

    #[test]
    fn vote_state_derived_from_membership() {
        let mut answer = record();
        let voter = UserId::new("alice");
        assert_eq!(answer.vote_state(&voter), VoteState::NoVote);

        answer.upvoters.insert(voter.clone());
        assert_eq!(answer.vote_state(&voter), VoteState::Upvoted);

        answer.upvoters.remove(&voter);
        answer.downvoters.insert(voter.clone());
        assert_eq!(answer.vote_state(&voter), VoteState::Downvoted);
    }

    #[test]
    fn counts_reflect_both_sets() {
        let mut answer = record();
        answer.upvoters.insert(UserId::new("a"));
        answer.upvoters.insert(UserId::new("b"));
        answer.downvoters.insert(UserId::new("c"));
        assert_eq!(answer.counts(), (2, 1));
    }
}
