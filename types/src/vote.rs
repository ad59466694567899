//! Vote enums — the direction of an incoming intent and the derived
//! per-(answer, voter) state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a vote action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDirection {
    Up,
    Down,
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "upvote"),
            Self::Down => write!(f, "downvote"),
        }
    }
}

/// A voter's current standing on one answer, derived from set membership in
/// the answer record — never stored separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteState {
    /// Voter is in neither vote set.
    NoVote,
    /// Voter holds an active upvote.
    Upvoted,
    /// Voter holds an active downvote.
    Downvoted,
}

impl VoteState {
    /// Whether the voter currently holds a vote in `direction`.
    pub fn holds(&self, direction: VoteDirection) -> bool {
        matches!(
            (self, direction),
            (Self::Upvoted, VoteDirection::Up) | (Self::Downvoted, VoteDirection::Down)
        )
    }
}
