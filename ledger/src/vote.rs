//! The vote state machine.
//!
//! Pure and stateless: given a voter's current standing on an answer and an
//! incoming intent, produce the next standing plus every delta the ledger
//! must apply. The transition is total — every (state, intent) pair has
//! exactly one outcome.

use tally_types::{VoteDirection, VoteState};

/// What a vote action did, for user-facing messaging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// A new vote was cast from a clean slate.
    Cast,
    /// An existing vote in the same direction was retracted.
    Retracted,
    /// An opposite vote was replaced.
    Switched,
}

/// The full effect of one vote intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteTransition {
    pub next: VoteState,
    pub outcome: VoteOutcome,
    /// Applied to the poster's channel-scoped reputation.
    pub rep_delta: i64,
    /// Applied to the voter's lifetime upvote counter.
    pub lifetime_up: i32,
    /// Applied to the voter's lifetime downvote counter.
    pub lifetime_down: i32,
    /// Whether one unit of the intent direction's pool is spent. True
    /// exactly when the transition *adds* that direction; retraction always
    /// returns capacity rather than spending it.
    pub consumes_pool: bool,
}

impl VoteTransition {
    /// Short human-readable status, e.g. "switched to downvote".
    pub fn status(&self, direction: VoteDirection) -> String {
        match self.outcome {
            VoteOutcome::Cast => format!("{direction}d"),
            VoteOutcome::Retracted => format!("removed {direction}"),
            VoteOutcome::Switched => format!("switched to {direction}"),
        }
    }
}

/// The transition table.
///
/// | current    | intent Up                 | intent Down                |
/// |------------|---------------------------|----------------------------|
/// | NoVote     | Upvoted, rep +1, up +1    | Downvoted, rep -1, down +1 |
/// | Upvoted    | NoVote, rep -1, up -1     | Downvoted, rep -2, up -1 down +1 |
/// | Downvoted  | Upvoted, rep +2, up +1 down -1 | NoVote, rep +1, down -1 |
pub fn transition(current: VoteState, intent: VoteDirection) -> VoteTransition {
    use VoteDirection::{Down, Up};
    use VoteState::{Downvoted, NoVote, Upvoted};

    match (current, intent) {
        (NoVote, Up) => VoteTransition {
            next: Upvoted,
            outcome: VoteOutcome::Cast,
            rep_delta: 1,
            lifetime_up: 1,
            lifetime_down: 0,
            consumes_pool: true,
        },
        (NoVote, Down) => VoteTransition {
            next: Downvoted,
            outcome: VoteOutcome::Cast,
            rep_delta: -1,
            lifetime_up: 0,
            lifetime_down: 1,
            consumes_pool: true,
        },
        (Upvoted, Up) => VoteTransition {
            next: NoVote,
            outcome: VoteOutcome::Retracted,
            rep_delta: -1,
            lifetime_up: -1,
            lifetime_down: 0,
            consumes_pool: false,
        },
        (Upvoted, Down) => VoteTransition {
            next: Downvoted,
            outcome: VoteOutcome::Switched,
            rep_delta: -2,
            lifetime_up: -1,
            lifetime_down: 1,
            consumes_pool: true,
        },
        (Downvoted, Up) => VoteTransition {
            next: Upvoted,
            outcome: VoteOutcome::Switched,
            rep_delta: 2,
            lifetime_up: 1,
            lifetime_down: -1,
            consumes_pool: true,
        },
        (Downvoted, Down) => VoteTransition {
            next: NoVote,
            outcome: VoteOutcome::Retracted,
            rep_delta: 1,
            lifetime_up: 0,
            lifetime_down: -1,
            consumes_pool: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteDirection::{Down, Up};
    use VoteState::{Downvoted, NoVote, Upvoted};

    #[test]
    fn fresh_upvote() {
        let t = transition(NoVote, Up);
        assert_eq!(t.next, Upvoted);
        assert_eq!(t.outcome, VoteOutcome::Cast);
        assert_eq!(t.rep_delta, 1);
        assert_eq!((t.lifetime_up, t.lifetime_down), (1, 0));
        assert!(t.consumes_pool);
    }

    #[test]
    fn retract_upvote_never_consumes_pool() {
        let t = transition(Upvoted, Up);
        assert_eq!(t.next, NoVote);
        assert_eq!(t.outcome, VoteOutcome::Retracted);
        assert_eq!(t.rep_delta, -1);
        assert_eq!((t.lifetime_up, t.lifetime_down), (-1, 0));
        assert!(!t.consumes_pool);
    }

    #[test]
    fn switch_up_to_down_is_minus_two() {
        let t = transition(Upvoted, Down);
        assert_eq!(t.next, Downvoted);
        assert_eq!(t.outcome, VoteOutcome::Switched);
        assert_eq!(t.rep_delta, -2);
        assert_eq!((t.lifetime_up, t.lifetime_down), (-1, 1));
        assert!(t.consumes_pool);
    }

    #[test]
    fn switch_down_to_up_is_plus_two() {
        let t = transition(Downvoted, Up);
        assert_eq!(t.next, Upvoted);
        assert_eq!(t.rep_delta, 2);
        assert_eq!((t.lifetime_up, t.lifetime_down), (1, -1));
        assert!(t.consumes_pool);
    }

    #[test]
    fn retract_downvote_restores_rep() {
        let t = transition(Downvoted, Down);
        assert_eq!(t.next, NoVote);
        assert_eq!(t.rep_delta, 1);
        assert!(!t.consumes_pool);
    }

    #[test]
    fn double_toggle_nets_to_zero() {
        let first = transition(NoVote, Up);
        let second = transition(first.next, Up);
        assert_eq!(second.next, NoVote);
        assert_eq!(first.rep_delta + second.rep_delta, 0);
        assert_eq!(first.lifetime_up + second.lifetime_up, 0);
        // Pool is spent on the first call only.
        assert!(first.consumes_pool && !second.consumes_pool);
    }

    #[test]
    fn status_strings() {
        assert_eq!(transition(NoVote, Up).status(Up), "upvoted");
        assert_eq!(transition(Upvoted, Up).status(Up), "removed upvote");
        assert_eq!(transition(Upvoted, Down).status(Down), "switched to downvote");
        assert_eq!(transition(Downvoted, Down).status(Down), "removed downvote");
    }
}
