//! The daily vote pool and lifetime counters.

use crate::vote::VoteDirection;
use serde::{Deserialize, Serialize};

/// A user's remaining votes for the current day.
///
/// Non-increasing between resets: votes are only spent (or refunded when a
/// reservation goes unused), never topped up, until the scheduler overwrites
/// the pool with a fresh capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePool {
    pub upvotes: u32,
    pub downvotes: u32,
}

impl VotePool {
    pub fn new(upvotes: u32, downvotes: u32) -> Self {
        Self { upvotes, downvotes }
    }

    /// Remaining votes in one direction.
    pub fn remaining(&self, direction: VoteDirection) -> u32 {
        match direction {
            VoteDirection::Up => self.upvotes,
            VoteDirection::Down => self.downvotes,
        }
    }

    /// Spend one vote in `direction`. Returns `false` when already empty.
    pub fn consume(&mut self, direction: VoteDirection) -> bool {
        let slot = match direction {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Return one vote spent in `direction`, undoing an unused reservation.
    pub fn refund(&mut self, direction: VoteDirection) {
        let slot = match direction {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        };
        *slot = slot.saturating_add(1);
    }
}

/// The pool size granted at a daily reset, derived from total reputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCapacity {
    pub upvotes: u32,
    pub downvotes: u32,
}

impl From<PoolCapacity> for VotePool {
    fn from(capacity: PoolCapacity) -> Self {
        Self {
            upvotes: capacity.upvotes,
            downvotes: capacity.downvotes,
        }
    }
}

/// Cumulative, never-reset counts of votes a user has cast.
///
/// Retracting or switching a vote decrements the counter for the removed
/// direction, so the counters track votes *currently standing plus history of
/// net casts*, mirroring the ledger's transition table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeCounters {
    pub upvotes_cast: u64,
    pub downvotes_cast: u64,
}

impl LifetimeCounters {
    /// Apply signed deltas from a vote transition. Saturates at zero.
    pub fn apply(&mut self, up_delta: i32, down_delta: i32) {
        self.upvotes_cast = add_signed(self.upvotes_cast, up_delta);
        self.downvotes_cast = add_signed(self.downvotes_cast, down_delta);
    }
}

fn add_signed(value: u64, delta: i32) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_decrements_until_empty() {
        let mut pool = VotePool::new(2, 0);
        assert!(pool.consume(VoteDirection::Up));
        assert!(pool.consume(VoteDirection::Up));
        assert!(!pool.consume(VoteDirection::Up));
        assert_eq!(pool.upvotes, 0);
        assert!(!pool.consume(VoteDirection::Down));
    }

    #[test]
    fn refund_undoes_consume() {
        let mut pool = VotePool::new(1, 0);
        assert!(pool.consume(VoteDirection::Up));
        pool.refund(VoteDirection::Up);
        assert_eq!(pool.upvotes, 1);
    }

    #[test]
    fn remaining_by_direction() {
        let pool = VotePool::new(5, 3);
        assert_eq!(pool.remaining(VoteDirection::Up), 5);
        assert_eq!(pool.remaining(VoteDirection::Down), 3);
    }

    #[test]
    fn lifetime_apply_saturates_at_zero() {
        let mut counters = LifetimeCounters::default();
        counters.apply(1, 0);
        counters.apply(-1, 1);
        assert_eq!(counters.upvotes_cast, 0);
        assert_eq!(counters.downvotes_cast, 1);
        counters.apply(-5, -5);
        assert_eq!(counters.upvotes_cast, 0);
        assert_eq!(counters.downvotes_cast, 0);
    }
}
