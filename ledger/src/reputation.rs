//! Reputation aggregation — pure functions, no store access.

use tally_store::UserRecord;
use tally_types::{LedgerParams, PoolCapacity};

/// Sum of a user's reputation across all channels in the guild.
pub fn total_reputation(user: &UserRecord) -> i64 {
    user.reputation.values().sum()
}

/// Derive the daily pool capacity from total reputation.
///
/// Both components are monotone non-decreasing step functions:
///
/// - upvotes   = min(5 + total/20, 100)   → caps at 2000 reputation
/// - downvotes = min(3 + total/5, 10)     → caps at 35 reputation
///
/// Division floors toward negative infinity and the result clamps at zero,
/// so a negative total yields a reduced but valid pool.
pub fn pool_capacity(total_rep: i64, params: &LedgerParams) -> PoolCapacity {
    PoolCapacity {
        upvotes: step(
            params.base_upvotes,
            total_rep,
            params.upvote_rep_divisor,
            params.max_upvotes,
        ),
        downvotes: step(
            params.base_downvotes,
            total_rep,
            params.downvote_rep_divisor,
            params.max_downvotes,
        ),
    }
}

fn step(base: u32, total_rep: i64, divisor: i64, max: u32) -> u32 {
    let raw = base as i64 + total_rep.div_euclid(divisor);
    raw.clamp(0, max as i64) as u32
}
