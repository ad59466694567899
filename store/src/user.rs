//! User storage trait and record.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_types::{ChannelId, GuildId, LifetimeCounters, UserId, VotePool};

/// Per-(guild, user) reputation state.
///
/// Created lazily on first need: first vote cast, first vote received, or
/// first accepted answer. Channel reputation is a signed integer — downvote
/// churn can drive it below zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    /// Accumulated reputation per eligible channel.
    pub reputation: BTreeMap<ChannelId, i64>,
    /// Remaining votes for the current day.
    pub pool: VotePool,
    /// Cumulative votes cast, never reset.
    pub lifetime: LifetimeCounters,
    /// How many of this user's answers have been accepted.
    pub accepted_answers: u32,
}

impl UserRecord {
    /// A fresh record with the zero-reputation pool {5, 3}.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            reputation: BTreeMap::new(),
            pool: VotePool::new(5, 3),
            lifetime: LifetimeCounters::default(),
            accepted_answers: 0,
        }
    }

    /// Reputation in one channel (zero when no row exists yet).
    pub fn reputation_in(&self, channel: &ChannelId) -> i64 {
        self.reputation.get(channel).copied().unwrap_or(0)
    }

    /// Apply a signed reputation delta to one channel.
    pub fn add_reputation(&mut self, channel: &ChannelId, delta: i64) {
        *self.reputation.entry(channel.clone()).or_insert(0) += delta;
    }
}

/// Trait for user record storage.
pub trait UserStore {
    /// Fetch an existing record. `NotFound` is normal for users who have
    /// never interacted — callers decide whether to lazily create.
    fn get_user(&self, guild: &GuildId, user: &UserId) -> Result<UserRecord, StoreError>;

    /// Atomic read-modify-write per (guild, user). Creates a default record
    /// when none exists, applies `mutate`, persists, and returns the stored
    /// result.
    fn upsert_user(
        &self,
        guild: &GuildId,
        user: &UserId,
        mutate: &mut dyn FnMut(&mut UserRecord),
    ) -> Result<UserRecord, StoreError>;

    /// All user records in a guild, for the daily sweep.
    fn list_users(&self, guild: &GuildId) -> Result<Vec<UserRecord>, StoreError>;

    /// Remove a user record (explicit admin action).
    fn delete_user(&self, guild: &GuildId, user: &UserId) -> Result<(), StoreError>;
}
