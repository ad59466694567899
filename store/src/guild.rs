//! Guild storage trait and record.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tally_types::{ChannelId, GuildId};

/// Per-guild configuration stored by the ledger.
///
/// Answer records are keyed separately (see [`crate::AnswerStore`]) so that
/// per-answer mutation does not contend on the guild record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuildRecord {
    pub guild_id: GuildId,
    /// Channels eligible for reputation. Votes and answers outside these
    /// channels are rejected.
    pub valid_channels: Vec<ChannelId>,
    /// Where moderation reports are posted, when configured.
    pub report_channel: Option<ChannelId>,
}

impl GuildRecord {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            valid_channels: Vec::new(),
            report_channel: None,
        }
    }

    /// Whether `channel` may carry reputation.
    pub fn is_valid_channel(&self, channel: &ChannelId) -> bool {
        self.valid_channels.contains(channel)
    }
}

/// Trait for guild record storage.
pub trait GuildStore {
    fn get_guild(&self, guild: &GuildId) -> Result<GuildRecord, StoreError>;
    fn put_guild(&self, record: &GuildRecord) -> Result<(), StoreError>;
    fn guild_exists(&self, guild: &GuildId) -> Result<bool, StoreError>;
    /// Remove a guild and everything keyed under it (explicit admin action
    /// or guild departure).
    fn delete_guild(&self, guild: &GuildId) -> Result<(), StoreError>;
    /// All known guild ids, for the daily sweep.
    fn list_guilds(&self) -> Result<Vec<GuildId>, StoreError>;
}
