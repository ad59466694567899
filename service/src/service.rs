//! The caller-facing reputation service.
//!
//! Wraps the ledger and scheduler behind the operations the chat-gateway
//! layer invokes. Domain outcomes (self-vote, empty pool, unknown answer)
//! become short user-facing replies; storage and contention failures are
//! surfaced as errors for the caller to log and report.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use std::sync::Arc;
use std::time::Duration;
use tally_ledger::{LedgerError, VoteLedger};
use tally_scheduler::{pretty_time_remaining, PoolScheduler, SweepReport};
use tally_store::{GuildRecord, ReputationStore, StoreError, UserRecord};
use tally_types::{ChannelId, GuildId, MessageId, PoolCapacity, Timestamp, UserId, VoteDirection};
use tokio::sync::watch;
use tracing::info;

/// What the gateway shows the user after a vote-shaped action.
#[derive(Clone, Debug)]
pub struct VoteReply {
    /// False when the action was rejected (with `message` explaining why).
    pub ok: bool,
    pub message: String,
    /// Current tally, for re-rendering the answer's footer.
    pub upvotes: usize,
    pub downvotes: usize,
}

/// A user's reputation summary, for stats commands.
#[derive(Clone, Debug)]
pub struct UserStats {
    pub record: UserRecord,
    pub total_reputation: i64,
    /// The pool this user will receive at the next reset.
    pub next_capacity: PoolCapacity,
}

/// The facade owning the ledger and scheduler, injected with its store.
pub struct ReputationService<S> {
    store: Arc<S>,
    ledger: VoteLedger<S>,
    scheduler: PoolScheduler<S>,
}

impl<S: ReputationStore> ReputationService<S> {
    pub fn new(store: Arc<S>, config: &ServiceConfig) -> Self {
        Self {
            ledger: VoteLedger::new(store.clone(), config.params.clone()),
            scheduler: PoolScheduler::new(store.clone(), config.params.clone()),
            store,
        }
    }

    pub fn ledger(&self) -> &VoteLedger<S> {
        &self.ledger
    }

    /// Apply a vote and build the user-facing reply.
    pub fn cast_vote(
        &self,
        guild: &GuildId,
        voter: &UserId,
        answer_id: &MessageId,
        direction: VoteDirection,
    ) -> Result<VoteReply, ServiceError> {
        match self.ledger.cast_vote(guild, voter, answer_id, direction) {
            Ok(receipt) => Ok(VoteReply {
                ok: true,
                message: receipt.status,
                upvotes: receipt.upvotes,
                downvotes: receipt.downvotes,
            }),
            Err(err) => self.rejection(guild, answer_id, err),
        }
    }

    /// Whether a message in an eligible channel looks like a question.
    ///
    /// Used by the gateway to decide when to offer thread conversion. Always
    /// false outside the guild's valid channels.
    pub fn looks_like_question(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        kind: tally_detect::DetectionKind,
        content: &str,
    ) -> Result<bool, ServiceError> {
        match self.store.get_guild(guild) {
            Ok(record) if record.is_valid_channel(channel) => {
                Ok(tally_detect::is_question(kind, content))
            }
            Ok(_) => Ok(false),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Convert a thread message into a votable answer.
    pub fn convert_answer(
        &self,
        guild: &GuildId,
        poster: &UserId,
        channel: &ChannelId,
        answer_id: &MessageId,
    ) -> Result<VoteReply, ServiceError> {
        match self.ledger.convert_answer(guild, poster, channel, answer_id) {
            Ok(record) => {
                let (upvotes, downvotes) = record.counts();
                Ok(VoteReply {
                    ok: true,
                    message: "message converted to answer".to_string(),
                    upvotes,
                    downvotes,
                })
            }
            Err(err) => self.rejection(guild, answer_id, err),
        }
    }

    /// Accept an answer on behalf of the question author.
    pub fn accept_answer(
        &self,
        guild: &GuildId,
        question_author: &UserId,
        answer_poster: &UserId,
        answer_id: &MessageId,
    ) -> Result<VoteReply, ServiceError> {
        match self
            .ledger
            .accept_answer(guild, question_author, answer_poster, answer_id)
        {
            Ok(receipt) => {
                let record = self.store.get_answer(guild, answer_id)?;
                let (upvotes, downvotes) = record.counts();
                Ok(VoteReply {
                    ok: true,
                    message: receipt.status,
                    upvotes,
                    downvotes,
                })
            }
            Err(err) => self.rejection(guild, answer_id, err),
        }
    }

    /// Replace the set of reputation-eligible channels, creating the guild
    /// record on first use.
    pub fn set_valid_channels(
        &self,
        guild: &GuildId,
        channels: Vec<ChannelId>,
    ) -> Result<(), ServiceError> {
        let mut record = self.guild_or_new(guild)?;
        record.valid_channels = channels;
        self.store.put_guild(&record)?;
        info!(guild = %guild, "valid channels updated");
        Ok(())
    }

    /// Point moderation reports at a channel.
    pub fn set_report_channel(
        &self,
        guild: &GuildId,
        channel: Option<ChannelId>,
    ) -> Result<(), ServiceError> {
        let mut record = self.guild_or_new(guild)?;
        record.report_channel = channel;
        self.store.put_guild(&record)?;
        Ok(())
    }

    /// Remove a guild and everything stored under it (admin action or guild
    /// departure).
    pub fn remove_guild(&self, guild: &GuildId) -> Result<(), ServiceError> {
        self.store.delete_guild(guild)?;
        info!(guild = %guild, "guild data removed");
        Ok(())
    }

    /// Reputation summary for stats commands. `NotFound` means the user has
    /// never interacted — callers typically render that as zero everywhere.
    pub fn user_stats(&self, guild: &GuildId, user: &UserId) -> Result<UserStats, ServiceError> {
        let record = self.store.get_user(guild, user)?;
        Ok(UserStats {
            next_capacity: self.ledger.capacity_for(&record),
            total_reputation: tally_ledger::total_reputation(&record),
            record,
        })
    }

    /// Run the daily reset immediately — all guilds, or one.
    pub fn run_daily_reset(&self, guild: Option<&GuildId>) -> Result<SweepReport, ServiceError> {
        let now = Timestamp::now();
        let report = match guild {
            Some(id) => self
                .scheduler
                .run_daily_reset(Some(std::slice::from_ref(id)), now),
            None => self.scheduler.run_daily_reset(None, now),
        };
        Ok(report?)
    }

    /// Time until the next pool refill.
    pub fn time_until_next_reset(&self, now: Timestamp) -> Duration {
        self.scheduler.time_until_next_reset(now)
    }

    /// "H hours, M minutes, S seconds" until the next refill.
    pub fn pretty_time_until_reset(&self, now: Timestamp) -> String {
        pretty_time_remaining(self.time_until_next_reset(now).as_secs())
    }

    fn guild_or_new(&self, guild: &GuildId) -> Result<GuildRecord, ServiceError> {
        match self.store.get_guild(guild) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound(_)) => Ok(GuildRecord::new(guild.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Map a domain rejection to a user-facing reply; anything else is a
    /// real failure for the caller.
    fn rejection(
        &self,
        guild: &GuildId,
        answer_id: &MessageId,
        err: LedgerError,
    ) -> Result<VoteReply, ServiceError> {
        let message = match &err {
            LedgerError::PoolExhausted { direction } => format!(
                "your daily {direction} pool is empty. it refills in {}",
                self.pretty_time_until_reset(Timestamp::now())
            ),
            LedgerError::SelfVote
            | LedgerError::AnswerNotFound(_)
            | LedgerError::AlreadyConverted(_)
            | LedgerError::ChannelNotEligible(_)
            | LedgerError::PosterMismatch(_) => err.to_string(),
            LedgerError::ContentionExhausted { .. } | LedgerError::Store(_) => {
                return Err(err.into());
            }
        };

        let (upvotes, downvotes) = match self.store.get_answer(guild, answer_id) {
            Ok(record) => record.counts(),
            Err(_) => (0, 0),
        };

        Ok(VoteReply {
            ok: false,
            message,
            upvotes,
            downvotes,
        })
    }
}

impl<S: ReputationStore + Send + Sync + 'static> ReputationService<S> {
    /// Start the daily-reset driver on the current tokio runtime.
    ///
    /// Returns the shutdown handle and the task; send `true` through the
    /// handle to stop the loop.
    pub fn spawn_scheduler(
        &self,
        config: &ServiceConfig,
    ) -> (watch::Sender<bool>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = watch::channel(false);
        let scheduler = PoolScheduler::new(self.store.clone(), config.params.clone());
        let handle = tokio::spawn(async move {
            scheduler.run_until_shutdown(rx).await;
        });
        (tx, handle)
    }
}
