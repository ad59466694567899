//! The `VoteLedger` — applies vote actions, answer conversion, and answer
//! acceptance against an abstract [`ReputationStore`].
//!
//! Every public operation either fully applies or fails as a no-op with a
//! reason. The answer record and the two user records are separate atomic
//! units; a vote cast reserves its pool unit inside the voter's record first
//! and applies the vote-set change only against the state the reservation
//! was made for, so racing intents can neither double-spend the pool nor
//! double-count reputation.

use crate::error::LedgerError;
use crate::reputation::{pool_capacity, total_reputation};
use crate::vote::{transition, VoteOutcome, VoteTransition};
use std::sync::Arc;
use tally_store::{AnswerRecord, ReputationStore, StoreError, UserRecord};
use tally_types::{ChannelId, GuildId, LedgerParams, MessageId, UserId, VoteDirection};
use tracing::{debug, info};

/// Result of a successful vote action, used to re-render the answer's tally.
#[derive(Clone, Debug)]
pub struct VoteReceipt {
    /// Short human-readable status, e.g. "upvoted" or "removed upvote".
    pub status: String,
    pub outcome: VoteOutcome,
    pub upvotes: usize,
    pub downvotes: usize,
}

/// What an acceptance call actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// First acceptance — reward applied.
    Accepted,
    /// The answer was already accepted; nothing changed.
    AlreadyAccepted,
    /// Poster answered their own question; accepted without a reward.
    SelfAnswer,
}

/// Result of a successful acceptance call.
#[derive(Clone, Debug)]
pub struct AcceptReceipt {
    pub outcome: AcceptOutcome,
    pub status: String,
}

/// The core ledger. Generic over the store so tests run against the
/// in-memory nullable and production against a real document store.
pub struct VoteLedger<S> {
    store: Arc<S>,
    params: LedgerParams,
}

impl<S: ReputationStore> VoteLedger<S> {
    pub fn new(store: Arc<S>, params: LedgerParams) -> Self {
        Self { store, params }
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Apply one vote intent.
    ///
    /// Ordering per the concurrency contract: when the intent adds a
    /// direction, the pool unit is reserved atomically inside the voter's
    /// record before the answer is touched. `pool.consume` inside that
    /// mutator is the authoritative check, so two racing casts can never
    /// both land on a one-unit pool. The vote-set mutation then applies only
    /// while the voter's state on the answer is still the one the
    /// reservation was made for; a lost race refunds the unit and retries.
    pub fn cast_vote(
        &self,
        guild: &GuildId,
        voter: &UserId,
        answer_id: &MessageId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, LedgerError> {
        let answer = self.fetch_answer(guild, answer_id)?;

        if answer.poster == *voter {
            return Err(LedgerError::SelfVote);
        }

        let mut observed = answer.vote_state(voter);
        let mut attempts = 0;
        loop {
            let step = transition(observed, direction);

            // Reserve the pool unit first. The voter record is lazily
            // created on first vote, so a missing record means the default
            // pool.
            if step.consumes_pool {
                let mut reserved = false;
                self.with_retries("upsert_user(reserve)", || {
                    self.store.upsert_user(guild, voter, &mut |record| {
                        reserved = record.pool.consume(direction);
                    })
                })?;
                if !reserved {
                    return Err(LedgerError::PoolExhausted { direction });
                }
            }

            // Mutate the vote sets only if the voter's state still matches
            // the reservation; otherwise note the fresh state and bail out.
            let mut stale = false;
            let updated = self.with_retries("update_answer", || {
                self.store.update_answer(guild, answer_id, &mut |record| {
                    let current = record.vote_state(voter);
                    if current != observed {
                        stale = true;
                        observed = current;
                        return;
                    }
                    stale = false;
                    record.upvoters.remove(voter);
                    record.downvoters.remove(voter);
                    match step.next {
                        tally_types::VoteState::Upvoted => {
                            record.upvoters.insert(voter.clone());
                        }
                        tally_types::VoteState::Downvoted => {
                            record.downvoters.insert(voter.clone());
                        }
                        tally_types::VoteState::NoVote => {}
                    }
                })
            })?;

            if stale {
                if step.consumes_pool {
                    self.with_retries("upsert_user(refund)", || {
                        self.store.upsert_user(guild, voter, &mut |record| {
                            record.pool.refund(direction);
                        })
                    })?;
                }
                if attempts >= self.params.max_write_retries {
                    return Err(LedgerError::ContentionExhausted { retries: attempts });
                }
                attempts += 1;
                debug!(voter = %voter, answer = %answer_id, attempts, "vote raced, retrying");
                continue;
            }

            return self.finish_vote(guild, voter, answer_id, direction, step, updated);
        }
    }

    /// Voter lifetime counters and poster reputation for an applied vote.
    /// The pool unit, if any, has already been spent by the reservation.
    fn finish_vote(
        &self,
        guild: &GuildId,
        voter: &UserId,
        answer_id: &MessageId,
        direction: VoteDirection,
        step: VoteTransition,
        updated: AnswerRecord,
    ) -> Result<VoteReceipt, LedgerError> {
        self.with_retries("upsert_user(voter)", || {
            self.store.upsert_user(guild, voter, &mut |record| {
                record.lifetime.apply(step.lifetime_up, step.lifetime_down);
            })
        })?;

        // Poster side: channel-scoped reputation delta.
        let channel = updated.channel.clone();
        let poster = updated.poster.clone();
        self.with_retries("upsert_user(poster)", || {
            self.store.upsert_user(guild, &poster, &mut |record| {
                record.add_reputation(&channel, step.rep_delta);
            })
        })?;

        let (upvotes, downvotes) = updated.counts();
        let status = step.status(direction);
        info!(
            guild = %guild,
            voter = %voter,
            answer = %answer_id,
            %status,
            rep_delta = step.rep_delta,
            "vote applied"
        );

        Ok(VoteReceipt {
            status,
            outcome: step.outcome,
            upvotes,
            downvotes,
        })
    }

    /// Convert a thread message into a votable answer.
    ///
    /// Only allowed under a reputation-eligible channel; idempotence is the
    /// caller's concern — a second conversion fails with `AlreadyConverted`.
    pub fn convert_answer(
        &self,
        guild: &GuildId,
        poster: &UserId,
        channel: &ChannelId,
        answer_id: &MessageId,
    ) -> Result<AnswerRecord, LedgerError> {
        let guild_record = match self.store.get_guild(guild) {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => {
                return Err(LedgerError::ChannelNotEligible(channel.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        if !guild_record.is_valid_channel(channel) {
            return Err(LedgerError::ChannelNotEligible(channel.clone()));
        }

        let record = AnswerRecord::new(answer_id.clone(), poster.clone(), channel.clone());
        match self.store.put_answer(guild, &record) {
            Ok(()) => {
                info!(guild = %guild, answer = %answer_id, poster = %poster, "answer converted");
                Ok(record)
            }
            Err(StoreError::Duplicate(_)) => Err(LedgerError::AlreadyConverted(answer_id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Accept an answer on behalf of the question author.
    ///
    /// Awards the one-time reputation and accepted-answer count on the first
    /// call only; re-accepting is idempotent. The award is skipped entirely
    /// when the poster answered their own question.
    pub fn accept_answer(
        &self,
        guild: &GuildId,
        question_author: &UserId,
        answer_poster: &UserId,
        answer_id: &MessageId,
    ) -> Result<AcceptReceipt, LedgerError> {
        let answer = self.fetch_answer(guild, answer_id)?;
        if answer.poster != *answer_poster {
            return Err(LedgerError::PosterMismatch(answer_id.clone()));
        }

        let mut was_accepted = false;
        let updated = self.with_retries("update_answer(accept)", || {
            self.store.update_answer(guild, answer_id, &mut |record| {
                was_accepted = record.accepted;
                record.accepted = true;
            })
        })?;

        if was_accepted {
            return Ok(AcceptReceipt {
                outcome: AcceptOutcome::AlreadyAccepted,
                status: "this answer is already accepted".to_string(),
            });
        }

        if updated.poster == *question_author {
            debug!(guild = %guild, answer = %answer_id, "self-answer accepted, no reward");
            return Ok(AcceptReceipt {
                outcome: AcceptOutcome::SelfAnswer,
                status: "answer accepted".to_string(),
            });
        }

        let channel = updated.channel.clone();
        let reward = self.params.accept_reward;
        self.with_retries("upsert_user(accept)", || {
            self.store.upsert_user(guild, &updated.poster, &mut |record| {
                record.add_reputation(&channel, reward);
                record.accepted_answers += 1;
            })
        })?;

        info!(guild = %guild, answer = %answer_id, poster = %updated.poster, "answer accepted");
        Ok(AcceptReceipt {
            outcome: AcceptOutcome::Accepted,
            status: "answer accepted".to_string(),
        })
    }

    /// The pool capacity the poster would receive at the next reset — for
    /// user-facing stats.
    pub fn capacity_for(&self, user: &UserRecord) -> tally_types::PoolCapacity {
        pool_capacity(total_reputation(user), &self.params)
    }

    fn fetch_answer(
        &self,
        guild: &GuildId,
        answer_id: &MessageId,
    ) -> Result<AnswerRecord, LedgerError> {
        match self.store.get_answer(guild, answer_id) {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound(_)) => Err(LedgerError::AnswerNotFound(answer_id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Run a store write, retrying a bounded number of times on
    /// optimistic-concurrency conflicts.
    fn with_retries<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, LedgerError> {
        let mut attempts = 0;
        loop {
            match op() {
                Err(StoreError::Conflict(key)) => {
                    if attempts >= self.params.max_write_retries {
                        return Err(LedgerError::ContentionExhausted { retries: attempts });
                    }
                    attempts += 1;
                    debug!(what, key = %key, attempts, "retrying after write conflict");
                }
                other => return Ok(other?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_nullables::NullStore;
    use tally_store::{AnswerStore, GuildRecord, GuildStore, UserStore};
    use tally_types::VotePool;

    fn guild() -> GuildId {
        GuildId::new("g1")
    }

    fn channel() -> ChannelId {
        ChannelId::new("dev-help")
    }

    fn setup() -> (VoteLedger<NullStore>, Arc<NullStore>) {
        let store = Arc::new(NullStore::new());
        let mut record = GuildRecord::new(guild());
        record.valid_channels.push(channel());
        store.put_guild(&record).unwrap();
        (
            VoteLedger::new(store.clone(), LedgerParams::default()),
            store,
        )
    }

    fn convert(ledger: &VoteLedger<NullStore>, answer: &str, poster: &str) {
        ledger
            .convert_answer(
                &guild(),
                &UserId::new(poster),
                &channel(),
                &MessageId::new(answer),
            )
            .unwrap();
    }

    #[test]
    fn end_to_end_upvote_then_switch() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        // A (rep 0, pool {5,3}) upvotes X posted by B.
        let receipt = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        assert_eq!(receipt.status, "upvoted");
        assert_eq!((receipt.upvotes, receipt.downvotes), (1, 0));

        let answer = store.get_answer(&guild(), &MessageId::new("x")).unwrap();
        assert!(answer.upvoters.contains(&alice));

        let bob = store.get_user(&guild(), &UserId::new("bob")).unwrap();
        assert_eq!(bob.reputation_in(&channel()), 1);

        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 4);
        assert_eq!(voter.lifetime.upvotes_cast, 1);

        // A switches to a downvote on X.
        let receipt = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Down)
            .unwrap();
        assert_eq!(receipt.status, "switched to downvote");
        assert_eq!((receipt.upvotes, receipt.downvotes), (0, 1));

        let bob = store.get_user(&guild(), &UserId::new("bob")).unwrap();
        assert_eq!(bob.reputation_in(&channel()), -1);

        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 4); // untouched further
        assert_eq!(voter.pool.downvotes, 2);
        assert_eq!(voter.lifetime.upvotes_cast, 0); // switch decrements
        assert_eq!(voter.lifetime.downvotes_cast, 1);
    }

    #[test]
    fn double_upvote_retracts_and_spends_one_pool_unit() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        let receipt = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        assert_eq!(receipt.status, "removed upvote");
        assert_eq!(receipt.upvotes, 0);

        // Net reputation across both calls is zero.
        let bob = store.get_user(&guild(), &UserId::new("bob")).unwrap();
        assert_eq!(bob.reputation_in(&channel()), 0);

        // Pool decreased by exactly one across both calls, not two.
        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 4);
        assert_eq!(voter.lifetime.upvotes_cast, 0);
    }

    #[test]
    fn self_vote_rejected_without_mutation() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let bob = UserId::new("bob");

        for direction in [VoteDirection::Up, VoteDirection::Down] {
            let err = ledger
                .cast_vote(&guild(), &bob, &MessageId::new("x"), direction)
                .unwrap_err();
            assert!(matches!(err, LedgerError::SelfVote));
        }

        let answer = store.get_answer(&guild(), &MessageId::new("x")).unwrap();
        assert_eq!(answer.counts(), (0, 0));
        assert!(store.get_user(&guild(), &bob).is_err());
    }

    #[test]
    fn vote_on_unknown_answer_fails() {
        let (ledger, _) = setup();
        let err = ledger
            .cast_vote(
                &guild(),
                &UserId::new("alice"),
                &MessageId::new("nope"),
                VoteDirection::Up,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AnswerNotFound(_)));
    }

    #[test]
    fn exhausted_pool_blocks_new_vote_without_mutation() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        store
            .upsert_user(&guild(), &alice, &mut |record| {
                record.pool = VotePool::new(0, 3);
            })
            .unwrap();

        let err = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PoolExhausted {
                direction: VoteDirection::Up
            }
        ));

        let answer = store.get_answer(&guild(), &MessageId::new("x")).unwrap();
        assert_eq!(answer.counts(), (0, 0));
        let bob = store.get_user(&guild(), &UserId::new("bob"));
        assert!(bob.is_err(), "poster must not gain reputation");
    }

    #[test]
    fn racing_casts_cannot_overspend_a_one_unit_pool() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        convert(&ledger, "y", "carol");
        let alice = UserId::new("alice");

        store
            .upsert_user(&guild(), &alice, &mut |record| {
                record.pool = VotePool::new(1, 3);
            })
            .unwrap();

        let ledger = Arc::new(ledger);
        let handles: Vec<_> = ["x", "y"]
            .into_iter()
            .map(|answer| {
                let ledger = ledger.clone();
                let alice = alice.clone();
                std::thread::spawn(move || {
                    ledger.cast_vote(&guild(), &alice, &MessageId::new(answer), VoteDirection::Up)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Exactly one vote lands, whichever interleaving the scheduler
        // picks; the other is turned away by the atomic reservation.
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LedgerError::PoolExhausted { .. }))));

        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 0);
        assert_eq!(voter.lifetime.upvotes_cast, 1);
    }

    #[test]
    fn write_conflicts_are_retried_until_success() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        store.inject_write_conflicts(ledger.params().max_write_retries);
        let receipt = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        assert_eq!(receipt.status, "upvoted");

        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 4);
        let bob = store.get_user(&guild(), &UserId::new("bob")).unwrap();
        assert_eq!(bob.reputation_in(&channel()), 1);
    }

    #[test]
    fn contention_past_the_retry_bound_fails_cleanly() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        store.inject_write_conflicts(ledger.params().max_write_retries + 1);
        let err = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ContentionExhausted { .. }));

        // The failed write was the pool reservation itself, so nothing
        // landed anywhere.
        let answer = store.get_answer(&guild(), &MessageId::new("x")).unwrap();
        assert_eq!(answer.counts(), (0, 0));
        assert!(store.get_user(&guild(), &alice).is_err());
    }

    #[test]
    fn retraction_succeeds_with_empty_pool() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let alice = UserId::new("alice");

        ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        store
            .upsert_user(&guild(), &alice, &mut |record| {
                record.pool = VotePool::new(0, 0);
            })
            .unwrap();

        let receipt = ledger
            .cast_vote(&guild(), &alice, &MessageId::new("x"), VoteDirection::Up)
            .unwrap();
        assert_eq!(receipt.status, "removed upvote");

        let voter = store.get_user(&guild(), &alice).unwrap();
        assert_eq!(voter.pool.upvotes, 0, "retraction never refunds the pool");
    }

    #[test]
    fn convert_requires_eligible_channel() {
        let (ledger, _) = setup();
        let err = ledger
            .convert_answer(
                &guild(),
                &UserId::new("bob"),
                &ChannelId::new("off-topic"),
                &MessageId::new("x"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::ChannelNotEligible(_)));
    }

    #[test]
    fn convert_twice_fails() {
        let (ledger, _) = setup();
        convert(&ledger, "x", "bob");
        let err = ledger
            .convert_answer(
                &guild(),
                &UserId::new("bob"),
                &channel(),
                &MessageId::new("x"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyConverted(_)));
    }

    #[test]
    fn accept_awards_exactly_once() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "bob");
        let asker = UserId::new("alice");
        let bob = UserId::new("bob");

        let receipt = ledger
            .accept_answer(&guild(), &asker, &bob, &MessageId::new("x"))
            .unwrap();
        assert_eq!(receipt.outcome, AcceptOutcome::Accepted);

        let poster = store.get_user(&guild(), &bob).unwrap();
        assert_eq!(poster.reputation_in(&channel()), 1);
        assert_eq!(poster.accepted_answers, 1);

        // Re-accept is idempotent: no second award.
        let receipt = ledger
            .accept_answer(&guild(), &asker, &bob, &MessageId::new("x"))
            .unwrap();
        assert_eq!(receipt.outcome, AcceptOutcome::AlreadyAccepted);

        let poster = store.get_user(&guild(), &bob).unwrap();
        assert_eq!(poster.reputation_in(&channel()), 1);
        assert_eq!(poster.accepted_answers, 1);
    }

    #[test]
    fn self_answer_accepted_without_reward() {
        let (ledger, store) = setup();
        convert(&ledger, "x", "alice");
        let alice = UserId::new("alice");

        let receipt = ledger
            .accept_answer(&guild(), &alice, &alice, &MessageId::new("x"))
            .unwrap();
        assert_eq!(receipt.outcome, AcceptOutcome::SelfAnswer);
        assert!(store.get_user(&guild(), &alice).is_err());
    }

    #[test]
    fn accept_with_stale_poster_fails() {
        let (ledger, _) = setup();
        convert(&ledger, "x", "bob");
        let err = ledger
            .accept_answer(
                &guild(),
                &UserId::new("alice"),
                &UserId::new("mallory"),
                &MessageId::new("x"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::PosterMismatch(_)));
    }
}
