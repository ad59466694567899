//! The pool scheduler — daily sweep and its async driver.

use crate::error::SchedulerError;
use std::sync::Arc;
use std::time::Duration;
use tally_ledger::{pool_capacity, total_reputation};
use tally_store::ReputationStore;
use tally_types::{GuildId, LedgerParams, Timestamp};
use tracing::{error, info, warn};

/// Meta key under which the last completed reset timestamp is persisted.
const LAST_RESET_KEY: &str = "pool_last_reset";

/// Outcome of one full sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub guilds_swept: u64,
    pub users_reset: u64,
    /// Per-guild or per-user failures that were logged and skipped.
    pub failures: u64,
}

/// Resets every user's pool to `capacity(total_reputation)` once per day.
pub struct PoolScheduler<S> {
    store: Arc<S>,
    params: LedgerParams,
}

impl<S: ReputationStore> PoolScheduler<S> {
    pub fn new(store: Arc<S>, params: LedgerParams) -> Self {
        Self { store, params }
    }

    /// Seconds until the next reset boundary.
    pub fn time_until_next_reset(&self, now: Timestamp) -> Duration {
        Duration::from_secs(now.secs_until_day_boundary())
    }

    /// When the last sweep completed, if one ever has.
    pub fn last_reset(&self) -> Result<Option<Timestamp>, SchedulerError> {
        match self.store.get_meta(LAST_RESET_KEY)? {
            Some(bytes) => {
                let ts: Timestamp = bincode::deserialize(&bytes)
                    .map_err(|e| SchedulerError::Encoding(e.to_string()))?;
                Ok(Some(ts))
            }
            None => Ok(None),
        }
    }

    /// Whether a reset boundary has passed since the last completed sweep.
    /// True when no sweep has ever run.
    pub fn missed_boundary(&self, now: Timestamp) -> Result<bool, SchedulerError> {
        let day_start = Timestamp::new(now.as_secs() - now.as_secs() % tally_types::time::DAY_SECS);
        Ok(match self.last_reset()? {
            Some(last) => last < day_start,
            None => true,
        })
    }

    /// Sweep all guilds (or `guilds` when given) and overwrite every user's
    /// pool with a freshly computed capacity — a full reset, not an additive
    /// refill, regardless of how much of the previous pool was spent.
    ///
    /// One bad guild or user record never aborts the sweep for the rest; the
    /// failure is logged and counted. Only a failure to enumerate guilds is
    /// surfaced as an error, and even then the caller's loop reschedules.
    pub fn run_daily_reset(
        &self,
        guilds: Option<&[GuildId]>,
        now: Timestamp,
    ) -> Result<SweepReport, SchedulerError> {
        let all;
        let targets: &[GuildId] = match guilds {
            Some(subset) => subset,
            None => {
                all = self.store.list_guilds()?;
                &all
            }
        };

        let mut report = SweepReport::default();
        for guild in targets {
            match self.reset_guild(guild) {
                Ok((users_reset, failures)) => {
                    report.guilds_swept += 1;
                    report.users_reset += users_reset;
                    report.failures += failures;
                }
                Err(err) => {
                    report.failures += 1;
                    warn!(guild = %guild, %err, "skipping guild in daily reset");
                }
            }
        }

        // Persist the marker so a restart can tell whether it missed a
        // boundary. Full sweeps only: a manual subset reset must not stop
        // the catch-up sweep from covering the remaining guilds.
        if guilds.is_none() {
            if let Ok(bytes) = bincode::serialize(&now) {
                if let Err(err) = self.store.put_meta(LAST_RESET_KEY, &bytes) {
                    warn!(%err, "failed to persist last-reset marker");
                }
            }
        }

        info!(
            guilds = report.guilds_swept,
            users = report.users_reset,
            failures = report.failures,
            "daily pool reset complete"
        );
        Ok(report)
    }

    fn reset_guild(&self, guild: &GuildId) -> Result<(u64, u64), SchedulerError> {
        let users = self.store.list_users(guild)?;
        let mut reset = 0u64;
        let mut failures = 0u64;

        for user in users {
            let capacity = pool_capacity(total_reputation(&user), &self.params);
            let result = self.store.upsert_user(guild, &user.user_id, &mut |record| {
                record.pool = capacity.into();
            });
            match result {
                Ok(_) => reset += 1,
                Err(err) => {
                    failures += 1;
                    warn!(guild = %guild, user = %user.user_id, %err, "failed to reset pool");
                }
            }
        }
        Ok((reset, failures))
    }

    /// Drive the daily reset until `shutdown` flips to true.
    ///
    /// Runs a catch-up sweep at startup when a boundary was missed, then
    /// sleeps to each subsequent boundary. Sweep failures are logged and the
    /// loop reschedules regardless, so the daily reset is never lost.
    pub async fn run_until_shutdown(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        match self.missed_boundary(Timestamp::now()) {
            Ok(true) => {
                info!("missed a reset boundary while offline, running catch-up sweep");
                if let Err(err) = self.run_daily_reset(None, Timestamp::now()) {
                    error!(%err, "catch-up sweep failed");
                }
            }
            Ok(false) => {}
            Err(err) => warn!(%err, "could not read last-reset marker"),
        }

        loop {
            let wait = self.time_until_next_reset(Timestamp::now());
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    if let Err(err) = self.run_daily_reset(None, Timestamp::now()) {
                        error!(%err, "daily reset sweep failed, will retry at next boundary");
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("pool scheduler shutting down");
                        return;
                    }
                }
            }
        }
    }
}
