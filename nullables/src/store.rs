//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tally_store::{
    AnswerRecord, AnswerStore, GuildRecord, GuildStore, MetaStore, StoreError, UserRecord,
    UserStore,
};
use tally_types::{GuildId, MessageId, UserId};

/// An in-memory reputation store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Mutators run while the relevant map's lock is held, which gives the same
/// per-record read-modify-write atomicity a real document store provides.
/// Write conflicts can be injected to exercise callers' retry paths.
pub struct NullStore {
    guilds: Mutex<HashMap<String, GuildRecord>>,
    users: Mutex<HashMap<(String, String), UserRecord>>,
    answers: Mutex<HashMap<(String, String), AnswerRecord>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
    write_conflicts: AtomicU32,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            guilds: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            answers: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
            write_conflicts: AtomicU32::new(0),
        }
    }

    /// Make the next `count` record mutations fail with
    /// [`StoreError::Conflict`], emulating a document store rejecting a
    /// stale revision.
    pub fn inject_write_conflicts(&self, count: u32) {
        self.write_conflicts.store(count, Ordering::SeqCst);
    }

    fn take_conflict(&self, key: &str) -> Result<(), StoreError> {
        let armed = self
            .write_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match armed {
            Ok(_) => Err(StoreError::Conflict(key.to_string())),
            Err(_) => Ok(()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn user_key(guild: &GuildId, user: &UserId) -> (String, String) {
    (guild.as_str().to_string(), user.as_str().to_string())
}

fn answer_key(guild: &GuildId, answer: &MessageId) -> (String, String) {
    (guild.as_str().to_string(), answer.as_str().to_string())
}

impl GuildStore for NullStore {
    fn get_guild(&self, guild: &GuildId) -> Result<GuildRecord, StoreError> {
        self.guilds
            .lock()
            .unwrap()
            .get(guild.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(guild.to_string()))
    }

    fn put_guild(&self, record: &GuildRecord) -> Result<(), StoreError> {
        self.guilds
            .lock()
            .unwrap()
            .insert(record.guild_id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn guild_exists(&self, guild: &GuildId) -> Result<bool, StoreError> {
        Ok(self.guilds.lock().unwrap().contains_key(guild.as_str()))
    }

    fn delete_guild(&self, guild: &GuildId) -> Result<(), StoreError> {
        if self.guilds.lock().unwrap().remove(guild.as_str()).is_none() {
            return Err(StoreError::NotFound(guild.to_string()));
        }
        let key = guild.as_str().to_string();
        self.users.lock().unwrap().retain(|(g, _), _| *g != key);
        self.answers.lock().unwrap().retain(|(g, _), _| *g != key);
        Ok(())
    }

    fn list_guilds(&self) -> Result<Vec<GuildId>, StoreError> {
        let mut ids: Vec<GuildId> = self
            .guilds
            .lock()
            .unwrap()
            .keys()
            .map(GuildId::new)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl UserStore for NullStore {
    fn get_user(&self, guild: &GuildId, user: &UserId) -> Result<UserRecord, StoreError> {
        self.users
            .lock()
            .unwrap()
            .get(&user_key(guild, user))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{guild}/{user}")))
    }

    fn upsert_user(
        &self,
        guild: &GuildId,
        user: &UserId,
        mutate: &mut dyn FnMut(&mut UserRecord),
    ) -> Result<UserRecord, StoreError> {
        self.take_conflict(&format!("{guild}/{user}"))?;
        let mut users = self.users.lock().unwrap();
        let record = users
            .entry(user_key(guild, user))
            .or_insert_with(|| UserRecord::new(user.clone()));
        mutate(record);
        Ok(record.clone())
    }

    fn list_users(&self, guild: &GuildId) -> Result<Vec<UserRecord>, StoreError> {
        let mut records: Vec<UserRecord> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|((g, _), _)| g == guild.as_str())
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(records)
    }

    fn delete_user(&self, guild: &GuildId, user: &UserId) -> Result<(), StoreError> {
        self.users
            .lock()
            .unwrap()
            .remove(&user_key(guild, user))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{guild}/{user}")))
    }
}

impl AnswerStore for NullStore {
    fn get_answer(&self, guild: &GuildId, answer: &MessageId) -> Result<AnswerRecord, StoreError> {
        self.answers
            .lock()
            .unwrap()
            .get(&answer_key(guild, answer))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(answer.to_string()))
    }

    fn put_answer(&self, guild: &GuildId, record: &AnswerRecord) -> Result<(), StoreError> {
        let mut answers = self.answers.lock().unwrap();
        let key = answer_key(guild, &record.answer_id);
        if answers.contains_key(&key) {
            return Err(StoreError::Duplicate(record.answer_id.to_string()));
        }
        answers.insert(key, record.clone());
        Ok(())
    }

    fn update_answer(
        &self,
        guild: &GuildId,
        answer: &MessageId,
        mutate: &mut dyn FnMut(&mut AnswerRecord),
    ) -> Result<AnswerRecord, StoreError> {
        self.take_conflict(answer.as_str())?;
        let mut answers = self.answers.lock().unwrap();
        let record = answers
            .get_mut(&answer_key(guild, answer))
            .ok_or_else(|| StoreError::NotFound(answer.to_string()))?;
        mutate(record);
        Ok(record.clone())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.meta.lock().unwrap().remove(key);
        Ok(())
    }
}
