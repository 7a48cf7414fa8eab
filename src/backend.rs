//! The durable key-value store holding session records.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::Error;

/// The backend representation of a session: the id is the sole lookup key,
/// the data is the opaque serialized value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub data: Vec<u8>,
}

/// A durable store keyed by session id.
///
/// Point operations only: unconditional overwrite on put (last writer wins,
/// no version check) and unconditional removal on delete. Implementations
/// own their own connection, credential, and table/collection concerns, and
/// must be safe for concurrent use. No retry or timeout logic belongs here;
/// failures propagate once.
#[async_trait]
pub trait KeyValueBackend: fmt::Debug + Send + Sync + 'static {
    /// Write a record under its id. `ttl` is an optional server-side
    /// lifetime hint; backends without native expiry may ignore it.
    async fn put(&self, record: &StoredRecord, ttl: Option<Duration>) -> Result<(), Error>;

    /// Point lookup. Fails with [`Error::NotFound`] when no record exists
    /// under `id`.
    async fn get(&self, id: &str) -> Result<StoredRecord, Error>;

    /// Remove the record under `id`. Removing an absent record is a success.
    async fn delete(&self, id: &str) -> Result<(), Error>;
}

/// In-process backend for tests and development.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, (StoredRecord, Option<OffsetDateTime>)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, (StoredRecord, Option<OffsetDateTime>)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live (unexpired) records.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.records()
            .values()
            .filter(|(_, deadline)| deadline.is_none_or(|deadline| deadline > now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn put(&self, record: &StoredRecord, ttl: Option<Duration>) -> Result<(), Error> {
        let deadline = ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);
        self.records()
            .insert(record.id.clone(), (record.clone(), deadline));
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<StoredRecord, Error> {
        let mut records = self.records();
        match records.get(id) {
            Some((_, Some(deadline))) if *deadline <= OffsetDateTime::now_utc() => {
                records.remove(id);
                Err(Error::NotFound(id.to_owned()))
            }
            Some((record, _)) => Ok(record.clone()),
            None => Err(Error::NotFound(id.to_owned())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.records().remove(id);
        Ok(())
    }
}
