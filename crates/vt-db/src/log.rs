//! Append-only, day-bucketed record logs.

use std::marker::PhantomData;

use chrono::{NaiveDate, TimeZone};
use uuid::Uuid;
use vt_core::{Calendar, HeartRateSession, Record, RecordId, SessionSink, Stored};

use crate::{Database, DbError, KeyValueStore};

/// All records of one kind, stored as a JSON array under [`Record::LOG`].
///
/// Reads never fail: a missing log is empty and an unreadable one is logged
/// and treated as empty. Writes refuse to touch an unreadable log so that a
/// bad read can never overwrite data.
pub struct EventLog<'s, R, S = Database> {
    store: &'s S,
    _record: PhantomData<fn() -> R>,
}

impl<'s, R: Record, S: KeyValueStore> EventLog<'s, R, S> {
    pub const fn new(store: &'s S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Appends `record` under a freshly generated ID.
    pub fn append(&self, record: R) -> Result<Stored<R>, DbError> {
        let id = RecordId::new(Uuid::new_v4().to_string())?;
        let stored = self.store.update(R::LOG, |current| {
            let mut entries = decode::<R>(current)?;
            let stored = Stored::new(id, record);
            entries.push(stored.clone());
            Ok((Some(encode(&entries)?), stored))
        })?;
        tracing::debug!(log = R::LOG, id = %stored.id, "appended record");
        Ok(stored)
    }

    /// Every record, oldest first. Unreadable logs read as empty.
    pub fn list_all(&self) -> Vec<Stored<R>> {
        self.try_list_all().unwrap_or_else(|err| {
            tracing::warn!(log = R::LOG, error = %err, "failed to read log, treating as empty");
            Vec::new()
        })
    }

    /// Every record, oldest first, surfacing read and decode errors.
    pub fn try_list_all(&self) -> Result<Vec<Stored<R>>, DbError> {
        let raw = self.store.get(R::LOG)?;
        let mut entries = decode::<R>(raw.as_deref())?;
        entries.sort_by_key(|entry| entry.recorded_at());
        Ok(entries)
    }

    /// Records whose timestamp falls on `day` in `calendar`'s time zone.
    pub fn list_by_day<Tz: TimeZone>(
        &self,
        calendar: &Calendar<Tz>,
        day: NaiveDate,
    ) -> Vec<Stored<R>> {
        self.list_all()
            .into_iter()
            .filter(|entry| calendar.day_key(entry.recorded_at()) == day)
            .collect()
    }

    /// Removes the record with `id`. Returns whether it existed.
    pub fn delete(&self, id: &RecordId) -> Result<bool, DbError> {
        let removed = self.remove_where(|entry| &entry.id == id)?;
        Ok(removed > 0)
    }

    /// Removes every record of `day`, returning how many were removed.
    /// Records of other days are kept.
    pub fn delete_by_day<Tz: TimeZone>(
        &self,
        calendar: &Calendar<Tz>,
        day: NaiveDate,
    ) -> Result<usize, DbError> {
        self.remove_where(|entry| calendar.day_key(entry.recorded_at()) == day)
    }

    /// Removes the whole log.
    pub fn clear(&self) -> Result<(), DbError> {
        self.store.multi_remove(&[R::LOG])
    }

    fn remove_where(&self, matches: impl Fn(&Stored<R>) -> bool) -> Result<usize, DbError> {
        let removed = self.store.update(R::LOG, |current| {
            let mut entries = decode::<R>(current)?;
            let before = entries.len();
            entries.retain(|entry| !matches(entry));
            let removed = before - entries.len();
            if removed == 0 {
                return Ok((None, 0));
            }
            Ok((Some(encode(&entries)?), removed))
        })?;
        tracing::debug!(log = R::LOG, removed, "removed records");
        Ok(removed)
    }
}

impl<S: KeyValueStore> SessionSink for EventLog<'_, HeartRateSession, S> {
    type Error = DbError;

    fn save_session(
        &self,
        session: HeartRateSession,
    ) -> Result<Stored<HeartRateSession>, DbError> {
        self.append(session)
    }
}

fn decode<R: Record>(raw: Option<&str>) -> Result<Vec<Stored<R>>, DbError> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |raw| {
            serde_json::from_str(raw).map_err(|source| DbError::Corrupt {
                key: R::LOG.to_string(),
                source,
            })
        },
    )
}

fn encode<R: Record>(entries: &[Stored<R>]) -> Result<String, DbError> {
    serde_json::to_string(entries).map_err(|source| DbError::Encode {
        key: R::LOG.to_string(),
        source,
    })
}
