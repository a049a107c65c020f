//! Persisted records and their identifiers.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// A domain record kept in an append-only, day-bucketed log.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Name of the log holding records of this kind.
    const LOG: &'static str;

    /// The instant that orders the record and decides its day bucket.
    fn recorded_at(&self) -> DateTime<Utc>;
}

/// A record together with the identifier the store assigned to it.
///
/// Serializes flat, so `{"id": "...", ...fields}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Stored<T> {
    pub const fn new(id: RecordId, record: T) -> Self {
        Self { id, record }
    }

    pub fn into_inner(self) -> T {
        self.record
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}
