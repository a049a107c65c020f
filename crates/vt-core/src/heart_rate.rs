//! Heart-rate readings and finished recording sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::types::Bpm;

/// A single manual pulse reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateReading {
    pub bpm: Bpm,
    pub timestamp: DateTime<Utc>,
}

impl HeartRateReading {
    pub const fn new(bpm: Bpm, timestamp: DateTime<Utc>) -> Self {
        Self { bpm, timestamp }
    }
}

/// A finished recording session with its derived statistics.
///
/// Sessions are built by [`SessionTracker`](crate::SessionTracker) when a
/// recording ends and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSession {
    /// Day bucket of the session's start.
    #[serde(deserialize_with = "crate::day::deserialize_day")]
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Readings in the order they were taken.
    #[serde(rename = "heartRateReadings")]
    pub readings: Vec<HeartRateReading>,
    /// Length in whole minutes.
    pub duration: u32,
    pub avg_heart_rate: u16,
    pub min_heart_rate: u16,
    pub max_heart_rate: u16,
    pub calories_burned: u32,
}

impl Record for HeartRateSession {
    const LOG: &'static str = "heart_rate_sessions";

    fn recorded_at(&self) -> DateTime<Utc> {
        self.start_time
    }
}
