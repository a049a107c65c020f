//! Water intake logs.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::day::Calendar;
use crate::record::Record;
use crate::types::Milliliters;

/// One drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterLog {
    pub amount: Milliliters,
    /// Day bucket the drink was logged under.
    #[serde(deserialize_with = "crate::day::deserialize_day")]
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl WaterLog {
    /// Creates a log entry at `timestamp`, tagged with its day on `calendar`.
    pub fn new<Tz: TimeZone>(
        amount: Milliliters,
        timestamp: DateTime<Utc>,
        calendar: &Calendar<Tz>,
    ) -> Self {
        Self {
            amount,
            date: calendar.day_key(timestamp),
            timestamp,
        }
    }
}

impl Record for WaterLog {
    const LOG: &'static str = "water_logs";

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
