//! Calendar-day bucketing.
//!
//! Every record belongs to exactly one day: its timestamp converted to the
//! calendar's time zone and truncated to midnight. The same [`Calendar`] is
//! used when tagging records on write and when filtering them on read.

use chrono::{DateTime, Local, NaiveDate, ParseError, TimeZone, Utc};
use serde::{Deserialize, Deserializer, de};

/// Maps instants to local calendar days.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Calendar<Local> {
    /// A calendar in the system's local time zone.
    pub const fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for Calendar<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Returns the day bucket for an instant.
    pub fn day_key(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.tz).date_naive()
    }

    /// Returns the current day bucket.
    pub fn today(&self) -> NaiveDate {
        self.day_key(Utc::now())
    }

    /// The time zone this calendar buckets in.
    pub const fn time_zone(&self) -> &Tz {
        &self.tz
    }
}

/// Reads a stored day bucket.
///
/// Older records store the day as the instant of local midnight rather than
/// a plain date; those are bucketed in the local time zone.
pub(crate) fn deserialize_day<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDate, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_day(&text).map_err(de::Error::custom)
}

fn parse_day(text: &str) -> Result<NaiveDate, ParseError> {
    text.parse::<NaiveDate>().or_else(|err| {
        DateTime::parse_from_rfc3339(text)
            .map(|instant| Calendar::local().day_key(instant.with_timezone(&Utc)))
            .map_err(|_| err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn adjacent_minutes_across_midnight_fall_in_different_days() {
        let calendar = Calendar::new(Utc);
        let before = calendar.day_key(utc("2024-01-01T23:59:00Z"));
        let after = calendar.day_key(utc("2024-01-02T00:01:00Z"));

        assert_eq!(before, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(after, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_ne!(before, after);
    }

    #[test]
    fn day_key_uses_calendar_offset() {
        // 03:30 UTC is still the previous evening five hours west of UTC
        let calendar = Calendar::new(FixedOffset::west_opt(5 * 3600).unwrap());
        let day = calendar.day_key(utc("2024-03-10T03:30:00Z"));
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn local_midnight_is_start_of_day() {
        let calendar = Calendar::new(FixedOffset::east_opt(2 * 3600).unwrap());
        // 22:00 UTC on Jan 1 is 00:00 local on Jan 2
        let day = calendar.day_key(utc("2024-01-01T22:00:00Z"));
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn parse_day_accepts_plain_dates_and_instants() {
        assert_eq!(
            parse_day("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            parse_day("2024-05-01T04:00:00.000Z").unwrap(),
            Calendar::local().day_key(utc("2024-05-01T04:00:00Z"))
        );
        assert!(parse_day("May 1st").is_err());
    }
}
