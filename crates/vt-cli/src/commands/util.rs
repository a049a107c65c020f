//! Shared utilities for CLI commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use vt_core::{Calendar, Record, RecordId};
use vt_db::EventLog;

/// Formats an instant as wall-clock `HH:MM` in the calendar's time zone.
pub fn clock<Tz: TimeZone>(calendar: &Calendar<Tz>, at: DateTime<Utc>) -> String {
    at.with_timezone(calendar.time_zone())
        .time()
        .format("%H:%M")
        .to_string()
}

/// Pretty-prints `value` as JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).context("failed to encode JSON")?;
    writeln!(writer)?;
    Ok(())
}

/// Deletes one record by ID, failing if it does not exist.
pub fn remove_record<W: Write, R: Record>(
    writer: &mut W,
    log: &EventLog<'_, R>,
    id: &str,
    noun: &str,
) -> Result<()> {
    let id = RecordId::new(id)?;
    if !log
        .delete(&id)
        .with_context(|| format!("failed to remove {noun}"))?
    {
        bail!("{noun} not found: {id}");
    }
    writeln!(writer, "Removed {noun} {id}")?;
    Ok(())
}

/// Deletes every record of `day`.
pub fn clear_day<W: Write, R: Record, Tz: TimeZone>(
    writer: &mut W,
    log: &EventLog<'_, R>,
    calendar: &Calendar<Tz>,
    day: NaiveDate,
    nouns: &str,
) -> Result<()> {
    let removed = log
        .delete_by_day(calendar, day)
        .with_context(|| format!("failed to remove {nouns}"))?;
    writeln!(writer, "Removed {removed} {nouns} from {day}")?;
    Ok(())
}

/// Formats a gram amount with at most one decimal.
pub fn grams(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract().abs() < f64::EPSILON {
        format!("{rounded:.0}g")
    } else {
        format!("{rounded:.1}g")
    }
}
