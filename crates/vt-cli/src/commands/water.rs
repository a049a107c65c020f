//! `vt water`: logging and reviewing water intake.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use vt_core::{Milliliters, Stored, WaterLog, WaterSummary};
use vt_db::{Database, Journal};

use super::util::{clear_day, clock, remove_record, write_json};

/// Logs `ml` milliliters at `now` and prints the day's progress.
pub fn add<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    ml: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    let amount = Milliliters::new(ml)?;
    let stored = journal
        .log_water(amount, now)
        .context("failed to log water")?;
    let summary = journal.daily_summary(stored.date).water;

    writeln!(writer, "Logged {} ({})", stored.amount, stored.id)?;
    write_progress(writer, &summary)?;
    Ok(())
}

pub fn remove<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    id: &str,
) -> Result<()> {
    remove_record(writer, &journal.water(), id, "water log")
}

pub fn clear<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
) -> Result<()> {
    clear_day(writer, &journal.water(), journal.calendar(), day, "water logs")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaterDay {
    day: NaiveDate,
    summary: WaterSummary,
    logs: Vec<Stored<WaterLog>>,
}

/// Prints the water logs of `day` with progress towards the goal.
pub fn today<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
    json: bool,
) -> Result<()> {
    let logs = journal.water().list_by_day(journal.calendar(), day);
    let summary = journal.daily_summary(day).water;

    if json {
        return write_json(
            writer,
            &WaterDay {
                day,
                summary,
                logs,
            },
        );
    }

    writeln!(writer, "Water for {day}")?;
    write_progress(writer, &summary)?;

    if logs.is_empty() {
        writeln!(writer, "No water logged.")?;
        return Ok(());
    }

    writeln!(writer)?;
    for log in &logs {
        writeln!(
            writer,
            "{}  {:>7}  {}",
            clock(journal.calendar(), log.timestamp),
            log.amount.to_string(),
            log.id
        )?;
    }
    Ok(())
}

fn write_progress<W: Write>(writer: &mut W, summary: &WaterSummary) -> Result<()> {
    writeln!(
        writer,
        "{} / {} ml ({}%), {} ml to go",
        summary.total, summary.daily_goal, summary.percentage, summary.remaining
    )?;
    Ok(())
}
