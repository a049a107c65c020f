//! `vt reminders`: the daily water reminder plan.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use vt_core::{ReminderKind, WaterSettings, plan_reminders};
use vt_db::{Database, Journal};

pub fn run<W: Write, Tz: TimeZone>(writer: &mut W, journal: &Journal<Database, Tz>) -> Result<()> {
    let settings: WaterSettings = journal.settings().get();
    let plan = plan_reminders(&settings);

    if plan.is_empty() {
        writeln!(writer, "No water reminders enabled.")?;
        return Ok(());
    }

    let hourly = plan
        .iter()
        .filter(|r| r.kind == ReminderKind::Hourly)
        .count();
    writeln!(
        writer,
        "{} reminders ({} hourly, {} custom)",
        plan.len(),
        hourly,
        plan.len() - hourly
    )?;
    for reminder in &plan {
        writeln!(writer, "{}  {}", reminder.time, reminder.kind)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;
    use vt_core::Calendar;

    fn journal() -> Journal<Database, Utc> {
        Journal::new(Database::open_in_memory().unwrap(), Calendar::new(Utc))
    }

    #[test]
    fn custom_only_plan() {
        let journal = journal();
        journal
            .settings()
            .set(&WaterSettings {
                enable_hourly_reminders: false,
                custom_reminder_times: vec!["21:00".parse().unwrap(), "08:15".parse().unwrap()],
                ..WaterSettings::default()
            })
            .unwrap();

        let mut out = Vec::new();
        run(&mut out, &journal).unwrap();

        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        2 reminders (0 hourly, 2 custom)
        08:15  custom
        21:00  custom
        ");
    }

    #[test]
    fn default_plan_has_hourly_and_custom() {
        let journal = journal();
        let mut out = Vec::new();
        run(&mut out, &journal).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("21 reminders (17 hourly, 4 custom)\n06:00  hourly\n"));
        assert!(out.ends_with("22:00  hourly\n"));
    }

    #[test]
    fn nothing_enabled() {
        let journal = journal();
        journal
            .settings()
            .set(&WaterSettings {
                enable_hourly_reminders: false,
                enable_custom_reminders: false,
                ..WaterSettings::default()
            })
            .unwrap();

        let mut out = Vec::new();
        run(&mut out, &journal).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No water reminders enabled.\n");
    }
}
