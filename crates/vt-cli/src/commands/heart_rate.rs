//! `vt hr`: recording and reviewing heart-rate sessions.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use vt_core::{
    Bpm, HeartRateSession, HeartRateSettings, HeartRateSummary, SessionTracker, Stored,
    TrackerError,
};
use vt_db::{Database, EventLog, Journal};

use super::util::{clear_day, clock, remove_record, write_json};

enum Step {
    Continue,
    Done,
}

/// Runs one recording session driven by `input` lines.
///
/// Each line is a bpm value, `end` or `cancel`. Invalid lines are reported
/// and recording continues. End of input ends the session, or discards it
/// when no reading was taken. `now` is asked for the time of every event.
pub fn record<R: BufRead, W: Write, Tz: TimeZone>(
    input: R,
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    mut now: impl FnMut() -> DateTime<Utc>,
) -> Result<()> {
    let settings = journal.settings().get::<HeartRateSettings>();
    let sessions = journal.heart_rate();
    let mut tracker = journal.session_tracker();

    let started_at = now();
    if !tracker.start_at(started_at) {
        bail!("a session is already being recorded");
    }
    writeln!(
        writer,
        "Recording started at {}. Enter bpm ({}-{}), 'end' to save or 'cancel' to discard.",
        clock(journal.calendar(), started_at),
        Bpm::MIN,
        Bpm::MAX
    )?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let step = match line.trim() {
            "" => Step::Continue,
            "cancel" => {
                let dropped = tracker.cancel()?;
                writeln!(
                    writer,
                    "Session discarded ({} readings).",
                    dropped.readings().len()
                )?;
                Step::Done
            }
            "end" => finish(writer, journal, &mut tracker, &settings, &sessions, now())?,
            value => {
                match value.parse().ok().and_then(|v| Bpm::new(v).ok()) {
                    Some(bpm) => {
                        tracker.add_reading_at(bpm, now())?;
                        let count = tracker.current().map_or(0, |s| s.readings().len());
                        writeln!(writer, "{bpm} bpm ({count} readings)")?;
                    }
                    None => writeln!(
                        writer,
                        "Ignored {value:?}: enter a heart rate between {} and {} bpm.",
                        Bpm::MIN,
                        Bpm::MAX
                    )?,
                }
                Step::Continue
            }
        };
        if matches!(step, Step::Done) {
            return Ok(());
        }
    }

    // Input closed while still recording.
    let has_readings = tracker
        .current()
        .is_some_and(|session| !session.readings().is_empty());
    if has_readings {
        let saved = tracker
            .end_at(now(), &settings, &sessions)
            .context("failed to save session")?;
        write_saved(writer, journal, &saved)?;
    } else {
        tracker.cancel()?;
        writeln!(writer, "No readings recorded, session discarded.")?;
    }
    Ok(())
}

fn finish<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    tracker: &mut SessionTracker<Tz>,
    settings: &HeartRateSettings,
    sessions: &EventLog<'_, HeartRateSession>,
    now: DateTime<Utc>,
) -> Result<Step> {
    match tracker.end_at(now, settings, sessions) {
        Ok(saved) => {
            write_saved(writer, journal, &saved)?;
            Ok(Step::Done)
        }
        Err(TrackerError::InsufficientData) => {
            writeln!(
                writer,
                "Add at least one reading before ending, or 'cancel' to discard."
            )?;
            Ok(Step::Continue)
        }
        Err(TrackerError::Persist(err)) => {
            tracing::warn!(error = %err, "failed to save session");
            writeln!(
                writer,
                "Could not save the session ({err}). Type 'end' to retry or 'cancel' to discard."
            )?;
            Ok(Step::Continue)
        }
        Err(err @ TrackerError::NotRecording) => Err(err.into()),
    }
}

fn write_saved<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    session: &Stored<HeartRateSession>,
) -> Result<()> {
    writeln!(writer, "Saved session {}", session.id)?;
    write_session(writer, journal, session, "  ")?;
    Ok(())
}

fn write_session<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    session: &HeartRateSession,
    indent: &str,
) -> Result<()> {
    let end = session
        .end_time
        .map_or_else(|| "?".to_string(), |end| clock(journal.calendar(), end));
    writeln!(
        writer,
        "{indent}{}-{}  {} min  {} readings",
        clock(journal.calendar(), session.start_time),
        end,
        session.duration,
        session.readings.len()
    )?;
    writeln!(
        writer,
        "{indent}avg {} bpm (min {}, max {}), {} kcal",
        session.avg_heart_rate,
        session.min_heart_rate,
        session.max_heart_rate,
        session.calories_burned
    )?;
    Ok(())
}

pub fn remove<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    id: &str,
) -> Result<()> {
    remove_record(writer, &journal.heart_rate(), id, "session")
}

pub fn clear<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
) -> Result<()> {
    clear_day(writer, &journal.heart_rate(), journal.calendar(), day, "sessions")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionDay {
    day: NaiveDate,
    summary: HeartRateSummary,
    sessions: Vec<Stored<HeartRateSession>>,
}

/// Prints the sessions of `day` with daily totals.
pub fn today<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
    json: bool,
) -> Result<()> {
    let sessions = journal.heart_rate().list_by_day(journal.calendar(), day);
    let summary = journal.daily_summary(day).heart_rate;

    if json {
        return write_json(
            writer,
            &SessionDay {
                day,
                summary,
                sessions,
            },
        );
    }

    writeln!(writer, "Heart rate for {day}")?;
    if sessions.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{} sessions, {} min, {} kcal, avg {} bpm",
        summary.total_sessions,
        summary.total_duration,
        summary.total_calories,
        summary.avg_heart_rate
    )?;
    for session in &sessions {
        writeln!(writer)?;
        writeln!(writer, "{}", session.id)?;
        write_session(writer, journal, session, "  ")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::Duration;
    use insta::assert_snapshot;
    use vt_core::Calendar;
    use vt_db::KeyValueStore;

    fn journal() -> Journal<Database, Utc> {
        Journal::new(Database::open_in_memory().unwrap(), Calendar::new(Utc))
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// A clock that advances five minutes on every call.
    fn ticking(start: &str) -> impl FnMut() -> DateTime<Utc> {
        let mut next = at(start);
        move || {
            let current = next;
            next += Duration::minutes(5);
            current
        }
    }

    fn run(journal: &Journal<Database, Utc>, input: &str) -> String {
        let mut out = Vec::new();
        record(
            Cursor::new(input.to_string()),
            &mut out,
            journal,
            ticking("2024-05-01T07:00:00Z"),
        )
        .unwrap();
        let sessions = journal.heart_rate().list_all();
        let mut out = String::from_utf8(out).unwrap();
        for session in &sessions {
            out = out.replace(session.id.as_str(), "[ID]");
        }
        out
    }

    #[test]
    fn records_and_saves_session() {
        let journal = journal();
        let out = run(&journal, "130\n150\n140\nend\n");

        assert_snapshot!(out, @r"
        Recording started at 07:00. Enter bpm (40-220), 'end' to save or 'cancel' to discard.
        130 bpm (1 readings)
        150 bpm (2 readings)
        140 bpm (3 readings)
        Saved session [ID]
          07:00-07:20  20 min  3 readings
          avg 140 bpm (min 130, max 150), 90 kcal
        ");
        let sessions = journal.heart_rate().list_all();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration, 20);
    }

    #[test]
    fn invalid_lines_do_not_stop_recording() {
        let journal = journal();
        let out = run(&journal, "abc\n300\n\n72\nend\n");

        assert_snapshot!(out, @r#"
        Recording started at 07:00. Enter bpm (40-220), 'end' to save or 'cancel' to discard.
        Ignored "abc": enter a heart rate between 40 and 220 bpm.
        Ignored "300": enter a heart rate between 40 and 220 bpm.
        72 bpm (1 readings)
        Saved session [ID]
          07:00-07:10  10 min  1 readings
          avg 72 bpm (min 72, max 72), 27 kcal
        "#);
    }

    #[test]
    fn end_without_readings_keeps_recording() {
        let journal = journal();
        let out = run(&journal, "end\ncancel\n");

        assert_snapshot!(out, @r"
        Recording started at 07:00. Enter bpm (40-220), 'end' to save or 'cancel' to discard.
        Add at least one reading before ending, or 'cancel' to discard.
        Session discarded (0 readings).
        ");
        assert!(journal.heart_rate().list_all().is_empty());
    }

    #[test]
    fn cancel_discards_readings() {
        let journal = journal();
        let out = run(&journal, "100\n110\ncancel\n120\n");
        assert!(out.ends_with("Session discarded (2 readings).\n"));
        assert!(journal.heart_rate().list_all().is_empty());
    }

    #[test]
    fn end_of_input_saves_or_discards() {
        let journal = journal();
        run(&journal, "100\n");
        assert_eq!(journal.heart_rate().list_all().len(), 1);

        let journal = self::journal();
        let out = run(&journal, "");
        assert!(out.ends_with("No readings recorded, session discarded.\n"));
        assert!(journal.heart_rate().list_all().is_empty());
    }

    #[test]
    fn unsaved_session_can_be_retried() {
        let journal = journal();
        journal.store().set("heart_rate_sessions", "garbage").unwrap();

        let out = run(&journal, "120\nend\ncancel\n");

        assert!(out.contains("Could not save the session"));
        assert!(out.ends_with("Session discarded (1 readings).\n"));
        assert_eq!(
            journal.store().get("heart_rate_sessions").unwrap().as_deref(),
            Some("garbage")
        );
    }

    #[test]
    fn today_lists_sessions() {
        let journal = journal();
        run(&journal, "130\n150\n140\nend\n");
        let id = journal.heart_rate().list_all()[0].id.to_string();

        let mut out = Vec::new();
        today(
            &mut out,
            &journal,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            false,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap().replace(&id, "[ID]");

        assert_snapshot!(out, @r"
        Heart rate for 2024-05-01
        1 sessions, 20 min, 90 kcal, avg 140 bpm

        [ID]
          07:00-07:20  20 min  3 readings
          avg 140 bpm (min 130, max 150), 90 kcal
        ");
    }
}
