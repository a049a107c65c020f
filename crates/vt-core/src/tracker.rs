//! Heart-rate session recording state machine.
//!
//! A [`SessionTracker`] is either idle or recording exactly one session.
//! Readings accumulate in memory while recording; ending the session derives
//! its statistics and hands it to a [`SessionSink`] for persistence, while
//! cancelling drops it without a trace.
//!
//! ```text
//! Idle --start--> Recording --end (>= 1 reading, saved)--> Idle
//!                     |
//!                     +--cancel--> Idle
//! ```

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::aggregate::{ReadingStats, karvonen_calories};
use crate::day::Calendar;
use crate::heart_rate::{HeartRateReading, HeartRateSession};
use crate::record::Stored;
use crate::settings::HeartRateSettings;
use crate::types::Bpm;

/// Errors from session tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The operation needs an active recording.
    #[error("no session is being recorded")]
    NotRecording,
    /// The session has no readings to summarize.
    #[error("session has no heart rate readings")]
    InsufficientData,
    /// The finished session could not be saved; it is still being recorded.
    #[error("failed to save session")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where finished sessions are persisted.
pub trait SessionSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stores a finished session and returns it with its assigned ID.
    fn save_session(
        &self,
        session: HeartRateSession,
    ) -> Result<Stored<HeartRateSession>, Self::Error>;
}

/// Observable state of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Recording,
}

/// The session currently being recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    date: NaiveDate,
    started_at: DateTime<Utc>,
    readings: Vec<HeartRateReading>,
}

impl ActiveSession {
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn readings(&self) -> &[HeartRateReading] {
        &self.readings
    }

    pub fn last_reading(&self) -> Option<&HeartRateReading> {
        self.readings.last()
    }

    /// Time elapsed since the start, never negative.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.started_at).max(chrono::Duration::zero())
    }

    /// Derives the finished session as of `now` without consuming the
    /// recording.
    pub fn finish_at(
        &self,
        now: DateTime<Utc>,
        settings: &HeartRateSettings,
    ) -> Result<HeartRateSession, TrackerError> {
        let stats = ReadingStats::from_readings(&self.readings).ok_or(TrackerError::InsufficientData)?;
        let minutes = elapsed_minutes(self.elapsed_at(now));
        let calories_burned = if settings.enable_calorie_calculation {
            karvonen_calories(
                settings.weight.get(),
                settings.age.get(),
                stats.avg,
                minutes,
            )
        } else {
            0
        };

        Ok(HeartRateSession {
            date: self.date,
            start_time: self.started_at,
            end_time: Some(now),
            readings: self.readings.clone(),
            duration: whole_minutes(minutes),
            avg_heart_rate: stats.avg,
            min_heart_rate: stats.min,
            max_heart_rate: stats.max,
            calories_burned,
        })
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "session lengths are far below f64's exact integer range"
)]
fn elapsed_minutes(elapsed: chrono::Duration) -> f64 {
    elapsed.num_milliseconds() as f64 / 60_000.0
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "minutes are non-negative and clamped to u32 range"
)]
fn whole_minutes(minutes: f64) -> u32 {
    minutes.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Records at most one heart-rate session at a time.
#[derive(Debug, Clone)]
pub struct SessionTracker<Tz: TimeZone = Local> {
    calendar: Calendar<Tz>,
    current: Option<ActiveSession>,
}

impl Default for SessionTracker<Local> {
    fn default() -> Self {
        Self::new(Calendar::local())
    }
}

impl<Tz: TimeZone> SessionTracker<Tz> {
    /// Creates an idle tracker that dates sessions on `calendar`.
    pub const fn new(calendar: Calendar<Tz>) -> Self {
        Self {
            calendar,
            current: None,
        }
    }

    pub const fn state(&self) -> TrackerState {
        if self.current.is_some() {
            TrackerState::Recording
        } else {
            TrackerState::Idle
        }
    }

    /// The session being recorded, if any.
    pub const fn current(&self) -> Option<&ActiveSession> {
        self.current.as_ref()
    }

    /// Starts recording now. See [`start_at`](Self::start_at).
    pub fn start(&mut self) -> bool {
        self.start_at(Utc::now())
    }

    /// Starts a new session at `now`.
    ///
    /// Returns `false` and leaves the running session untouched if one is
    /// already being recorded.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.current.is_some() {
            tracing::debug!("start ignored, session already recording");
            return false;
        }
        let session = ActiveSession {
            date: self.calendar.day_key(now),
            started_at: now,
            readings: Vec::new(),
        };
        tracing::debug!(started_at = %now, date = %session.date, "session started");
        self.current = Some(session);
        true
    }

    /// Adds a reading taken now. See [`add_reading_at`](Self::add_reading_at).
    pub fn add_reading(&mut self, bpm: Bpm) -> Result<(), TrackerError> {
        self.add_reading_at(bpm, Utc::now())
    }

    /// Appends a reading to the running session.
    pub fn add_reading_at(&mut self, bpm: Bpm, now: DateTime<Utc>) -> Result<(), TrackerError> {
        let session = self.current.as_mut().ok_or(TrackerError::NotRecording)?;
        session.readings.push(HeartRateReading::new(bpm, now));
        tracing::debug!(%bpm, readings = session.readings.len(), "reading added");
        Ok(())
    }

    /// Ends the session now. See [`end_at`](Self::end_at).
    pub fn end<S: SessionSink>(
        &mut self,
        settings: &HeartRateSettings,
        sink: &S,
    ) -> Result<Stored<HeartRateSession>, TrackerError> {
        self.end_at(Utc::now(), settings, sink)
    }

    /// Finishes the running session at `now` and saves it through `sink`.
    ///
    /// With no readings this returns [`TrackerError::InsufficientData`] and
    /// keeps recording. If saving fails the session also keeps recording, so
    /// the caller can retry or cancel.
    pub fn end_at<S: SessionSink>(
        &mut self,
        now: DateTime<Utc>,
        settings: &HeartRateSettings,
        sink: &S,
    ) -> Result<Stored<HeartRateSession>, TrackerError> {
        let active = self.current.as_ref().ok_or(TrackerError::NotRecording)?;
        let session = active.finish_at(now, settings)?;
        let saved = sink
            .save_session(session)
            .map_err(|err| TrackerError::Persist(Box::new(err)))?;
        self.current = None;
        tracing::debug!(
            id = %saved.id,
            duration = saved.duration,
            avg = saved.avg_heart_rate,
            calories = saved.calories_burned,
            "session saved"
        );
        Ok(saved)
    }

    /// Drops the running session without saving it.
    pub fn cancel(&mut self) -> Result<ActiveSession, TrackerError> {
        let session = self.current.take().ok_or(TrackerError::NotRecording)?;
        tracing::debug!(readings = session.readings.len(), "session cancelled");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use crate::types::{AgeYears, RecordId, WeightKg};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn bpm(value: u16) -> Bpm {
        Bpm::new(value).unwrap()
    }

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    /// In-memory sink that can be told to fail.
    #[derive(Default)]
    struct MemorySink {
        saved: RefCell<Vec<Stored<HeartRateSession>>>,
        fail: bool,
    }

    impl SessionSink for MemorySink {
        type Error = DiskFull;

        fn save_session(
            &self,
            session: HeartRateSession,
        ) -> Result<Stored<HeartRateSession>, DiskFull> {
            if self.fail {
                return Err(DiskFull);
            }
            let id = RecordId::new(format!("s{}", self.saved.borrow().len() + 1)).unwrap();
            let stored = Stored::new(id, session);
            self.saved.borrow_mut().push(stored.clone());
            Ok(stored)
        }
    }

    fn tracker() -> SessionTracker<Utc> {
        SessionTracker::new(Calendar::new(Utc))
    }

    #[test]
    fn starts_idle() {
        let tracker = tracker();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.current().is_none());
    }

    #[test]
    fn start_is_a_noop_while_recording() {
        let mut tracker = tracker();
        assert!(tracker.start_at(at("2024-01-01T07:00:00Z")));
        tracker
            .add_reading_at(bpm(90), at("2024-01-01T07:01:00Z"))
            .unwrap();

        assert!(!tracker.start_at(at("2024-01-01T07:05:00Z")));
        let current = tracker.current().unwrap();
        assert_eq!(current.started_at(), at("2024-01-01T07:00:00Z"));
        assert_eq!(current.readings().len(), 1);
    }

    #[test]
    fn add_reading_requires_recording() {
        let mut tracker = tracker();
        let result = tracker.add_reading_at(bpm(80), at("2024-01-01T07:00:00Z"));
        assert!(matches!(result, Err(TrackerError::NotRecording)));
    }

    #[test]
    fn end_without_readings_keeps_recording() {
        let mut tracker = tracker();
        let sink = MemorySink::default();
        tracker.start_at(at("2024-01-01T07:00:00Z"));

        let result = tracker.end_at(
            at("2024-01-01T07:10:00Z"),
            &HeartRateSettings::default(),
            &sink,
        );

        assert!(matches!(result, Err(TrackerError::InsufficientData)));
        assert_eq!(tracker.state(), TrackerState::Recording);
        assert!(sink.saved.borrow().is_empty());
    }

    #[test]
    fn end_derives_statistics_and_saves() {
        let mut tracker = tracker();
        let sink = MemorySink::default();
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        for (value, time) in [
            (130, "2024-01-01T07:05:00Z"),
            (150, "2024-01-01T07:15:00Z"),
            (140, "2024-01-01T07:25:00Z"),
        ] {
            tracker.add_reading_at(bpm(value), at(time)).unwrap();
        }

        let saved = tracker
            .end_at(
                at("2024-01-01T07:30:00Z"),
                &HeartRateSettings::default(),
                &sink,
            )
            .unwrap();

        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(saved.id.as_str(), "s1");
        assert_eq!(saved.duration, 30);
        assert_eq!(saved.avg_heart_rate, 140);
        assert_eq!(saved.min_heart_rate, 130);
        assert_eq!(saved.max_heart_rate, 150);
        assert_eq!(saved.calories_burned, 135);
        assert_eq!(saved.end_time, Some(at("2024-01-01T07:30:00Z")));
        assert_eq!(saved.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let bpms: Vec<u16> = saved.readings.iter().map(|r| r.bpm.get()).collect();
        assert_eq!(bpms, [130, 150, 140]);
        assert_eq!(sink.saved.borrow().len(), 1);
    }

    #[test]
    fn disabled_calorie_calculation_gives_zero() {
        let mut tracker = tracker();
        let sink = MemorySink::default();
        let settings = HeartRateSettings {
            enable_calorie_calculation: false,
            ..HeartRateSettings::default()
        };
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        tracker
            .add_reading_at(bpm(160), at("2024-01-01T07:10:00Z"))
            .unwrap();

        let saved = tracker
            .end_at(at("2024-01-01T07:40:00Z"), &settings, &sink)
            .unwrap();
        assert_eq!(saved.calories_burned, 0);
    }

    #[test]
    fn calories_use_configured_weight_and_age() {
        let mut tracker = tracker();
        let sink = MemorySink::default();
        let settings = HeartRateSettings {
            weight: WeightKg::new(100).unwrap(),
            age: AgeYears::new(40).unwrap(),
            enable_calorie_calculation: true,
        };
        tracker.start_at(at("2024-01-01T18:00:00Z"));
        tracker
            .add_reading_at(bpm(150), at("2024-01-01T18:30:00Z"))
            .unwrap();

        let saved = tracker
            .end_at(at("2024-01-01T19:00:00Z"), &settings, &sink)
            .unwrap();
        // reserve 120, intensity 0.75, (0.45 + 0.4) * 5 * 100 * 60 / 60
        assert_eq!(saved.calories_burned, 425);
    }

    #[test]
    fn failed_save_keeps_session_recording() {
        let mut tracker = tracker();
        let sink = MemorySink {
            fail: true,
            ..MemorySink::default()
        };
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        tracker
            .add_reading_at(bpm(100), at("2024-01-01T07:01:00Z"))
            .unwrap();

        let result = tracker.end_at(
            at("2024-01-01T07:02:00Z"),
            &HeartRateSettings::default(),
            &sink,
        );

        assert!(matches!(result, Err(TrackerError::Persist(_))));
        assert_eq!(tracker.state(), TrackerState::Recording);
        assert_eq!(tracker.current().unwrap().readings().len(), 1);
    }

    #[test]
    fn cancel_discards_without_saving() {
        let mut tracker = tracker();
        let sink = MemorySink::default();
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        tracker
            .add_reading_at(bpm(100), at("2024-01-01T07:01:00Z"))
            .unwrap();

        let dropped = tracker.cancel().unwrap();
        assert_eq!(dropped.readings().len(), 1);
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(sink.saved.borrow().is_empty());
        assert!(matches!(tracker.cancel(), Err(TrackerError::NotRecording)));
    }

    #[test]
    fn end_requires_recording() {
        let mut tracker = tracker();
        let result = tracker.end_at(
            at("2024-01-01T07:00:00Z"),
            &HeartRateSettings::default(),
            &MemorySink::default(),
        );
        assert!(matches!(result, Err(TrackerError::NotRecording)));
    }

    #[test]
    fn duration_rounds_to_whole_minutes() {
        let mut tracker = tracker();
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        tracker
            .add_reading_at(bpm(100), at("2024-01-01T07:00:10Z"))
            .unwrap();
        let active = tracker.current().unwrap();

        let settings = HeartRateSettings::default();
        let short = active.finish_at(at("2024-01-01T07:12:29Z"), &settings).unwrap();
        let long = active.finish_at(at("2024-01-01T07:12:30Z"), &settings).unwrap();
        assert_eq!(short.duration, 12);
        assert_eq!(long.duration, 13);
    }

    #[test]
    fn clock_going_backwards_gives_zero_duration() {
        let mut tracker = tracker();
        tracker.start_at(at("2024-01-01T07:00:00Z"));
        tracker
            .add_reading_at(bpm(100), at("2024-01-01T07:00:00Z"))
            .unwrap();
        let finished = tracker
            .current()
            .unwrap()
            .finish_at(at("2024-01-01T06:00:00Z"), &HeartRateSettings::default())
            .unwrap();
        assert_eq!(finished.duration, 0);
        assert_eq!(finished.calories_burned, 0);
    }

    #[test]
    fn session_is_dated_by_its_start() {
        let mut tracker = tracker();
        tracker.start_at(at("2024-01-01T23:50:00Z"));
        tracker
            .add_reading_at(bpm(100), at("2024-01-02T00:05:00Z"))
            .unwrap();
        let finished = tracker
            .current()
            .unwrap()
            .finish_at(at("2024-01-02T00:10:00Z"), &HeartRateSettings::default())
            .unwrap();
        assert_eq!(finished.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
