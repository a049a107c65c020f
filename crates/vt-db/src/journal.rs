//! The service object tying storage and the calendar together.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use vt_core::{
    Calendar, DailySummary, HeartRateSession, HeartRateSettings, Meal, MealSettings, Milliliters,
    Record, SessionTracker, Settings, Stored, WaterLog, WaterSettings, heart_rate_summary,
    meal_summary, water_summary,
};

use crate::settings::settings_key;
use crate::{Database, DbError, EventLog, KeyValueStore, SettingsStore};

/// A health journal: the record logs and settings in one store, bucketed by
/// one calendar.
///
/// Logs and the settings store are cheap borrowed views; create them as
/// needed with [`meals`](Self::meals), [`water`](Self::water),
/// [`heart_rate`](Self::heart_rate) and [`settings`](Self::settings).
pub struct Journal<S = Database, Tz: TimeZone = Local> {
    store: S,
    calendar: Calendar<Tz>,
}

impl<S: KeyValueStore, Tz: TimeZone> Journal<S, Tz> {
    pub const fn new(store: S, calendar: Calendar<Tz>) -> Self {
        Self { store, calendar }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn calendar(&self) -> &Calendar<Tz> {
        &self.calendar
    }

    /// The current day in the journal's calendar.
    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    pub const fn meals(&self) -> EventLog<'_, Meal, S> {
        EventLog::new(&self.store)
    }

    pub const fn water(&self) -> EventLog<'_, WaterLog, S> {
        EventLog::new(&self.store)
    }

    pub const fn heart_rate(&self) -> EventLog<'_, HeartRateSession, S> {
        EventLog::new(&self.store)
    }

    pub const fn settings(&self) -> SettingsStore<'_, S> {
        SettingsStore::new(&self.store)
    }

    /// An idle session tracker dating sessions on this journal's calendar.
    pub fn session_tracker(&self) -> SessionTracker<Tz> {
        SessionTracker::new(self.calendar.clone())
    }

    /// Logs a drink taken at `at`.
    pub fn log_water(
        &self,
        amount: Milliliters,
        at: DateTime<Utc>,
    ) -> Result<Stored<WaterLog>, DbError> {
        self.water().append(WaterLog::new(amount, at, &self.calendar))
    }

    /// Summarizes everything recorded on `day` against the current goals.
    pub fn daily_summary(&self, day: NaiveDate) -> DailySummary {
        let meals = self.meals().list_by_day(&self.calendar, day);
        let water = self.water().list_by_day(&self.calendar, day);
        let sessions = self.heart_rate().list_by_day(&self.calendar, day);
        let settings = self.settings();
        let meal_goal = settings.get::<MealSettings>().daily_calorie_goal;
        let water_goal = settings.get::<WaterSettings>().daily_goal;

        DailySummary {
            day,
            meals: meal_summary(meals.iter().map(|m| &m.record), meal_goal),
            water: water_summary(water.iter().map(|w| &w.record), water_goal),
            heart_rate: heart_rate_summary(sessions.iter().map(|s| &s.record)),
        }
    }

    /// Removes every meal, water log and session. Settings are kept.
    pub fn clear_records(&self) -> Result<(), DbError> {
        self.store
            .multi_remove(&[Meal::LOG, WaterLog::LOG, HeartRateSession::LOG])?;
        tracing::info!("cleared all records");
        Ok(())
    }

    /// Restores default settings in every domain.
    pub fn reset_settings(&self) -> Result<(), DbError> {
        let keys = [
            settings_key(MealSettings::DOMAIN),
            settings_key(WaterSettings::DOMAIN),
            settings_key(HeartRateSettings::DOMAIN),
        ];
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.store.multi_remove(&keys)?;
        tracing::info!("reset settings to defaults");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vt_core::{Bpm, Food, Macronutrients, MealType};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    fn journal() -> Journal<Database, Utc> {
        Journal::new(
            Database::open_in_memory().expect("open in-memory db"),
            Calendar::new(Utc),
        )
    }

    fn ml(amount: u32) -> Milliliters {
        Milliliters::new(amount).expect("valid amount")
    }

    fn meal(calories: u32, at_time: &str) -> Meal {
        Meal::new(
            MealType::Lunch,
            vec![Food::new(
                "plate",
                calories,
                Macronutrients {
                    protein: 20.0,
                    carbs: 50.0,
                    fat: 10.0,
                },
            )],
            at(at_time),
        )
    }

    #[test]
    fn daily_summary_of_empty_day() {
        let journal = journal();
        let summary = journal.daily_summary(day("2024-05-01"));
        assert_eq!(summary.water.total, 0);
        assert_eq!(summary.water.percentage, 0);
        assert_eq!(summary.water.remaining, 3000);
        assert_eq!(summary.meals.calories, 0);
        assert_eq!(summary.meals.remaining, 2000);
        assert_eq!(summary.heart_rate.total_sessions, 0);
    }

    #[test]
    fn daily_summary_counts_only_that_day() {
        let journal = journal();
        journal
            .log_water(ml(500), at("2024-04-30T23:59:00Z"))
            .expect("log water");
        journal
            .log_water(ml(750), at("2024-05-01T00:01:00Z"))
            .expect("log water");
        journal
            .log_water(ml(750), at("2024-05-01T12:00:00Z"))
            .expect("log water");
        journal
            .meals()
            .append(meal(2500, "2024-05-01T13:00:00Z"))
            .expect("append meal");

        let summary = journal.daily_summary(day("2024-05-01"));

        assert_eq!(summary.water.total, 1500);
        assert_eq!(summary.water.entries, 2);
        assert_eq!(summary.water.percentage, 50);
        assert_eq!(summary.meals.calories, 2500);
        assert_eq!(summary.meals.percentage, 125);
        assert!(summary.meals.over_goal());
    }

    #[test]
    fn daily_summary_uses_stored_goals() {
        let journal = journal();
        journal
            .settings()
            .set(&WaterSettings {
                daily_goal: 2000,
                ..WaterSettings::default()
            })
            .expect("set settings");
        journal
            .log_water(ml(2500), at("2024-05-01T09:00:00Z"))
            .expect("log water");

        let summary = journal.daily_summary(day("2024-05-01"));
        assert_eq!(summary.water.daily_goal, 2000);
        assert_eq!(summary.water.percentage, 100);
        assert_eq!(summary.water.remaining, 0);
    }

    #[test]
    fn clear_records_keeps_settings() {
        let journal = journal();
        journal
            .settings()
            .set(&MealSettings {
                daily_calorie_goal: 1800,
                ..MealSettings::default()
            })
            .expect("set settings");
        journal
            .log_water(ml(250), at("2024-05-01T09:00:00Z"))
            .expect("log water");
        journal
            .meals()
            .append(meal(400, "2024-05-01T12:00:00Z"))
            .expect("append meal");

        journal.clear_records().expect("clear");

        assert!(journal.water().list_all().is_empty());
        assert!(journal.meals().list_all().is_empty());
        assert_eq!(
            journal.settings().get::<MealSettings>().daily_calorie_goal,
            1800
        );
    }

    #[test]
    fn reset_settings_keeps_records() {
        let journal = journal();
        journal
            .settings()
            .set(&MealSettings {
                daily_calorie_goal: 1800,
                ..MealSettings::default()
            })
            .expect("set settings");
        journal
            .log_water(ml(250), at("2024-05-01T09:00:00Z"))
            .expect("log water");

        journal.reset_settings().expect("reset");

        assert_eq!(journal.settings().get::<MealSettings>(), MealSettings::default());
        assert_eq!(journal.water().list_all().len(), 1);
    }

    #[test]
    fn tracker_sessions_land_in_the_heart_rate_log() {
        let journal = journal();
        let mut tracker = journal.session_tracker();
        tracker.start_at(at("2024-05-01T18:00:00Z"));
        tracker
            .add_reading_at(Bpm::new(140).expect("bpm"), at("2024-05-01T18:10:00Z"))
            .expect("reading");
        let settings = journal.settings().get::<HeartRateSettings>();
        tracker
            .end_at(at("2024-05-01T18:30:00Z"), &settings, &journal.heart_rate())
            .expect("end session");

        let summary = journal.daily_summary(day("2024-05-01"));
        assert_eq!(summary.heart_rate.total_sessions, 1);
        assert_eq!(summary.heart_rate.total_duration, 30);
        assert_eq!(summary.heart_rate.avg_heart_rate, 140);
        assert_eq!(summary.heart_rate.total_calories, 135);
    }
}
