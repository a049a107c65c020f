//! Core domain logic for the vitals health log.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: meals, water logs and heart-rate sessions
//! - Day bucketing: assigning every record to one local calendar day
//! - Aggregation: daily totals, goal percentages and session statistics
//! - Session tracking: the heart-rate recording state machine
//!
//! Nothing here performs I/O; persistence lives in `vt-db`.

pub mod aggregate;
pub mod analysis;
mod day;
pub mod heart_rate;
pub mod meal;
mod record;
pub mod reminder;
pub mod settings;
pub mod tracker;
pub mod types;
pub mod water;

pub use aggregate::{
    DailySummary, HeartRateSummary, MealSummary, ReadingStats, WaterSummary, heart_rate_summary,
    karvonen_calories, meal_summary, percentage_of, water_summary,
};
pub use analysis::{AnalysisError, FoodAnalysis, parse_analysis};
pub use day::Calendar;
pub use heart_rate::{HeartRateReading, HeartRateSession};
pub use meal::{Food, Macronutrients, Meal};
pub use record::{Record, Stored};
pub use reminder::{Reminder, ReminderKind, plan_reminders};
pub use settings::{HeartRateSettings, MealSettings, Settings, SettingsDomain, WaterSettings};
pub use tracker::{ActiveSession, SessionSink, SessionTracker, TrackerError, TrackerState};
pub use types::{
    AgeYears, Bpm, Confidence, MealType, Milliliters, RecordId, ReminderTime, Units,
    ValidationError, WeightKg,
};
pub use water::WaterLog;
