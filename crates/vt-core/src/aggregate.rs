//! Daily totals and derived statistics.
//!
//! All functions here are pure: they take a day's records and settings and
//! return summaries. Empty inputs yield zeroed summaries, and a zero goal
//! never divides.

use chrono::NaiveDate;
use serde::Serialize;

use crate::heart_rate::{HeartRateReading, HeartRateSession};
use crate::meal::{Macronutrients, Meal};
use crate::water::WaterLog;

/// Resting heart rate assumed by the calorie estimate.
pub const RESTING_HEART_RATE: f64 = 60.0;

/// Returns `round(100 * consumed / goal)`, or `None` when `goal` is zero.
///
/// Rounds half up in integer arithmetic.
pub fn percentage_of(consumed: u32, goal: u32) -> Option<u32> {
    if goal == 0 {
        return None;
    }
    let (consumed, goal) = (u64::from(consumed), u64::from(goal));
    let rounded = (200 * consumed + goal) / (2 * goal);
    Some(u32::try_from(rounded).unwrap_or(u32::MAX))
}

/// Rounded mean of a list of integers, half up. `None` for an empty list.
fn rounded_mean(values: impl IntoIterator<Item = u32>) -> Option<u32> {
    let (sum, count) = values
        .into_iter()
        .fold((0_u64, 0_u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        return None;
    }
    u32::try_from((2 * sum + count) / (2 * count)).ok()
}

/// Water intake for one day against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSummary {
    pub total: u32,
    pub daily_goal: u32,
    /// Share of the goal reached, capped at 100.
    pub percentage: u32,
    pub remaining: u32,
    pub entries: usize,
}

/// Sums a day's water logs.
pub fn water_summary<'a>(
    logs: impl IntoIterator<Item = &'a WaterLog>,
    daily_goal: u32,
) -> WaterSummary {
    let (total, entries) = logs.into_iter().fold((0_u32, 0_usize), |(total, n), log| {
        (total.saturating_add(log.amount.get()), n + 1)
    });
    WaterSummary {
        total,
        daily_goal,
        percentage: percentage_of(total, daily_goal).unwrap_or(0).min(100),
        remaining: daily_goal.saturating_sub(total),
        entries,
    }
}

/// Calories and macronutrients for one day against the calorie goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummary {
    pub calories: u32,
    pub calorie_goal: u32,
    /// Share of the goal consumed. Not capped: values above 100 mean the goal
    /// was exceeded.
    pub percentage: u32,
    pub remaining: u32,
    pub macronutrients: Macronutrients,
    pub meals: usize,
}

impl MealSummary {
    pub const fn over_goal(&self) -> bool {
        self.calories > self.calorie_goal
    }
}

/// Sums a day's meals.
pub fn meal_summary<'a>(
    meals: impl IntoIterator<Item = &'a Meal>,
    calorie_goal: u32,
) -> MealSummary {
    let mut calories = 0_u32;
    let mut macronutrients = Macronutrients::default();
    let mut count = 0;
    for meal in meals {
        calories = calories.saturating_add(meal.total_calories);
        macronutrients += meal.macronutrients();
        count += 1;
    }
    MealSummary {
        calories,
        calorie_goal,
        percentage: percentage_of(calories, calorie_goal).unwrap_or(0),
        remaining: calorie_goal.saturating_sub(calories),
        macronutrients,
        meals: count,
    }
}

/// Statistics over the readings of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingStats {
    pub avg: u16,
    pub min: u16,
    pub max: u16,
}

impl ReadingStats {
    /// Computes average, minimum and maximum bpm. `None` when there are no
    /// readings.
    pub fn from_readings(readings: &[HeartRateReading]) -> Option<Self> {
        let min = readings.iter().map(|r| r.bpm.get()).min()?;
        let max = readings.iter().map(|r| r.bpm.get()).max()?;
        let avg = rounded_mean(readings.iter().map(|r| u32::from(r.bpm.get())))?;
        Some(Self {
            avg: u16::try_from(avg).unwrap_or(max),
            min,
            max,
        })
    }
}

/// Estimates calories burned with a Karvonen heart-rate-reserve heuristic.
///
/// Resting heart rate is assumed to be 60 bpm. Intensity is clamped to
/// \[0, 1\]; a non-positive heart-rate reserve, a zero average or a
/// non-positive duration give 0.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "result is clamped to be non-negative and finite before the cast"
)]
pub fn karvonen_calories(
    weight_kg: u16,
    age_years: u16,
    avg_heart_rate: u16,
    duration_minutes: f64,
) -> u32 {
    if avg_heart_rate == 0 || duration_minutes.is_nan() || duration_minutes <= 0.0 {
        return 0;
    }
    let max_heart_rate = 220.0 - f64::from(age_years);
    let reserve = max_heart_rate - RESTING_HEART_RATE;
    if reserve <= 0.0 {
        return 0;
    }
    let intensity = ((f64::from(avg_heart_rate) - RESTING_HEART_RATE) / reserve).clamp(0.0, 1.0);
    let calories =
        0.6_f64.mul_add(intensity, 0.4) * 5.0 * f64::from(weight_kg) * duration_minutes / 60.0;
    calories.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Totals over all sessions of one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSummary {
    pub total_sessions: usize,
    /// Sum of session durations in minutes.
    pub total_duration: u32,
    pub total_calories: u32,
    /// Rounded mean of the sessions' average heart rates.
    pub avg_heart_rate: u16,
}

/// Sums a day's heart-rate sessions.
pub fn heart_rate_summary<'a>(
    sessions: impl IntoIterator<Item = &'a HeartRateSession>,
) -> HeartRateSummary {
    let mut summary = HeartRateSummary::default();
    let mut averages = Vec::new();
    for session in sessions {
        summary.total_sessions += 1;
        summary.total_duration = summary.total_duration.saturating_add(session.duration);
        summary.total_calories = summary
            .total_calories
            .saturating_add(session.calories_burned);
        averages.push(u32::from(session.avg_heart_rate));
    }
    summary.avg_heart_rate = rounded_mean(averages)
        .and_then(|avg| u16::try_from(avg).ok())
        .unwrap_or(0);
    summary
}

/// Everything recorded on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub day: NaiveDate,
    pub meals: MealSummary,
    pub water: WaterSummary,
    pub heart_rate: HeartRateSummary,
}
