//! `vt settings`: showing and changing per-domain settings.
//!
//! Every change reads the current record, applies the given flags and stores
//! the whole record again.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::TimeZone;
use vt_core::{
    AgeYears, HeartRateSettings, MealSettings, ReminderTime, Settings, Units, WaterSettings,
    WeightKg,
};
use vt_db::{Database, Journal};

/// Requested changes to meal settings.
#[derive(Debug, Default)]
pub struct MealChanges {
    pub goal: Option<u32>,
    pub units: Option<Units>,
}

/// Requested changes to water settings.
#[derive(Debug, Default)]
pub struct WaterChanges {
    pub goal: Option<u32>,
    pub hourly: Option<bool>,
    pub custom: Option<bool>,
    pub times: Option<Vec<ReminderTime>>,
}

/// Requested changes to heart-rate settings.
#[derive(Debug, Default)]
pub struct HeartRateChanges {
    pub weight: Option<u16>,
    pub age: Option<u16>,
    pub calories: Option<bool>,
}

pub fn show<W: Write, Tz: TimeZone>(writer: &mut W, journal: &Journal<Database, Tz>) -> Result<()> {
    let settings = journal.settings();
    write_meal(writer, &settings.get())?;
    writeln!(writer)?;
    write_water(writer, &settings.get())?;
    writeln!(writer)?;
    write_heart_rate(writer, &settings.get())?;
    Ok(())
}

pub fn meal<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    changes: MealChanges,
) -> Result<()> {
    let mut settings: MealSettings = journal.settings().get();
    if let Some(goal) = changes.goal {
        settings.daily_calorie_goal = goal;
    }
    if let Some(units) = changes.units {
        settings.preferred_units = units;
    }
    save(journal, &settings)?;
    write_meal(writer, &settings)
}

pub fn water<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    changes: WaterChanges,
) -> Result<()> {
    let mut settings: WaterSettings = journal.settings().get();
    if let Some(goal) = changes.goal {
        settings.daily_goal = goal;
    }
    if let Some(hourly) = changes.hourly {
        settings.enable_hourly_reminders = hourly;
    }
    if let Some(custom) = changes.custom {
        settings.enable_custom_reminders = custom;
    }
    if let Some(mut times) = changes.times {
        times.sort();
        times.dedup();
        settings.custom_reminder_times = times;
    }
    save(journal, &settings)?;
    write_water(writer, &settings)
}

pub fn heart_rate<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    changes: HeartRateChanges,
) -> Result<()> {
    let mut settings: HeartRateSettings = journal.settings().get();
    if let Some(weight) = changes.weight {
        settings.weight = WeightKg::new(weight)?;
    }
    if let Some(age) = changes.age {
        settings.age = AgeYears::new(age)?;
    }
    if let Some(calories) = changes.calories {
        settings.enable_calorie_calculation = calories;
    }
    save(journal, &settings)?;
    write_heart_rate(writer, &settings)
}

pub fn reset<W: Write, Tz: TimeZone>(writer: &mut W, journal: &Journal<Database, Tz>) -> Result<()> {
    journal
        .reset_settings()
        .context("failed to reset settings")?;
    writeln!(writer, "Settings restored to defaults.")?;
    Ok(())
}

fn save<T: Settings, Tz: TimeZone>(journal: &Journal<Database, Tz>, settings: &T) -> Result<()> {
    journal
        .settings()
        .set(settings)
        .with_context(|| format!("failed to save {} settings", T::DOMAIN))
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn write_meal<W: Write>(writer: &mut W, settings: &MealSettings) -> Result<()> {
    writeln!(writer, "Meal")?;
    writeln!(writer, "  daily calorie goal: {} kcal", settings.daily_calorie_goal)?;
    writeln!(writer, "  units: {}", settings.preferred_units)?;
    Ok(())
}

fn write_water<W: Write>(writer: &mut W, settings: &WaterSettings) -> Result<()> {
    let times: Vec<String> = settings
        .custom_reminder_times
        .iter()
        .map(ToString::to_string)
        .collect();
    writeln!(writer, "Water")?;
    writeln!(writer, "  daily goal: {} ml", settings.daily_goal)?;
    writeln!(
        writer,
        "  hourly reminders: {}",
        on_off(settings.enable_hourly_reminders)
    )?;
    writeln!(
        writer,
        "  custom reminders: {} ({})",
        on_off(settings.enable_custom_reminders),
        if times.is_empty() {
            "none".to_string()
        } else {
            times.join(", ")
        }
    )?;
    Ok(())
}

fn write_heart_rate<W: Write>(writer: &mut W, settings: &HeartRateSettings) -> Result<()> {
    writeln!(writer, "Heart rate")?;
    writeln!(writer, "  weight: {} kg", settings.weight)?;
    writeln!(writer, "  age: {}", settings.age)?;
    writeln!(
        writer,
        "  calorie estimate: {}",
        on_off(settings.enable_calorie_calculation)
    )?;
    Ok(())
}
