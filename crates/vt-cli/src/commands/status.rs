//! `vt status`: today's summary across meals, water and heart rate.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone};
use vt_db::{Database, Journal};

use super::meal::write_calories;
use super::util::{grams, write_json};

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    database_path: &Path,
    day: NaiveDate,
    json: bool,
) -> Result<()> {
    let summary = journal.daily_summary(day);

    if json {
        return write_json(writer, &summary);
    }

    writeln!(writer, "Health log for {day}")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    writeln!(writer)?;
    let meals = &summary.meals;
    write!(writer, "Meals ({}): ", meals.meals)?;
    write_calories(writer, meals)?;
    writeln!(
        writer,
        "  protein {}, carbs {}, fat {}",
        grams(meals.macronutrients.protein),
        grams(meals.macronutrients.carbs),
        grams(meals.macronutrients.fat)
    )?;

    let water = &summary.water;
    writeln!(
        writer,
        "Water ({}): {} / {} ml ({}%), {} ml to go",
        water.entries, water.total, water.daily_goal, water.percentage, water.remaining
    )?;

    let heart_rate = &summary.heart_rate;
    if heart_rate.total_sessions == 0 {
        writeln!(writer, "Heart rate: no sessions")?;
    } else {
        writeln!(
            writer,
            "Heart rate ({}): {} min, {} kcal, avg {} bpm",
            heart_rate.total_sessions,
            heart_rate.total_duration,
            heart_rate.total_calories,
            heart_rate.avg_heart_rate
        )?;
    }
    Ok(())
}
