//! `vt meal`: logging meals from image analysis results.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use vt_core::{Meal, MealSummary, MealType, Stored, parse_analysis};
use vt_db::{Database, Journal};

use super::util::{clear_day, clock, grams, remove_record, write_json};

/// Parses an analysis response and logs it as a meal eaten at `now`.
pub fn add<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    meal_type: MealType,
    image: Option<String>,
    analysis: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let analysis = parse_analysis(analysis).context("failed to read food analysis")?;
    let mut meal = analysis.into_meal(meal_type, now);
    if let Some(uri) = image {
        meal = meal.with_image_uri(uri);
    }
    let stored = journal
        .meals()
        .append(meal)
        .context("failed to log meal")?;

    writeln!(
        writer,
        "Logged {}: {} kcal ({})",
        stored.meal_type, stored.total_calories, stored.id
    )?;
    write_foods(writer, &stored, "  ")?;
    if let Some(notes) = &stored.analysis_notes {
        writeln!(writer, "Note: {notes}")?;
    }
    Ok(())
}

pub fn remove<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    id: &str,
) -> Result<()> {
    remove_record(writer, &journal.meals(), id, "meal")
}

pub fn clear<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
) -> Result<()> {
    clear_day(writer, &journal.meals(), journal.calendar(), day, "meals")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MealDay {
    day: NaiveDate,
    summary: MealSummary,
    meals: Vec<Stored<Meal>>,
}

/// Prints the meals of `day` with calorie and macronutrient totals.
pub fn today<W: Write, Tz: TimeZone>(
    writer: &mut W,
    journal: &Journal<Database, Tz>,
    day: NaiveDate,
    json: bool,
) -> Result<()> {
    let meals = journal.meals().list_by_day(journal.calendar(), day);
    let summary = journal.daily_summary(day).meals;

    if json {
        return write_json(
            writer,
            &MealDay {
                day,
                summary,
                meals,
            },
        );
    }

    writeln!(writer, "Meals for {day}")?;
    write_calories(writer, &summary)?;
    let macros = summary.macronutrients;
    writeln!(
        writer,
        "Protein {}  Carbs {}  Fat {}",
        grams(macros.protein),
        grams(macros.carbs),
        grams(macros.fat)
    )?;

    if meals.is_empty() {
        writeln!(writer, "No meals logged.")?;
        return Ok(());
    }

    for meal in &meals {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}  {:<9}  {:>5} kcal  {}",
            clock(journal.calendar(), meal.created_at),
            meal.meal_type.as_str(),
            meal.total_calories,
            meal.id
        )?;
        write_foods(writer, meal, "       ")?;
    }
    Ok(())
}

/// Prints calories consumed against the goal. Over-goal days say so.
pub(crate) fn write_calories<W: Write>(writer: &mut W, summary: &MealSummary) -> Result<()> {
    if summary.over_goal() {
        writeln!(
            writer,
            "{} / {} kcal ({}%), {} kcal over goal",
            summary.calories,
            summary.calorie_goal,
            summary.percentage,
            summary.calories - summary.calorie_goal
        )?;
    } else {
        writeln!(
            writer,
            "{} / {} kcal ({}%), {} kcal to go",
            summary.calories, summary.calorie_goal, summary.percentage, summary.remaining
        )?;
    }
    Ok(())
}

fn write_foods<W: Write>(writer: &mut W, meal: &Meal, indent: &str) -> Result<()> {
    for food in &meal.foods {
        write!(writer, "{indent}{}  {} kcal", food.name, food.calories)?;
        if let Some(portion) = &food.portion_size {
            write!(writer, "  ({portion})")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
