//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vt_core::{MealType, ReminderTime, Units};

/// Personal health log.
///
/// Records meals, water intake and heart-rate sessions, and summarizes them
/// per calendar day.
#[derive(Debug, Parser)]
#[command(name = "vt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log and review water intake.
    #[command(subcommand)]
    Water(WaterAction),

    /// Log and review meals.
    #[command(subcommand)]
    Meal(MealAction),

    /// Record and review heart-rate sessions.
    #[command(subcommand)]
    Hr(HrAction),

    /// Show or change settings.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Show today's water reminder plan.
    Reminders,

    /// Show today's summary across meals, water and heart rate.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove all meals, water logs and sessions. Settings are kept.
    Clear,
}

/// Water subcommands.
#[derive(Debug, Subcommand)]
pub enum WaterAction {
    /// Log a drink.
    Add {
        /// Amount in milliliters (quick amounts: 250, 500, 750, 1000).
        ml: u32,
    },
    /// Remove a logged drink by ID.
    Remove { id: String },
    /// Show today's water logs.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove today's water logs.
    Clear,
}

/// Meal subcommands.
#[derive(Debug, Subcommand)]
pub enum MealAction {
    /// Log a meal from an image analysis result.
    Add {
        /// Meal of the day.
        #[arg(long = "type", value_name = "TYPE")]
        meal_type: MealType,

        /// URI of the analyzed photo.
        #[arg(long, value_name = "URI")]
        image: Option<String>,

        /// File holding the analysis JSON. Reads stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Remove a logged meal by ID.
    Remove { id: String },
    /// Show today's meals.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove today's meals.
    Clear,
}

/// Heart-rate subcommands.
#[derive(Debug, Subcommand)]
pub enum HrAction {
    /// Record a session interactively.
    ///
    /// Enter one bpm value per line, `end` to save or `cancel` to discard.
    /// End of input saves the session.
    Record,
    /// Remove a session by ID.
    Remove { id: String },
    /// Show today's sessions.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove today's sessions.
    Clear,
}

/// Settings subcommands.
///
/// Flags that are not given keep their current value.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show all settings.
    Show,
    /// Change meal settings.
    Meal(MealSettingsArgs),
    /// Change water settings.
    Water(WaterSettingsArgs),
    /// Change heart-rate settings.
    HeartRate(HeartRateSettingsArgs),
    /// Restore default settings in every domain.
    Reset,
}

#[derive(Debug, Args)]
pub struct MealSettingsArgs {
    /// Daily calorie goal in kcal.
    #[arg(long)]
    pub goal: Option<u32>,

    /// Preferred unit system (metric or imperial).
    #[arg(long)]
    pub units: Option<Units>,
}

#[derive(Debug, Args)]
pub struct WaterSettingsArgs {
    /// Daily water goal in milliliters.
    #[arg(long)]
    pub goal: Option<u32>,

    /// Enable hourly reminders.
    #[arg(long, overrides_with = "no_hourly")]
    pub hourly: bool,

    /// Disable hourly reminders.
    #[arg(long, overrides_with = "hourly")]
    pub no_hourly: bool,

    /// Enable custom reminders.
    #[arg(long, overrides_with = "no_custom")]
    pub custom: bool,

    /// Disable custom reminders.
    #[arg(long, overrides_with = "custom")]
    pub no_custom: bool,

    /// Custom reminder times, comma separated (e.g. 09:00,13:30).
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub times: Option<Vec<ReminderTime>>,
}

#[derive(Debug, Args)]
pub struct HeartRateSettingsArgs {
    /// Body weight in kg.
    #[arg(long)]
    pub weight: Option<u16>,

    /// Age in years.
    #[arg(long)]
    pub age: Option<u16>,

    /// Estimate calories burned.
    #[arg(long, overrides_with = "no_calories")]
    pub calories: bool,

    /// Do not estimate calories burned.
    #[arg(long, overrides_with = "calories")]
    pub no_calories: bool,
}

/// Collapses a `--flag`/`--no-flag` pair into an optional toggle.
pub const fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
