use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vt_cli::commands::settings::{HeartRateChanges, MealChanges, WaterChanges};
use vt_cli::commands::{clear, heart_rate, meal, reminders, settings, status, water};
use vt_cli::{Cli, Commands, Config, HrAction, MealAction, SettingsAction, WaterAction, toggle};
use vt_core::Calendar;
use vt_db::{Database, Journal};

/// Load config and open the journal, ensuring the database directory exists.
fn open_journal(config_path: Option<&Path>) -> Result<(Journal, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((Journal::new(db, Calendar::local()), config))
}

fn read_analysis(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read analysis from stdin")?;
            Ok(text)
        }
    }
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (journal, config) = open_journal(cli.config.as_deref())?;
    let out = &mut io::stdout().lock();
    let today = journal.today();

    match command {
        Commands::Water(action) => match action {
            WaterAction::Add { ml } => water::add(out, &journal, *ml, Utc::now())?,
            WaterAction::Remove { id } => water::remove(out, &journal, id)?,
            WaterAction::Today { json } => water::today(out, &journal, today, *json)?,
            WaterAction::Clear => water::clear(out, &journal, today)?,
        },
        Commands::Meal(action) => match action {
            MealAction::Add {
                meal_type,
                image,
                file,
            } => {
                let analysis = read_analysis(file.as_deref())?;
                meal::add(
                    out,
                    &journal,
                    *meal_type,
                    image.clone(),
                    &analysis,
                    Utc::now(),
                )?;
            }
            MealAction::Remove { id } => meal::remove(out, &journal, id)?,
            MealAction::Today { json } => meal::today(out, &journal, today, *json)?,
            MealAction::Clear => meal::clear(out, &journal, today)?,
        },
        Commands::Hr(action) => match action {
            HrAction::Record => {
                heart_rate::record(io::stdin().lock(), out, &journal, Utc::now)?;
            }
            HrAction::Remove { id } => heart_rate::remove(out, &journal, id)?,
            HrAction::Today { json } => heart_rate::today(out, &journal, today, *json)?,
            HrAction::Clear => heart_rate::clear(out, &journal, today)?,
        },
        Commands::Settings(action) => match action {
            SettingsAction::Show => settings::show(out, &journal)?,
            SettingsAction::Meal(args) => settings::meal(
                out,
                &journal,
                MealChanges {
                    goal: args.goal,
                    units: args.units,
                },
            )?,
            SettingsAction::Water(args) => settings::water(
                out,
                &journal,
                WaterChanges {
                    goal: args.goal,
                    hourly: toggle(args.hourly, args.no_hourly),
                    custom: toggle(args.custom, args.no_custom),
                    times: args.times.clone(),
                },
            )?,
            SettingsAction::HeartRate(args) => settings::heart_rate(
                out,
                &journal,
                HeartRateChanges {
                    weight: args.weight,
                    age: args.age,
                    calories: toggle(args.calories, args.no_calories),
                },
            )?,
            SettingsAction::Reset => settings::reset(out, &journal)?,
        },
        Commands::Reminders => reminders::run(out, &journal)?,
        Commands::Status { json } => {
            status::run(out, &journal, &config.database_path, today, *json)?;
        }
        Commands::Clear => clear::run(out, &journal)?,
    }

    Ok(())
}
