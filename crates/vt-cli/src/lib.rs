//! Vitals health log CLI library.
//!
//! This crate provides the `vt` command-line interface over `vt-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, Commands, HeartRateSettingsArgs, HrAction, MealAction, MealSettingsArgs, SettingsAction,
    WaterAction, WaterSettingsArgs, toggle,
};
pub use config::Config;
