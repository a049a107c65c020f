//! CLI subcommand implementations.
//!
//! Every command writes to a caller-supplied writer and takes the current
//! instant or day as an argument, so output is reproducible in tests.

pub mod clear;
pub mod heart_rate;
pub mod meal;
pub mod reminders;
pub mod settings;
pub mod status;
mod util;
pub mod water;
