//! `vt clear`: removing every record while keeping settings.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::TimeZone;
use vt_db::{Database, Journal};

pub fn run<W: Write, Tz: TimeZone>(writer: &mut W, journal: &Journal<Database, Tz>) -> Result<()> {
    journal
        .clear_records()
        .context("failed to clear records")?;
    writeln!(
        writer,
        "Removed all meals, water logs and heart-rate sessions. Settings were kept."
    )?;
    Ok(())
}
