//! Daily water reminder planning.

use std::fmt;

use serde::Serialize;

use crate::settings::WaterSettings;
use crate::types::ReminderTime;

/// First and last hour of the hourly reminder window, inclusive.
pub const HOURLY_WINDOW: (u32, u32) = (6, 22);

/// Why a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Hourly,
    Custom,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hourly => f.write_str("hourly"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// A daily repeating reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub time: ReminderTime,
    pub kind: ReminderKind,
}

/// Lists the reminders a scheduler should register for `settings`, ordered by
/// time of day.
///
/// A custom time that coincides with an hourly slot yields two reminders.
pub fn plan_reminders(settings: &WaterSettings) -> Vec<Reminder> {
    let mut plan = Vec::new();

    if settings.enable_hourly_reminders {
        let (first, last) = HOURLY_WINDOW;
        plan.extend((first..=last).filter_map(|hour| {
            ReminderTime::from_hm(hour, 0).ok().map(|time| Reminder {
                time,
                kind: ReminderKind::Hourly,
            })
        }));
    }

    if settings.enable_custom_reminders {
        plan.extend(settings.custom_reminder_times.iter().map(|&time| Reminder {
            time,
            kind: ReminderKind::Custom,
        }));
    }

    plan.sort_by_key(|reminder| (reminder.time, reminder.kind));
    plan
}
