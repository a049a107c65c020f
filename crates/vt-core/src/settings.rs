//! Per-domain settings records.
//!
//! Each domain keeps a flat record of scalar values. Records are replaced
//! wholesale on update; fields missing from stored data take their defaults.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{AgeYears, ReminderTime, Units, ValidationError, WeightKg};

/// Maximum number of custom water reminder times.
pub const MAX_CUSTOM_REMINDERS: usize = 6;

/// The three independent settings domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsDomain {
    Meal,
    Water,
    HeartRate,
}

impl SettingsDomain {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Water => "water",
            Self::HeartRate => "heart_rate",
        }
    }
}

impl fmt::Display for SettingsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A settings record for one domain.
pub trait Settings: Serialize + DeserializeOwned + Default {
    const DOMAIN: SettingsDomain;

    /// Checks cross-field and range constraints before the record is stored.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Meal tracking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealSettings {
    /// Daily energy goal in kcal.
    pub daily_calorie_goal: u32,
    pub preferred_units: Units,
}

impl Default for MealSettings {
    fn default() -> Self {
        Self {
            daily_calorie_goal: 2000,
            preferred_units: Units::Metric,
        }
    }
}

impl Settings for MealSettings {
    const DOMAIN: SettingsDomain = SettingsDomain::Meal;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.daily_calorie_goal == 0 {
            return Err(ValidationError::NotPositive {
                field: "daily calorie goal",
            });
        }
        Ok(())
    }
}

/// Water tracking and reminder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaterSettings {
    /// Daily intake goal in milliliters.
    pub daily_goal: u32,
    pub enable_hourly_reminders: bool,
    pub enable_custom_reminders: bool,
    pub custom_reminder_times: Vec<ReminderTime>,
}

impl Default for WaterSettings {
    fn default() -> Self {
        let custom_reminder_times = [(9, 0), (12, 0), (15, 0), (18, 0)]
            .into_iter()
            .filter_map(|(hour, minute)| ReminderTime::from_hm(hour, minute).ok())
            .collect();
        Self {
            daily_goal: 3000,
            enable_hourly_reminders: true,
            enable_custom_reminders: true,
            custom_reminder_times,
        }
    }
}

impl Settings for WaterSettings {
    const DOMAIN: SettingsDomain = SettingsDomain::Water;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.daily_goal == 0 {
            return Err(ValidationError::NotPositive {
                field: "daily water goal",
            });
        }
        if self.custom_reminder_times.len() > MAX_CUSTOM_REMINDERS {
            return Err(ValidationError::TooManyReminderTimes {
                count: self.custom_reminder_times.len(),
                max: MAX_CUSTOM_REMINDERS,
            });
        }
        Ok(())
    }
}

/// Heart-rate session settings used for calorie estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartRateSettings {
    pub weight: WeightKg,
    pub age: AgeYears,
    pub enable_calorie_calculation: bool,
}

impl Default for HeartRateSettings {
    fn default() -> Self {
        Self {
            weight: WeightKg::DEFAULT,
            age: AgeYears::DEFAULT,
            enable_calorie_calculation: true,
        }
    }
}

impl Settings for HeartRateSettings {
    const DOMAIN: SettingsDomain = SettingsDomain::HeartRate;

    fn validate(&self) -> Result<(), ValidationError> {
        // Weight and age are range-checked by their types.
        Ok(())
    }
}
