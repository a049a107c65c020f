//! Settings persistence, one key per domain.

use vt_core::{Settings, SettingsDomain};

use crate::{Database, DbError, KeyValueStore};

/// Storage key for a settings domain.
pub(crate) fn settings_key(domain: SettingsDomain) -> String {
    format!("settings.{domain}")
}

/// Reads and replaces per-domain settings records.
pub struct SettingsStore<'s, S = Database> {
    store: &'s S,
}

impl<'s, S: KeyValueStore> SettingsStore<'s, S> {
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Current settings for `T`'s domain.
    ///
    /// Falls back to defaults when nothing is stored or the stored record is
    /// unreadable.
    pub fn get<T: Settings>(&self) -> T {
        self.try_get().unwrap_or_else(|err| {
            tracing::warn!(domain = %T::DOMAIN, error = %err, "failed to read settings, using defaults");
            T::default()
        })
    }

    /// Like [`get`](Self::get), but surfaces read and decode errors.
    pub fn try_get<T: Settings>(&self) -> Result<T, DbError> {
        let key = settings_key(T::DOMAIN);
        match self.store.get(&key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| DbError::Corrupt { key, source })
            }
            None => Ok(T::default()),
        }
    }

    /// Validates `settings` and stores it, replacing the whole record.
    pub fn set<T: Settings>(&self, settings: &T) -> Result<(), DbError> {
        settings.validate()?;
        let key = settings_key(T::DOMAIN);
        let encoded = serde_json::to_string(settings).map_err(|source| DbError::Encode {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &encoded)?;
        tracing::debug!(domain = %T::DOMAIN, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vt_core::{
        AgeYears, HeartRateSettings, MealSettings, ReminderTime, Units, ValidationError,
        WaterSettings, WeightKg,
    };

    #[test]
    fn unset_domains_return_defaults() {
        let db = Database::open_in_memory().expect("open in-memory db");
        let settings = SettingsStore::new(&db);
        assert_eq!(settings.get::<MealSettings>(), MealSettings::default());
        assert_eq!(settings.get::<WaterSettings>(), WaterSettings::default());
        assert_eq!(
            settings.get::<HeartRateSettings>(),
            HeartRateSettings::default()
        );
    }

    #[test]
    fn set_replaces_only_its_domain() {
        let db = Database::open_in_memory().expect("open in-memory db");
        let settings = SettingsStore::new(&db);
        let heart_rate = HeartRateSettings {
            weight: WeightKg::new(82).expect("weight"),
            age: AgeYears::new(41).expect("age"),
            enable_calorie_calculation: false,
        };

        settings.set(&heart_rate).expect("set");

        assert_eq!(settings.get::<HeartRateSettings>(), heart_rate);
        assert_eq!(settings.get::<MealSettings>(), MealSettings::default());
        assert_eq!(db.keys().expect("keys"), ["settings.heart_rate"]);
    }

    #[test]
    fn invalid_settings_are_rejected_and_not_stored() {
        let db = Database::open_in_memory().expect("open in-memory db");
        let settings = SettingsStore::new(&db);
        let water = WaterSettings {
            custom_reminder_times: (8..15)
                .map(|hour| ReminderTime::from_hm(hour, 0).expect("time"))
                .collect(),
            ..WaterSettings::default()
        };

        let result = settings.set(&water);

        assert!(matches!(
            result,
            Err(DbError::Validation(ValidationError::TooManyReminderTimes { .. }))
        ));
        assert!(db.keys().expect("keys").is_empty());
    }

    #[test]
    fn unreadable_settings_fall_back_to_defaults() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.set("settings.meal", "{\"dailyCalorieGoal\": ").expect("set");
        let settings = SettingsStore::new(&db);

        assert_eq!(settings.get::<MealSettings>(), MealSettings::default());
        assert!(matches!(
            settings.try_get::<MealSettings>(),
            Err(DbError::Corrupt { .. })
        ));
    }

    #[test]
    fn stored_json_uses_camel_case() {
        let db = Database::open_in_memory().expect("open in-memory db");
        let settings = SettingsStore::new(&db);
        settings
            .set(&MealSettings {
                daily_calorie_goal: 1800,
                preferred_units: Units::Imperial,
            })
            .expect("set");

        let raw = db.get("settings.meal").expect("get").expect("stored");
        assert_eq!(raw, r#"{"dailyCalorieGoal":1800,"preferredUnits":"imperial"}"#);
    }
}
