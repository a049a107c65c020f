//! Logged meals and their nutritional content.

use std::ops::{Add, AddAssign};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::record::Record;
use crate::types::{Confidence, MealType};

/// Macronutrient weights in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macronutrients {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl Add for Macronutrients {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Macronutrients {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// One recognized food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub name: String,
    /// Estimated energy in kcal.
    #[serde(deserialize_with = "deserialize_calories")]
    pub calories: u32,
    #[serde(default)]
    pub macronutrients: Macronutrients,
    /// Free-text portion estimate such as "1 cup".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Food {
    pub fn new(name: impl Into<String>, calories: u32, macronutrients: Macronutrients) -> Self {
        Self {
            name: name.into(),
            calories,
            macronutrients,
            portion_size: None,
            confidence: None,
        }
    }
}

/// Accepts fractional calorie estimates, rounding to whole kcal.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked to be finite and within u32 range first"
)]
fn deserialize_calories<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "calories must be a non-negative number, got {value}"
        )));
    }
    Ok(value.round() as u32)
}

/// A meal: a set of foods eaten together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub meal_type: MealType,
    pub foods: Vec<Food>,
    /// Sum of the foods' calories, fixed when the meal is created.
    pub total_calories: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_notes: Option<String>,
}

impl Meal {
    /// Creates a meal, deriving `total_calories` from `foods`.
    pub fn new(meal_type: MealType, foods: Vec<Food>, created_at: DateTime<Utc>) -> Self {
        let total_calories = foods
            .iter()
            .fold(0_u32, |sum, food| sum.saturating_add(food.calories));
        Self {
            meal_type,
            foods,
            total_calories,
            created_at,
            image_uri: None,
            analysis_notes: None,
        }
    }

    #[must_use]
    pub fn with_image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    /// Sum of the macronutrients of all foods in the meal.
    pub fn macronutrients(&self) -> Macronutrients {
        self.foods
            .iter()
            .fold(Macronutrients::default(), |sum, food| sum + food.macronutrients)
    }
}

impl Record for Meal {
    const LOG: &'static str = "meals";

    fn recorded_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
