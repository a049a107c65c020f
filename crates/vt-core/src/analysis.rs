//! Intake of food image analysis results.
//!
//! The analysis service answers with `{"foods": [...], "analysisNotes": "..."}`,
//! either as a bare object or wrapped in free model text.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meal::{Food, Meal};
use crate::types::{MealType, ValidationError};

static JSON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Errors from parsing an analysis result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis response contains no JSON object")]
    NoJsonObject,

    #[error("invalid analysis JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Foods recognized in one meal photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub foods: Vec<Food>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_notes: Option<String>,
}

impl FoodAnalysis {
    /// Total energy of all recognized foods.
    pub fn total_calories(&self) -> u32 {
        self.foods
            .iter()
            .fold(0_u32, |sum, food| sum.saturating_add(food.calories))
    }

    /// Turns the analysis into a meal eaten at `created_at`.
    pub fn into_meal(self, meal_type: MealType, created_at: DateTime<Utc>) -> Meal {
        let mut meal = Meal::new(meal_type, self.foods, created_at);
        meal.analysis_notes = self.analysis_notes;
        meal
    }
}

/// Parses an analysis result from raw response text.
///
/// The outermost `{...}` span is taken, so surrounding prose or code fences
/// are ignored. An analysis without foods is rejected.
pub fn parse_analysis(text: &str) -> Result<FoodAnalysis, AnalysisError> {
    let object = JSON_OBJECT_RE
        .find(text)
        .ok_or(AnalysisError::NoJsonObject)?;
    let analysis: FoodAnalysis = serde_json::from_str(object.as_str())?;
    if analysis.foods.is_empty() {
        return Err(ValidationError::NoFoods.into());
    }
    tracing::debug!(
        foods = analysis.foods.len(),
        calories = analysis.total_calories(),
        "parsed food analysis"
    );
    Ok(analysis)
}
