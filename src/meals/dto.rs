use serde::{Deserialize, Serialize};

use super::repo::Meal;
use crate::tracking::dto::TrackingView;

pub const MAX_FOOD_NAME_LEN: usize = 200;

/// Body of `POST /meals`: the (possibly user-edited) analysis result.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    #[serde(default)]
    pub food_name: String,
    pub calories: Option<f64>,
    pub protein_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub carb_grams: Option<f64>,
    pub sugar_grams: Option<f64>,
    #[serde(default)]
    pub is_junk_food: bool,
    /// Client's local offset from UTC, used to find "today".
    pub utc_offset_minutes: Option<i32>,
}

impl LogMealRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.food_name.chars().count() > MAX_FOOD_NAME_LEN {
            return Err(format!("food_name longer than {MAX_FOOD_NAME_LEN} characters"));
        }
        let amounts = [
            ("calories", self.calories),
            ("protein_grams", self.protein_grams),
            ("fat_grams", self.fat_grams),
            ("carb_grams", self.carb_grams),
            ("sugar_grams", self.sugar_grams),
        ];
        for (field, value) in amounts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{field} must be a non-negative number"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub meal: Meal,
    pub tracking: TrackingView,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> LogMealRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn absent_numbers_stay_absent() {
        let req = request(serde_json::json!({ "food_name": "Apple", "calories": 95 }));
        assert_eq!(req.calories, Some(95.0));
        assert_eq!(req.sugar_grams, None);
        assert!(!req.is_junk_food);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_negative_amounts_and_long_names() {
        let req = request(serde_json::json!({ "food_name": "x", "fat_grams": -1.0 }));
        assert!(req.validate().unwrap_err().contains("fat_grams"));

        let long = "a".repeat(MAX_FOOD_NAME_LEN + 1);
        let req = request(serde_json::json!({ "food_name": long }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 1000, offset: -5 };
        assert_eq!(p.clamped(), (100, 0));
        let p = Pagination { limit: 0, offset: 40 };
        assert_eq!(p.clamped(), (1, 40));
    }
}
