use serde::Deserialize;
use time::Date;

use super::calendar::MealSlot;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// First day shown; defaults to the user's today.
    pub date: Option<Date>,
    #[serde(default = "default_days")]
    pub days: u32,
    pub utc_offset_minutes: Option<i32>,
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanEntryRequest {
    pub plan_date: Date,
    pub slot: MealSlot,
    pub title: String,
    pub calories: Option<i32>,
    pub notes: Option<String>,
}

impl CreatePlanEntryRequest {
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > 200 {
            return Err("title must be 1 to 200 characters".into());
        }
        if let Some(c) = self.calories {
            if !(0..=10_000).contains(&c) {
                return Err("calories must be between 0 and 10000".into());
            }
        }
        if self.notes.as_deref().is_some_and(|n| n.chars().count() > 1000) {
            return Err("notes longer than 1000 characters".into());
        }
        Ok(())
    }
}
