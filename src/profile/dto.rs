use serde::Deserialize;
use time::Date;

/// Answers collected by the onboarding screens.
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub date_of_birth: Date,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    pub daily_calorie_goal: Option<i32>,
    /// Client's local offset from UTC; the birth date is checked against its today.
    pub utc_offset_minutes: Option<i32>,
}
