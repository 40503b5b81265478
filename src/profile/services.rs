use thiserror::Error;
use time::Date;

use super::dto::OnboardingRequest;

const MAX_AGE_YEARS: i32 = 120;
const MAX_PREFERENCES: usize = 20;
const MAX_PREFERENCE_LEN: usize = 50;
const CALORIE_GOAL_RANGE: std::ops::RangeInclusive<i32> = 500..=10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("date of birth must be in the past")]
    BirthDateInFuture,
    #[error("date of birth is more than 120 years ago")]
    BirthDateTooOld,
    #[error("at most 20 dietary preferences")]
    TooManyPreferences,
    #[error("dietary preference longer than 50 characters")]
    PreferenceTooLong,
    #[error("daily calorie goal must be between 500 and 10000, got {0}")]
    CalorieGoalOutOfRange(i32),
}

/// Onboarding answers after validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Onboarding {
    pub date_of_birth: Date,
    pub dietary_preferences: Vec<String>,
    pub daily_calorie_goal: Option<i32>,
}

/// Check onboarding answers against `today` and tidy up the preference list.
pub fn validate_onboarding(
    req: OnboardingRequest,
    today: Date,
) -> Result<Onboarding, ProfileError> {
    if req.date_of_birth >= today {
        return Err(ProfileError::BirthDateInFuture);
    }
    if today.year() - req.date_of_birth.year() > MAX_AGE_YEARS {
        return Err(ProfileError::BirthDateTooOld);
    }

    let mut prefs: Vec<String> = Vec::with_capacity(req.dietary_preferences.len());
    for raw in req.dietary_preferences {
        let p = raw.trim().to_lowercase();
        if p.is_empty() || prefs.contains(&p) {
            continue;
        }
        if p.chars().count() > MAX_PREFERENCE_LEN {
            return Err(ProfileError::PreferenceTooLong);
        }
        prefs.push(p);
    }
    if prefs.len() > MAX_PREFERENCES {
        return Err(ProfileError::TooManyPreferences);
    }

    if let Some(goal) = req.daily_calorie_goal {
        if !CALORIE_GOAL_RANGE.contains(&goal) {
            return Err(ProfileError::CalorieGoalOutOfRange(goal));
        }
    }

    Ok(Onboarding {
        date_of_birth: req.date_of_birth,
        dietary_preferences: prefs,
        daily_calorie_goal: req.daily_calorie_goal,
    })
}
