use serde::{Deserialize, Serialize};
use time::Date;

use super::streak::{TrackingState, DAILY_MEAL_THRESHOLD};

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub utc_offset_minutes: Option<i32>,
}

/// Tracking state as the client sees it on `today`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackingView {
    pub today: Date,
    pub streak: u32,
    pub meals_logged_today: u32,
    pub daily_threshold: u32,
    pub credited_today: bool,
    pub last_tracking_date: Option<Date>,
}

impl TrackingView {
    pub fn new(state: &TrackingState, today: Date) -> Self {
        Self {
            today,
            streak: state.streak,
            meals_logged_today: state.meals_logged_on(today),
            daily_threshold: DAILY_MEAL_THRESHOLD,
            credited_today: state.credited_on(today),
            last_tracking_date: state.last_tracking_date,
        }
    }
}
