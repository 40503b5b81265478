use serde::{Deserialize, Serialize};
use time::Date;

/// Meals a user has to log in one day for that day to count towards the streak.
pub const DAILY_MEAL_THRESHOLD: u32 = 2;

/// Per-user meal-logging progress.
///
/// `meals_logged_today` only refers to `last_tracking_date`; read it through
/// [`TrackingState::meals_logged_on`] when the current day may differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingState {
    pub last_tracking_date: Option<Date>,
    pub meals_logged_today: u32,
    pub streak: u32,
    pub last_streak_credit_date: Option<Date>,
}

impl TrackingState {
    /// Meals logged on `today`; zero when the stored counter belongs to an earlier day.
    pub fn meals_logged_on(&self, today: Date) -> u32 {
        match self.last_tracking_date {
            Some(d) if d == today => self.meals_logged_today,
            _ => 0,
        }
    }

    pub fn credited_on(&self, day: Date) -> bool {
        self.last_streak_credit_date == Some(day)
    }

    /// The day a log made on the client's `today` is booked on.
    ///
    /// Never earlier than `last_tracking_date`: a client whose UTC offset moved
    /// west can report a date that was already closed, and logging there would
    /// look like a missed day.
    pub fn log_day(&self, today: Date) -> Date {
        match self.last_tracking_date {
            Some(last) if last > today => last,
            _ => today,
        }
    }
}

/// Advance the tracking state by one logged meal on the user's local `today`.
///
/// A new day resets the counter and keeps the streak only if yesterday was
/// credited. Reaching the threshold credits the streak once per day.
pub fn apply_meal_log(state: TrackingState, today: Date) -> TrackingState {
    let mut next = state;

    match state.last_tracking_date {
        None => {
            next.meals_logged_today = 1;
            next.last_tracking_date = Some(today);
        }
        Some(last) if last != today => {
            next.meals_logged_today = 1;
            let yesterday = today.previous_day();
            if yesterday.is_none() || state.last_streak_credit_date != yesterday {
                next.streak = 0;
            }
            next.last_tracking_date = Some(today);
        }
        Some(_) => {
            next.meals_logged_today = state.meals_logged_today.saturating_add(1);
            if next.meals_logged_today >= DAILY_MEAL_THRESHOLD && !state.credited_on(today) {
                next.streak = state.streak.saturating_add(1);
                next.last_streak_credit_date = Some(today);
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const D: Date = date!(2024 - 03 - 10);

    fn log_n(mut state: TrackingState, day: Date, n: usize) -> TrackingState {
        for _ in 0..n {
            state = apply_meal_log(state, day);
        }
        state
    }

    #[test]
    fn first_log_ever() {
        let s = apply_meal_log(TrackingState::default(), D);
        assert_eq!(
            s,
            TrackingState {
                last_tracking_date: Some(D),
                meals_logged_today: 1,
                streak: 0,
                last_streak_credit_date: None,
            }
        );
    }

    #[test]
    fn second_log_credits_once_per_day() {
        let s = log_n(TrackingState::default(), D, 2);
        assert_eq!(s.streak, 1);
        assert_eq!(s.meals_logged_today, 2);
        assert_eq!(s.last_streak_credit_date, Some(D));

        let s = apply_meal_log(s, D);
        assert_eq!(s.streak, 1);
        assert_eq!(s.meals_logged_today, 3);
    }

    #[test]
    fn next_day_keeps_streak_and_resets_count() {
        let s = log_n(TrackingState::default(), D, 2);
        let next = D.next_day().unwrap();

        let s = apply_meal_log(s, next);
        assert_eq!(s.streak, 1);
        assert_eq!(s.meals_logged_today, 1);
        assert_eq!(s.last_tracking_date, Some(next));

        let s = apply_meal_log(s, next);
        assert_eq!(s.streak, 2);
        assert_eq!(s.last_streak_credit_date, Some(next));
    }

    #[test]
    fn skipped_day_resets_streak() {
        let s = log_n(TrackingState::default(), D, 2);
        let s = apply_meal_log(s, date!(2024 - 03 - 12));
        assert_eq!(s.streak, 0);
        assert_eq!(s.meals_logged_today, 1);
    }

    #[test]
    fn day_below_threshold_breaks_continuity() {
        // credited on D, only one meal on D+1, back on D+2
        let s = log_n(TrackingState::default(), D, 2);
        let s = apply_meal_log(s, date!(2024 - 03 - 11));
        assert_eq!(s.streak, 1);
        let s = apply_meal_log(s, date!(2024 - 03 - 12));
        assert_eq!(s.streak, 0);
    }

    #[test]
    fn gap_with_partial_days_keeps_later_credit() {
        // Streak already reset by the gap; crossing the threshold later starts from zero.
        let s = log_n(TrackingState::default(), D, 2);
        let s = log_n(s, date!(2024 - 03 - 15), 2);
        assert_eq!(s.streak, 1);
        assert_eq!(s.last_streak_credit_date, Some(date!(2024 - 03 - 15)));
    }

    #[test]
    fn month_and_year_boundaries() {
        let s = log_n(TrackingState::default(), date!(2023 - 12 - 31), 2);
        let s = apply_meal_log(s, date!(2024 - 01 - 01));
        assert_eq!(s.streak, 1);

        let s = log_n(TrackingState::default(), date!(2024 - 02 - 29), 2);
        let s = apply_meal_log(s, date!(2024 - 03 - 01));
        assert_eq!(s.streak, 1);
    }

    #[test]
    fn stale_counter_reads_as_zero() {
        let s = log_n(TrackingState::default(), D, 3);
        assert_eq!(s.meals_logged_on(D), 3);
        assert_eq!(s.meals_logged_on(D.next_day().unwrap()), 0);
        assert_eq!(TrackingState::default().meals_logged_on(D), 0);
    }

    #[test]
    fn log_day_never_moves_backwards() {
        let next = D.next_day().unwrap();
        let s = log_n(TrackingState::default(), next, 1);
        assert_eq!(s.log_day(D), next);
        assert_eq!(s.log_day(next), next);
        assert_eq!(s.log_day(date!(2024 - 03 - 12)), date!(2024 - 03 - 12));
        assert_eq!(TrackingState::default().log_day(D), D);
    }

    #[test]
    fn earlier_client_date_keeps_streak() {
        // Logged at UTC+14 on the 11th, then at UTC-12 where it is still the 10th.
        let s = TrackingState {
            last_tracking_date: Some(date!(2024 - 03 - 11)),
            meals_logged_today: 2,
            streak: 5,
            last_streak_credit_date: Some(date!(2024 - 03 - 11)),
        };
        let day = s.log_day(D);
        let s = apply_meal_log(s, day);
        assert_eq!(s.streak, 5);
        assert_eq!(s.meals_logged_today, 3);
        assert_eq!(s.last_tracking_date, Some(date!(2024 - 03 - 11)));
    }
}
