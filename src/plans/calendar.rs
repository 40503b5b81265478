use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::clock::shift_days;

pub const MAX_WINDOW_DAYS: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl FromStr for MealSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" => Ok(MealSlot::Snack),
            other => anyhow::bail!("unknown meal slot {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub id: Uuid,
    pub plan_date: Date,
    pub slot: MealSlot,
    pub title: String,
    pub calories: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: Date,
    pub entries: Vec<PlanEntry>,
    /// Sum over entries that have a calorie estimate.
    pub planned_calories: i64,
}

/// A run of consecutive days of the meal plan, with links to the
/// neighbouring windows of the same length.
#[derive(Debug, PartialEq, Serialize)]
pub struct CalendarWindow {
    pub start: Date,
    pub end: Date,
    pub prev_start: Date,
    pub next_start: Date,
    pub days: Vec<CalendarDay>,
}

/// A validated window: it and both neighbouring windows fit in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Date,
    pub days: u32,
    prev_start: Date,
    end_exclusive: Date,
}

impl Window {
    pub fn new(start: Date, days: u32) -> Result<Self, String> {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(format!("days must be between 1 and {MAX_WINDOW_DAYS}"));
        }
        let len = i64::from(days);
        match (shift_days(start, -len), shift_days(start, len)) {
            (Some(prev_start), Some(end_exclusive)) => Ok(Self {
                start,
                days,
                prev_start,
                end_exclusive,
            }),
            _ => Err(format!("{days} days from {start} is outside the calendar")),
        }
    }

    /// First day after the window.
    pub fn end_exclusive(&self) -> Date {
        self.end_exclusive
    }

    pub fn contains(&self, day: Date) -> bool {
        day >= self.start && day < self.end_exclusive()
    }
}

/// Lay `entries` out over every day of `window`, empty days included.
/// Entries outside the window are ignored.
pub fn build_calendar(window: Window, mut entries: Vec<PlanEntry>) -> CalendarWindow {
    entries.retain(|e| window.contains(e.plan_date));
    entries.sort_by(|a, b| (a.plan_date, a.slot).cmp(&(b.plan_date, b.slot)));

    let mut days = Vec::with_capacity(window.days as usize);
    let mut rest = entries.into_iter().peekable();
    let dates = std::iter::successors(Some(window.start), |d| d.next_day());
    for date in dates.take(window.days as usize) {
        let mut day_entries = Vec::new();
        while let Some(e) = rest.next_if(|e| e.plan_date == date) {
            day_entries.push(e);
        }
        let planned_calories = day_entries
            .iter()
            .filter_map(|e| e.calories)
            .map(i64::from)
            .sum();
        days.push(CalendarDay {
            date,
            entries: day_entries,
            planned_calories,
        });
    }

    CalendarWindow {
        start: window.start,
        end: window.end_exclusive.previous_day().unwrap_or(window.start),
        prev_start: window.prev_start,
        next_start: window.end_exclusive,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn entry(day: Date, slot: MealSlot, calories: Option<i32>) -> PlanEntry {
        PlanEntry {
            id: Uuid::new_v4(),
            plan_date: day,
            slot,
            title: format!("{} on {day}", slot.as_str()),
            calories,
            notes: None,
        }
    }

    #[test]
    fn every_day_is_present_and_slots_are_ordered() {
        let window = Window::new(date!(2024 - 02 - 27), 4).unwrap();
        let cal = build_calendar(
            window,
            vec![
                entry(date!(2024 - 02 - 29), MealSlot::Dinner, Some(700)),
                entry(date!(2024 - 02 - 29), MealSlot::Breakfast, Some(350)),
                entry(date!(2024 - 02 - 27), MealSlot::Snack, None),
                entry(date!(2024 - 03 - 02), MealSlot::Lunch, Some(500)),
            ],
        );

        let dates: Vec<Date> = cal.days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 27),
                date!(2024 - 02 - 28),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 01),
            ]
        );
        assert_eq!(cal.days[0].entries.len(), 1);
        assert_eq!(cal.days[0].planned_calories, 0);
        assert!(cal.days[1].entries.is_empty());
        let slots: Vec<MealSlot> = cal.days[2].entries.iter().map(|e| e.slot).collect();
        assert_eq!(slots, vec![MealSlot::Breakfast, MealSlot::Dinner]);
        assert_eq!(cal.days[2].planned_calories, 1050);
        assert!(cal.days[3].entries.is_empty());
    }

    #[test]
    fn navigation_links() {
        let cal = build_calendar(Window::new(date!(2024 - 03 - 04), 7).unwrap(), vec![]);
        assert_eq!(cal.end, date!(2024 - 03 - 10));
        assert_eq!(cal.prev_start, date!(2024 - 02 - 26));
        assert_eq!(cal.next_start, date!(2024 - 03 - 11));
    }

    #[test]
    fn window_length_bounds() {
        assert!(Window::new(date!(2024 - 03 - 04), 0).is_err());
        assert!(Window::new(date!(2024 - 03 - 04), 32).is_err());
        assert!(Window::new(date!(2024 - 03 - 04), 31).is_ok());
    }

    #[test]
    fn window_must_fit_in_the_calendar() {
        assert!(Window::new(date!(9999 - 12 - 30), 7).is_err());
        assert!(Window::new(date!(9999 - 12 - 24), 7).is_ok());
        assert!(Window::new(Date::MIN, 1).is_err());
    }

    #[test]
    fn slot_names() {
        for slot in [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner, MealSlot::Snack] {
            assert_eq!(slot.as_str().parse::<MealSlot>().unwrap(), slot);
        }
        assert!("brunch".parse::<MealSlot>().is_err());
    }
}
