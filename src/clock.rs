use thiserror::Error;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Largest offset from UTC in use anywhere (UTC+14 / UTC-12, with margin).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("utc offset must be within ±840 minutes, got {0}")]
pub struct InvalidOffset(pub i32);

pub fn parse_offset(minutes: i32) -> Result<UtcOffset, InvalidOffset> {
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(InvalidOffset(minutes));
    }
    UtcOffset::from_whole_seconds(minutes * 60).map_err(|_| InvalidOffset(minutes))
}

/// Calendar date at `now` for a user `offset` away from UTC; the day starts at local midnight.
pub fn local_date(now: OffsetDateTime, offset: UtcOffset) -> Date {
    now.to_offset(offset).date()
}

/// Today for a user, using the offset the client sent or the configured default.
pub fn today_for(
    requested_minutes: Option<i32>,
    default_minutes: i32,
) -> Result<Date, InvalidOffset> {
    let offset = parse_offset(requested_minutes.unwrap_or(default_minutes))?;
    Ok(local_date(OffsetDateTime::now_utc(), offset))
}

/// `start` moved by `days` calendar days; `None` past the representable range.
pub fn shift_days(start: Date, days: i64) -> Option<Date> {
    start.checked_add(Duration::days(days))
}
