use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{PlannerError, Result};

/// Inclusive date range used for generation queries and rule bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(PlannerError::Validation(format!(
                "date window end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering the whole calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| PlannerError::Validation(format!("invalid month {year}-{month:02}")))?;
        let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
            .ok_or_else(|| PlannerError::Validation(format!("invalid month {year}-{month:02}")))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn intersect(&self, other: &DateWindow) -> Option<DateWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateWindow { start, end })
    }

    /// Narrows the window by optional lower and upper bounds.
    pub fn clamp(&self, lower: Option<NaiveDate>, upper: Option<NaiveDate>) -> Option<DateWindow> {
        let start = lower.map_or(self.start, |bound| bound.max(self.start));
        let end = upper.map_or(self.end, |bound| bound.min(self.end));
        (start <= end).then_some(DateWindow { start, end })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => (first_next - Duration::days(1)).day(),
        None => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Zero based month counter (`year * 12 + month - 1`).
pub fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month() as i32 - 1
}

pub fn year_month_from_index(index: i32) -> (i32, u32) {
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// ISO weekday number, 1 = Monday .. 7 = Sunday.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// First date on or after `from` that falls on the ISO weekday `weekday`.
pub fn next_weekday_on_or_after(from: NaiveDate, weekday: u32) -> NaiveDate {
    let current = iso_weekday(from) as i64;
    let delta = (weekday as i64 - current).rem_euclid(7);
    from + Duration::days(delta)
}

/// Builds `year-month-day` without clamping; `None` when the month is too short.
pub fn anchored_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
