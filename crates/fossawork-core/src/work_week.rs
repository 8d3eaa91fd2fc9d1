use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A user's work-week preferences.
///
/// When `work_on_weekends` is false the logical week spans Monday through
/// Friday; when true it spans the full Sunday-through-Saturday period.
/// Dates in `holiday_dates` never count as work days regardless of weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkWeekConfig {
    pub work_on_weekends: bool,
    pub holiday_dates: BTreeSet<NaiveDate>,
}

impl Default for WorkWeekConfig {
    /// The documented fallback when preference retrieval fails:
    /// weekends excluded, no holidays.
    fn default() -> Self {
        Self {
            work_on_weekends: false,
            holiday_dates: BTreeSet::new(),
        }
    }
}

impl WorkWeekConfig {
    /// Build a config from the backend's preference payload.
    /// Holiday entries must be ISO `YYYY-MM-DD` strings.
    pub fn from_preferences(
        work_on_weekends: bool,
        holiday_dates: &[String],
    ) -> Result<Self, CoreError> {
        let mut parsed = BTreeSet::new();
        for value in holiday_dates {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| {
                CoreError::InvalidHolidayDate {
                    value: value.clone(),
                    source,
                }
            })?;
            parsed.insert(date);
        }
        Ok(Self {
            work_on_weekends,
            holiday_dates: parsed,
        })
    }
}

/// The computed logical week containing an anchor date.
/// Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekInfo {
    /// First instant of the week (00:00:00.000).
    pub week_start: NaiveDateTime,
    /// Last instant of the week (23:59:59.999).
    pub week_end: NaiveDateTime,
    /// ISO-8601 week number of `week_start`.
    pub week_number: u32,
    /// True when this is the week containing the reference "now".
    pub is_current_week: bool,
    /// Display label, e.g. `"Jan 15 - Jan 19"`.
    pub display_text: String,
}

/// Direction for week navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Calendar date on which the logical week containing `anchor` starts:
/// the preceding (or same) Sunday when weekends count, Monday otherwise.
fn week_start_date(anchor: NaiveDate, config: &WorkWeekConfig) -> NaiveDate {
    let days_back = if config.work_on_weekends {
        anchor.weekday().num_days_from_sunday()
    } else {
        anchor.weekday().num_days_from_monday()
    };
    anchor - Duration::days(i64::from(days_back))
}

/// Compute the logical week containing `anchor`.
///
/// `now` is the reference instant used only to decide `is_current_week`;
/// passing it explicitly keeps the function pure and testable.
///
/// The week number is the ISO-8601 week of `week_start`.
pub fn compute_week(
    anchor: NaiveDateTime,
    config: &WorkWeekConfig,
    now: NaiveDateTime,
) -> WeekInfo {
    let start = week_start_date(anchor.date(), config);
    let span_days: i64 = if config.work_on_weekends { 6 } else { 4 };
    let end = start + Duration::days(span_days);

    WeekInfo {
        week_start: start.and_hms_opt(0, 0, 0).unwrap(),
        week_end: end.and_hms_milli_opt(23, 59, 59, 999).unwrap(),
        week_number: start.iso_week().week(),
        is_current_week: start == week_start_date(now.date(), config),
        display_text: format!("{} - {}", start.format("%b %-d"), end.format("%b %-d")),
    }
}

/// Shift to the adjacent logical week.
///
/// Always moves exactly 7 calendar days from `current.week_start`, so
/// navigation lands on the same weekday-of-week regardless of whether
/// weekends are included, then re-derives a fresh [`WeekInfo`].
pub fn navigate_week(
    current: &WeekInfo,
    direction: Direction,
    config: &WorkWeekConfig,
    now: NaiveDateTime,
) -> WeekInfo {
    let offset = match direction {
        Direction::Prev => -7,
        Direction::Next => 7,
    };
    compute_week(current.week_start + Duration::days(offset), config, now)
}

/// Whether a scheduled date falls inside the given logical week.
///
/// The date is time-normalized to its calendar day before comparing against
/// the inclusive `[week_start, week_end]` window. Weekend days are excluded
/// when the config excludes weekends, and configured holidays are always
/// excluded. Callers must treat a missing scheduled date as "unscheduled"
/// and not call this at all.
pub fn is_in_week(order_date: NaiveDateTime, week: &WeekInfo, config: &WorkWeekConfig) -> bool {
    let date = order_date.date();
    if !config.work_on_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    if config.holiday_dates.contains(&date) {
        return false;
    }
    date >= week.week_start.date() && date <= week.week_end.date()
}
