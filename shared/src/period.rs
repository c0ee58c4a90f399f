//! Period rollover resolution
//!
//! Decides whether a past date falls in the current period, the one right
//! before it, or further back. Weeks are ISO weeks, so week 52 or 53 of one
//! ISO year precedes week 1 of the next.

use crate::models::Period;
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a reference date sits relative to the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodPosition {
    Current,
    Preceding,
    Stale,
}

/// Calendar date of a timestamp in the given offset
pub fn to_local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Whether two dates fall in the same period
pub fn same_period(period: Period, a: NaiveDate, b: NaiveDate) -> bool {
    match period {
        Period::Day => a == b,
        Period::Week => a.iso_week() == b.iso_week(),
        Period::Month => a.year() == b.year() && a.month() == b.month(),
    }
}

/// Classify `last` against the period containing `current`
///
/// A `last` date later than `current` is neither current nor preceding and
/// resolves to `Stale`.
pub fn resolve(period: Period, last: NaiveDate, current: NaiveDate) -> PeriodPosition {
    if same_period(period, last, current) {
        return PeriodPosition::Current;
    }

    let preceding = match period {
        Period::Day => current.pred_opt().is_some_and(|prev| prev == last),
        Period::Week => current
            .checked_sub_days(Days::new(7))
            .is_some_and(|prev| prev.iso_week() == last.iso_week()),
        Period::Month => {
            let (year, month) = previous_month(current.year(), current.month());
            last.year() == year && last.month() == month
        }
    };

    if preceding {
        PeriodPosition::Preceding
    } else {
        PeriodPosition::Stale
    }
}

/// One-based position of `date` within its week or month
///
/// Weeks start on Monday. Daily goals have no position and return `None`.
pub fn day_of_period(period: Period, date: NaiveDate) -> Option<u32> {
    match period {
        Period::Day => None,
        Period::Week => Some(date.weekday().number_from_monday()),
        Period::Month => Some(date.day()),
    }
}

/// Caption such as "Day 3 of Week" for goals longer than a day
pub fn period_day_text(period: Period, date: NaiveDate) -> Option<String> {
    day_of_period(period, date).map(|day| format!("Day {} of {}", day, period.label()))
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
