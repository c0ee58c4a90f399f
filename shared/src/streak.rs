//! Streak state transitions
//!
//! A goal is either without a streak (`streak == 0`, never completed) or
//! active (`streak >= 1`, `last_completed` set). A reset keeps the last
//! completion timestamp and only zeroes the counter.

use crate::models::Goal;
use crate::period::{resolve, same_period, to_local_date, PeriodPosition};
use crate::progress::is_completed;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Whether the goal's streak has lapsed and must be zeroed
///
/// A goal currently meeting its target is never reset, even when its last
/// completion is stale: finishing today rescues the streak.
pub fn should_reset(goal: &Goal, current_value: f64, today: NaiveDate, offset: FixedOffset) -> bool {
    let Some(last_completed) = goal.last_completed else {
        return false;
    };

    if is_completed(current_value, goal.target) {
        return false;
    }

    let last = to_local_date(last_completed, offset);
    resolve(goal.period, last, today) == PeriodPosition::Stale
}

/// Whether completing the goal today would count toward a new period
pub fn is_new_completion(goal: &Goal, today: NaiveDate, offset: FixedOffset) -> bool {
    match goal.last_completed {
        None => true,
        Some(last_completed) => {
            !same_period(goal.period, to_local_date(last_completed, offset), today)
        }
    }
}

/// Count a completion for the period containing `now`
///
/// Returns `false` and leaves the goal untouched when this period was
/// already counted.
pub fn record_completion(goal: &mut Goal, now: DateTime<Utc>, offset: FixedOffset) -> bool {
    let today = to_local_date(now, offset);
    if !is_new_completion(goal, today, offset) {
        return false;
    }

    goal.streak = goal.streak.saturating_add(1);
    goal.last_completed = Some(now);
    true
}

/// Zero the streak counter
pub fn reset(goal: &mut Goal) {
    goal.streak = 0;
}
