//! Goal progress calculations
//!
//! Pure functions mapping a goal and today's snapshot to a raw value, a
//! completion fraction and a display string.

use crate::models::{Goal, HabitType, MetricSnapshot};
use serde::{Deserialize, Serialize};

/// Select the snapshot reading a habit type is measured against
///
/// `ActiveTime` reads exercise minutes, not active minutes. The app has
/// always tracked it that way and existing streaks depend on it.
pub fn progress_value(habit_type: HabitType, snapshot: &MetricSnapshot) -> f64 {
    match habit_type {
        HabitType::Steps => f64::from(snapshot.steps),
        HabitType::Sleep => snapshot.sleep_hours,
        HabitType::Exercise => snapshot.exercise_minutes,
        HabitType::ActiveTime => snapshot.exercise_minutes,
    }
}

/// Fraction of the target reached, in `[0, 1]`
///
/// A non-positive target or an unreadable value yields 0.
pub fn percentage(current: f64, target: f64) -> f64 {
    if target.is_nan() || target <= 0.0 {
        return 0.0;
    }
    let ratio = current / target;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Whether the current value meets the target
pub fn is_completed(current: f64, target: f64) -> bool {
    current >= target
}

/// Format a metric for display
///
/// Sleep shows at most one fraction digit, everything else is rounded to a
/// whole number. Thousands are grouped with commas.
pub fn format_for_display(value: f64, habit_type: HabitType) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let formatted = match habit_type {
        HabitType::Sleep => format!("{:.1}", value),
        _ => format!("{:.0}", value),
    };

    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction.trim_end_matches('0')),
        None => (unsigned, ""),
    };

    let grouped = group_thousands(whole);
    let sign = if grouped == "0" && fraction.is_empty() { "" } else { sign };

    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Progress of one goal against one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current: f64,
    pub target: f64,
    pub percentage: f64,
    pub completed: bool,
}

impl GoalProgress {
    pub fn evaluate(goal: &Goal, snapshot: &MetricSnapshot) -> Self {
        let current = progress_value(goal.habit_type, snapshot);
        Self {
            current,
            target: goal.target,
            percentage: percentage(current, goal.target),
            completed: is_completed(current, goal.target),
        }
    }

    /// Amount still needed to reach the target, never negative
    pub fn remaining(&self) -> f64 {
        (self.target - self.current).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;
    use chrono::Utc;
    use proptest::prelude::*;
    use rstest::rstest;

    fn snapshot() -> MetricSnapshot {
        MetricSnapshot {
            steps: 7_500,
            sleep_hours: 6.5,
            heart_rate_avg: 72,
            active_minutes: 95.0,
            exercise_minutes: 25.0,
        }
    }

    #[rstest]
    #[case(HabitType::Steps, 7_500.0)]
    #[case(HabitType::Sleep, 6.5)]
    #[case(HabitType::Exercise, 25.0)]
    #[case(HabitType::ActiveTime, 25.0)]
    fn test_progress_value(#[case] habit: HabitType, #[case] expected: f64) {
        assert_eq!(progress_value(habit, &snapshot()), expected);
    }

    #[test]
    fn test_active_time_ignores_active_minutes() {
        let snap = MetricSnapshot {
            active_minutes: 120.0,
            exercise_minutes: 0.0,
            ..Default::default()
        };
        assert_eq!(progress_value(HabitType::ActiveTime, &snap), 0.0);
    }

    #[test]
    fn test_percentage_zero_target() {
        assert_eq!(percentage(50.0, 0.0), 0.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(50.0, -10.0), 0.0);
    }

    #[test]
    fn test_percentage_unreadable_value_is_zero() {
        assert_eq!(percentage(f64::NAN, 10.0), 0.0);
        assert_eq!(percentage(f64::NAN, f64::NAN), 0.0);
        assert_eq!(percentage(f64::INFINITY, 10.0), 1.0);
    }

    #[test]
    fn test_completion_boundary() {
        assert!(is_completed(10_000.0, 10_000.0));
        assert!(!is_completed(9_999.0, 10_000.0));
    }

    #[rstest]
    #[case(10_000.0, HabitType::Steps, "10,000")]
    #[case(1_234_567.4, HabitType::Steps, "1,234,567")]
    #[case(999.6, HabitType::Steps, "1,000")]
    #[case(42.0, HabitType::Exercise, "42")]
    #[case(7.0, HabitType::Sleep, "7")]
    #[case(7.46, HabitType::Sleep, "7.5")]
    #[case(0.0, HabitType::Sleep, "0")]
    #[case(29.7, HabitType::ActiveTime, "30")]
    fn test_format_for_display(#[case] value: f64, #[case] habit: HabitType, #[case] expected: &str) {
        assert_eq!(format_for_display(value, habit), expected);
    }

    #[test]
    fn test_goal_progress_evaluate() {
        let goal = Goal::new("Sleep", HabitType::Sleep, 8.0, Period::Day, Utc::now());
        let progress = GoalProgress::evaluate(&goal, &snapshot());
        assert_eq!(progress.current, 6.5);
        assert!((progress.percentage - 0.8125).abs() < 1e-9);
        assert!(!progress.completed);
        assert_eq!(progress.remaining(), 1.5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_percentage_in_unit_range(current in 0.0f64..1e7, target in 0.001f64..1e6) {
            let pct = percentage(current, target);
            prop_assert!((0.0..=1.0).contains(&pct), "percentage {} out of range", pct);
        }

        #[test]
        fn prop_percentage_full_iff_completed(current in 0.0f64..1e6, target in 0.001f64..1e6) {
            let pct = percentage(current, target);
            prop_assert_eq!(pct == 1.0, is_completed(current, target),
                "current={}, target={}, pct={}", current, target, pct);
        }

        #[test]
        fn prop_percentage_in_unit_range_for_any_input(current in any::<f64>(), target in any::<f64>()) {
            let pct = percentage(current, target);
            prop_assert!((0.0..=1.0).contains(&pct), "percentage {} out of range", pct);
        }

        #[test]
        fn prop_percentage_zero_target_is_zero(current in 0.0f64..1e7) {
            prop_assert_eq!(percentage(current, 0.0), 0.0);
        }
    }
}
