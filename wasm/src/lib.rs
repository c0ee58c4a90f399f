//! Frisky WASM Module
//!
//! WebAssembly bindings for the pure goal and mood calculations, so a web
//! front end renders the same numbers the engine decides on.

use frisky_shared::{
    calculate_mood as mood_for, default_goal_name as goal_name_for,
    format_for_display as format_value, period_day_text as caption_for, GoalProgress, HabitType,
    MetricSnapshot, Period,
};
use wasm_bindgen::prelude::*;

/// Fraction of a goal target reached, in [0, 1]
#[wasm_bindgen]
pub fn calculate_percentage(current: f64, target: f64) -> f64 {
    frisky_shared::percentage(current, target)
}

/// Whether the current value meets the target
#[wasm_bindgen]
pub fn is_goal_completed(current: f64, target: f64) -> bool {
    frisky_shared::is_completed(current, target)
}

/// Pet mood label ("happy", "neutral", "sad", "tired") for today's metrics
#[wasm_bindgen]
pub fn calculate_mood(steps: u32, sleep_hours: f64, exercise_minutes: f64, heart_rate: u32) -> String {
    let snapshot = MetricSnapshot {
        steps,
        sleep_hours,
        heart_rate_avg: heart_rate,
        active_minutes: 0.0,
        exercise_minutes,
    };
    mood_for(&snapshot).label().to_lowercase()
}

/// Display string for a metric value; unknown habit tags format as steps
#[wasm_bindgen]
pub fn format_for_display(value: f64, habit_type: &str) -> String {
    format_value(value, HabitType::from_stored(habit_type))
}

/// Progress summary for every goal in a JSON array against a JSON snapshot
///
/// Returns a JSON array of `{ current, target, percentage, completed }`.
#[wasm_bindgen]
pub fn evaluate_goals(goals_json: &str, snapshot_json: &str) -> Result<String, JsValue> {
    let goals: Vec<frisky_shared::Goal> =
        serde_json::from_str(goals_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let snapshot: MetricSnapshot =
        serde_json::from_str(snapshot_json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let progress: Vec<GoalProgress> = goals
        .iter()
        .map(|goal| GoalProgress::evaluate(goal, &snapshot))
        .collect();

    serde_json::to_string(&progress).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Normalized period tag ("day", "week", "month") for a stored value
#[wasm_bindgen]
pub fn normalize_period(tag: &str) -> String {
    Period::from_stored(tag).as_str().to_string()
}

/// Suggested target for a new goal of this habit and period
#[wasm_bindgen]
pub fn default_goal_target(habit_type: &str, period: &str) -> f64 {
    HabitType::from_stored(habit_type).default_target(Period::from_stored(period))
}

/// Suggested name for a new goal, e.g. "Weekly Steps"
#[wasm_bindgen]
pub fn default_goal_name(habit_type: &str, period: &str) -> String {
    goal_name_for(HabitType::from_stored(habit_type), Period::from_stored(period))
}

/// "Day N of Week/Month" for an ISO date, or an empty string for daily goals
#[wasm_bindgen]
pub fn period_day_text(period: &str, iso_date: &str) -> Result<String, JsValue> {
    let date = iso_date
        .parse::<chrono::NaiveDate>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(caption_for(Period::from_stored(period), date).unwrap_or_default())
}
