//! Data models for goals and daily health metrics
//!
//! Habit and period tags are closed enums. Persisted records may carry tags
//! written by older app versions (or hand-edited files); those fall back to
//! the `Default` variant instead of failing to load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// Habit Types
// ============================================================================

/// Category of trackable metric a goal is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum HabitType {
    #[default]
    Steps,
    Sleep,
    Exercise,
    ActiveTime,
}

impl HabitType {
    pub const ALL: [HabitType; 4] = [
        HabitType::Steps,
        HabitType::Sleep,
        HabitType::Exercise,
        HabitType::ActiveTime,
    ];

    /// Tag used in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Steps => "steps",
            HabitType::Sleep => "sleep",
            HabitType::Exercise => "exercise",
            HabitType::ActiveTime => "active_time",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            HabitType::Steps => "Steps",
            HabitType::Sleep => "Sleep",
            HabitType::Exercise => "Exercise",
            HabitType::ActiveTime => "Active Time",
        }
    }

    /// Unit the goal target is expressed in
    pub fn unit(&self) -> &'static str {
        match self {
            HabitType::Steps => "steps",
            HabitType::Sleep => "hours",
            HabitType::Exercise | HabitType::ActiveTime => "minutes",
        }
    }

    /// Suggested target when the user creates a goal of this type
    ///
    /// Weekly targets are seven daily targets; monthly targets are thirty.
    pub fn default_target(&self, period: Period) -> f64 {
        match (self, period) {
            (HabitType::Steps, Period::Day) => 10_000.0,
            (HabitType::Steps, Period::Week) => 70_000.0,
            (HabitType::Steps, Period::Month) => 300_000.0,
            (HabitType::Sleep, Period::Day) => 8.0,
            (HabitType::Sleep, Period::Week) => 56.0,
            (HabitType::Sleep, Period::Month) => 240.0,
            (HabitType::Exercise, Period::Day) => 30.0,
            (HabitType::Exercise, Period::Week) => 210.0,
            (HabitType::Exercise, Period::Month) => 900.0,
            (HabitType::ActiveTime, Period::Day) => 60.0,
            (HabitType::ActiveTime, Period::Week) => 420.0,
            (HabitType::ActiveTime, Period::Month) => 1_800.0,
        }
    }

    /// Parse a persisted tag, substituting the default for unknown values
    pub fn from_stored(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|err: String| {
            warn!(tag, error = %err, "Unrecognized habit type, falling back to steps");
            HabitType::default()
        })
    }
}

impl std::str::FromStr for HabitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steps" | "step" => Ok(HabitType::Steps),
            "sleep" => Ok(HabitType::Sleep),
            "exercise" => Ok(HabitType::Exercise),
            "active_time" | "activetime" | "active" => Ok(HabitType::ActiveTime),
            _ => Err(format!("Unknown habit type: {}", s)),
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HabitType {
    fn from(tag: String) -> Self {
        HabitType::from_stored(&tag)
    }
}

impl From<HabitType> for String {
    fn from(habit: HabitType) -> Self {
        habit.as_str().to_string()
    }
}

// ============================================================================
// Periods
// ============================================================================

/// Granularity over which a goal's target and streak are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Day",
            Period::Week => "Week",
            Period::Month => "Month",
        }
    }

    /// Adjective used in generated goal names
    pub fn cadence(&self) -> &'static str {
        match self {
            Period::Day => "Daily",
            Period::Week => "Weekly",
            Period::Month => "Monthly",
        }
    }

    /// Parse a persisted tag, substituting the default for unknown values
    pub fn from_stored(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|err: String| {
            warn!(tag, error = %err, "Unrecognized period, falling back to day");
            Period::default()
        })
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Period {
    fn from(tag: String) -> Self {
        Period::from_stored(&tag)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.as_str().to_string()
    }
}

// ============================================================================
// Goals
// ============================================================================

/// A user-defined health goal with its streak bookkeeping
///
/// `streak` is zero whenever `last_completed` is `None`. Goals are never
/// removed; clearing `is_active` hides them from every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub habit_type: HabitType,
    pub target: f64,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Goal {
    /// Create a fresh, active goal with no streak
    pub fn new(
        name: impl Into<String>,
        habit_type: HabitType,
        target: f64,
        period: Period,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            habit_type,
            target,
            period,
            streak: 0,
            last_completed: None,
            is_active: true,
            created_at,
        }
    }

    /// The three goals seeded on first run: daily steps, sleep and exercise
    pub fn defaults(created_at: DateTime<Utc>) -> Vec<Goal> {
        vec![
            Goal::new("Daily Steps", HabitType::Steps, 10_000.0, Period::Day, created_at),
            Goal::new("Good Sleep", HabitType::Sleep, 8.0, Period::Day, created_at),
            Goal::new("Daily Exercise", HabitType::Exercise, 30.0, Period::Day, created_at),
        ]
    }
}

/// Name suggested for a new goal, e.g. "Weekly Active Time"
pub fn default_goal_name(habit_type: HabitType, period: Period) -> String {
    format!("{} {}", period.cadence(), habit_type.title())
}

// ============================================================================
// Metric Snapshots
// ============================================================================

/// One day's aggregated health readings, as supplied by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricSnapshot {
    #[serde(default)]
    pub steps: u32,
    #[serde(default)]
    pub sleep_hours: f64,
    #[serde(default)]
    pub heart_rate_avg: u32,
    #[serde(default)]
    pub active_minutes: f64,
    #[serde(default)]
    pub exercise_minutes: f64,
}

/// Reading plotted in the metric history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMetric {
    Steps,
    Sleep,
    Exercise,
    HeartRate,
}

impl HistoryMetric {
    pub fn title(&self) -> &'static str {
        match self {
            HistoryMetric::Steps => "Steps",
            HistoryMetric::Sleep => "Sleep",
            HistoryMetric::Exercise => "Exercise",
            HistoryMetric::HeartRate => "Heart Rate",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            HistoryMetric::Steps => "steps",
            HistoryMetric::Sleep => "hours",
            HistoryMetric::Exercise => "minutes",
            HistoryMetric::HeartRate => "bpm",
        }
    }

    /// The reading this metric plots from a snapshot
    pub fn read(&self, snapshot: &MetricSnapshot) -> f64 {
        match self {
            HistoryMetric::Steps => f64::from(snapshot.steps),
            HistoryMetric::Sleep => snapshot.sleep_hours,
            HistoryMetric::Exercise => snapshot.exercise_minutes,
            HistoryMetric::HeartRate => f64::from(snapshot.heart_rate_avg),
        }
    }
}

impl std::str::FromStr for HistoryMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steps" => Ok(HistoryMetric::Steps),
            "sleep" => Ok(HistoryMetric::Sleep),
            "exercise" => Ok(HistoryMetric::Exercise),
            "heart_rate" | "heartrate" => Ok(HistoryMetric::HeartRate),
            _ => Err(format!("Unknown metric: {}", s)),
        }
    }
}
