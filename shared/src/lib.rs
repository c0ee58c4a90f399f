//! Frisky Shared Library
//!
//! Domain types and the pure decision logic behind goal tracking: progress,
//! period rollover, streaks and pet mood. Nothing here performs I/O; the
//! engine crate wires these functions to stores and metric providers.

pub mod errors;
pub mod models;
pub mod mood;
pub mod period;
pub mod progress;
pub mod streak;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{default_goal_name, Goal, HabitType, HistoryMetric, MetricSnapshot, Period};
pub use mood::{calculate_mood, PetMood};
pub use period::{day_of_period, period_day_text, resolve, same_period, to_local_date, PeriodPosition};
pub use progress::{format_for_display, is_completed, percentage, progress_value, GoalProgress};
pub use validation::ValidationError;
