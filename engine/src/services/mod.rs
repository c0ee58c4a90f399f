//! Business logic services
//!
//! Services encapsulate the decision logic and coordinate between
//! repositories, the metric provider and the celebration sink.

pub mod celebration;
pub mod goals;
pub mod sink;

pub use celebration::{CelebrationRecord, CelebrationTracker};
pub use goals::{
    CompletionReport, CreateGoalInput, DailyMetric, GoalOverview, GoalsService, ResetReport,
};
pub use sink::{CelebrationEvent, CelebrationSink, LoggingSink};
