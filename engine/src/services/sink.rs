//! Celebration event delivery
//!
//! The UI shows a one-time modal for each event it receives. The engine
//! emits at most one event per completion pass.

use frisky_shared::Goal;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

/// A goal completion to surface to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelebrationEvent {
    pub goal_id: Uuid,
    pub goal: Goal,
    pub progress_value: f64,
}

/// Consumer of celebration events
pub trait CelebrationSink: Send + Sync {
    fn celebrate(&self, event: CelebrationEvent);
}

/// Sink that only logs, used when no UI is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl CelebrationSink for LoggingSink {
    fn celebrate(&self, event: CelebrationEvent) {
        info!(
            goal_id = %event.goal_id,
            goal = %event.goal.name,
            streak = event.goal.streak,
            progress = event.progress_value,
            "Goal completed"
        );
    }
}

impl CelebrationSink for UnboundedSender<CelebrationEvent> {
    fn celebrate(&self, event: CelebrationEvent) {
        let goal_id = event.goal_id;
        if self.send(event).is_err() {
            warn!(goal_id = %goal_id, "Celebration receiver dropped, event discarded");
        }
    }
}
