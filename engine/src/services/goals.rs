//! Goals service for streak tracking and completion celebrations
//!
//! Provides business logic for:
//! - Default goal seeding, creation and soft deletion
//! - The reset-check pass (zero lapsed streaks)
//! - The completion-check pass (count new completions, emit one celebration)
//! - Read-only progress and mood views
//!
//! Every mutation runs under a single pass lock so two passes never
//! interleave over the same store. A failed metric fetch skips the whole
//! pass; nothing is partially applied. A goal whose save fails is kept as
//! pending and saved again at the start of the next pass.

use crate::error::{EngineError, EngineResult};
use crate::providers::MetricSnapshotProvider;
use crate::repositories::GoalStore;
use crate::services::celebration::CelebrationTracker;
use crate::services::sink::{CelebrationEvent, CelebrationSink};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use frisky_shared::period::period_day_text;
use frisky_shared::streak;
use frisky_shared::validation::{validate_goal_name, validate_goal_target};
use frisky_shared::{
    calculate_mood, default_goal_name, format_for_display, to_local_date, Goal, GoalProgress,
    HabitType, HistoryMetric, MetricSnapshot, Period, PetMood, StoreError,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Input for creating a goal
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    /// Falls back to a name like "Weekly Steps"
    pub name: Option<String>,
    pub habit_type: HabitType,
    /// Falls back to the habit type's default target for the period
    pub target: Option<f64>,
    pub period: Period,
}

/// Outcome of a reset-check pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetReport {
    /// The pass did not run because metrics or goals could not be read
    pub skipped: bool,
    pub checked: usize,
    pub reset: Vec<Uuid>,
    pub save_failures: usize,
    /// Saves left over from earlier passes that went through this time
    pub recovered_saves: usize,
}

/// Outcome of a completion-check pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReport {
    /// The pass did not run because metrics or goals could not be read
    pub skipped: bool,
    pub checked: usize,
    /// Goals whose streak advanced in this pass, in iteration order
    pub completed: Vec<Uuid>,
    /// The single event handed to the sink, if any
    pub celebration: Option<CelebrationEvent>,
    pub save_failures: usize,
    /// Saves left over from earlier passes that went through this time
    pub recovered_saves: usize,
}

/// A goal with its progress against today's snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct GoalOverview {
    pub goal: Goal,
    pub progress: GoalProgress,
    pub display_value: String,
    /// "Day 3 of Week" style caption; `None` for daily goals
    pub period_day: Option<String>,
}

/// One day's reading in a metric history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub value: f64,
}

/// Goals service wiring the decision logic to its collaborators
pub struct GoalsService {
    store: Arc<dyn GoalStore>,
    provider: Arc<dyn MetricSnapshotProvider>,
    tracker: Arc<CelebrationTracker>,
    sink: Arc<dyn CelebrationSink>,
    offset: FixedOffset,
    pass_lock: Mutex<()>,
    pending: Mutex<HashMap<Uuid, Goal>>,
}

impl GoalsService {
    pub fn new(
        store: Arc<dyn GoalStore>,
        provider: Arc<dyn MetricSnapshotProvider>,
        tracker: Arc<CelebrationTracker>,
        sink: Arc<dyn CelebrationSink>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            provider,
            tracker,
            sink,
            offset,
            pass_lock: Mutex::new(()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Calendar day of `now` in the configured offset
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        to_local_date(now, self.offset)
    }

    /// Insert the default goals if the store has never held any
    ///
    /// Returns the number of goals inserted.
    pub async fn seed_default_goals(&self, now: DateTime<Utc>) -> EngineResult<usize> {
        let _guard = self.pass_lock.lock().await;

        if !self.store.is_empty().await? {
            debug!("Goals already exist, skipping defaults");
            return Ok(0);
        }

        let defaults = Goal::defaults(now);
        let count = defaults.len();
        for goal in defaults {
            self.store.insert(goal).await?;
        }

        info!(count, "Created default goals");
        Ok(count)
    }

    /// Create a new goal
    pub async fn create_goal(
        &self,
        input: CreateGoalInput,
        now: DateTime<Utc>,
    ) -> EngineResult<Goal> {
        let name = input
            .name
            .unwrap_or_else(|| default_goal_name(input.habit_type, input.period));
        let target = input
            .target
            .unwrap_or_else(|| input.habit_type.default_target(input.period));

        validate_goal_name(&name)?;
        validate_goal_target(target)?;

        let goal = Goal::new(
            name.trim(),
            input.habit_type,
            target,
            input.period,
            now,
        );

        let _guard = self.pass_lock.lock().await;
        self.store.insert(goal.clone()).await?;

        info!(
            goal_id = %goal.id,
            habit = %goal.habit_type,
            period = %goal.period,
            target = goal.target,
            "Created goal"
        );
        Ok(goal)
    }

    /// Soft-delete a goal by clearing its active flag
    pub async fn deactivate_goal(&self, goal_id: Uuid) -> EngineResult<Goal> {
        let _guard = self.pass_lock.lock().await;

        let stored = self
            .store
            .get(goal_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Goal not found".to_string()))?;
        let mut goal = self.pending.lock().await.get(&goal_id).cloned().unwrap_or(stored);

        if goal.is_active {
            goal.is_active = false;
            self.store.save(&goal).await?;
            self.pending.lock().await.remove(&goal_id);
            info!(goal_id = %goal_id, goal = %goal.name, "Deactivated goal");
        }

        Ok(goal)
    }

    /// Active goals, oldest first
    ///
    /// Goals with a pending save are reported in their unsaved state.
    pub async fn list_goals(&self) -> EngineResult<Vec<Goal>> {
        let mut goals = self.store.list_active().await?;
        {
            let pending = self.pending.lock().await;
            for goal in goals.iter_mut() {
                if let Some(newer) = pending.get(&goal.id) {
                    *goal = newer.clone();
                }
            }
        }
        // Stable sort keeps insertion order between goals created together.
        goals.sort_by_key(|g| g.created_at);
        Ok(goals)
    }

    /// Number of goals whose latest change has not reached the store
    pub async fn pending_saves(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Zero the streak of every goal whose last completion has lapsed
    pub async fn run_reset_check(&self, now: DateTime<Utc>) -> ResetReport {
        let _guard = self.pass_lock.lock().await;
        let today = self.today(now);
        let recovered_saves = self.retry_pending_saves().await;

        let Some((snapshot, goals)) = self.load_pass_inputs(today, "reset").await else {
            return ResetReport {
                skipped: true,
                recovered_saves,
                ..Default::default()
            };
        };

        debug!(count = goals.len(), date = %today, "Checking goals for streak resets");

        let mut report = ResetReport {
            recovered_saves,
            ..Default::default()
        };
        for mut goal in goals {
            report.checked += 1;

            let current = frisky_shared::progress_value(goal.habit_type, &snapshot);
            if goal.streak == 0 || !streak::should_reset(&goal, current, today, self.offset) {
                continue;
            }

            info!(
                goal_id = %goal.id,
                goal = %goal.name,
                previous_streak = goal.streak,
                "Resetting streak"
            );
            streak::reset(&mut goal);

            if !self.save_or_defer(&goal).await {
                report.save_failures += 1;
            }
            report.reset.push(goal.id);
        }

        report
    }

    /// Count new completions and celebrate the first one
    ///
    /// Goals are visited oldest first. Each goal that newly meets its target
    /// has its streak advanced and is marked celebrated, but only the first
    /// of them is sent to the sink; the rest are persisted silently.
    pub async fn run_completion_check(&self, now: DateTime<Utc>) -> CompletionReport {
        let _guard = self.pass_lock.lock().await;
        let today = self.today(now);
        let recovered_saves = self.retry_pending_saves().await;

        let Some((snapshot, goals)) = self.load_pass_inputs(today, "completion").await else {
            return CompletionReport {
                skipped: true,
                recovered_saves,
                ..Default::default()
            };
        };

        self.tracker.reset_if_new_day(today).await;

        let mut report = CompletionReport {
            recovered_saves,
            ..Default::default()
        };
        for mut goal in goals {
            report.checked += 1;

            let progress = GoalProgress::evaluate(&goal, &snapshot);
            if !progress.completed {
                continue;
            }

            if self.tracker.has_been_celebrated(goal.id, today).await {
                debug!(goal_id = %goal.id, "Already celebrated today");
                continue;
            }

            if !streak::record_completion(&mut goal, now, self.offset) {
                continue;
            }

            self.tracker.mark_as_celebrated(goal.id, today).await;

            if !self.save_or_defer(&goal).await {
                report.save_failures += 1;
            }

            info!(
                goal_id = %goal.id,
                goal = %goal.name,
                streak = goal.streak,
                value = %format_for_display(progress.current, goal.habit_type),
                "Goal completed"
            );

            report.completed.push(goal.id);
            if report.celebration.is_none() {
                report.celebration = Some(CelebrationEvent {
                    goal_id: goal.id,
                    progress_value: progress.current,
                    goal,
                });
            }
        }

        if let Some(event) = &report.celebration {
            self.sink.celebrate(event.clone());
        }

        report
    }

    /// Progress of every active goal against today's snapshot
    pub async fn progress_overview(&self, now: DateTime<Utc>) -> EngineResult<Vec<GoalOverview>> {
        let today = self.today(now);
        let snapshot = self.provider.fetch_snapshot(today).await?;
        let goals = self.list_goals().await?;

        Ok(goals
            .into_iter()
            .map(|goal| {
                let progress = GoalProgress::evaluate(&goal, &snapshot);
                let display_value = format_for_display(progress.current, goal.habit_type);
                let period_day = period_day_text(goal.period, today);
                GoalOverview {
                    goal,
                    progress,
                    display_value,
                    period_day,
                }
            })
            .collect())
    }

    /// Daily readings of one metric for the `days` days ending on `end`
    ///
    /// Oldest first. A day whose snapshot cannot be fetched reads as 0.
    pub async fn history(&self, metric: HistoryMetric, end: NaiveDate, days: u32) -> Vec<DailyMetric> {
        let mut history = Vec::with_capacity(days as usize);

        for back in (0..days).rev() {
            let Some(date) = end.checked_sub_days(Days::new(u64::from(back))) else {
                continue;
            };

            let value = match self.provider.fetch_snapshot(date).await {
                Ok(snapshot) => metric.read(&snapshot),
                Err(e) => {
                    debug!(date = %date, metric = metric.title(), error = %e, "No reading for history day");
                    0.0
                }
            };
            history.push(DailyMetric { date, value });
        }

        history
    }

    /// The pet's mood for today's snapshot
    pub async fn current_mood(&self, now: DateTime<Utc>) -> EngineResult<PetMood> {
        let snapshot = self.provider.fetch_snapshot(self.today(now)).await?;
        Ok(calculate_mood(&snapshot))
    }

    /// Save a mutated goal, keeping it pending if the store refuses it
    async fn save_or_defer(&self, goal: &Goal) -> bool {
        match self.store.save(goal).await {
            Ok(()) => {
                self.pending.lock().await.remove(&goal.id);
                true
            }
            Err(e) => {
                error!(goal_id = %goal.id, error = %e, "Failed to save goal, will retry next pass");
                self.pending.lock().await.insert(goal.id, goal.clone());
                false
            }
        }
    }

    /// Save goals left pending by earlier passes; returns how many went through
    async fn retry_pending_saves(&self) -> usize {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return 0;
        }

        let mut settled = Vec::new();
        let mut recovered = 0;
        for (id, goal) in pending.iter() {
            match self.store.save(goal).await {
                Ok(()) => {
                    recovered += 1;
                    settled.push(*id);
                }
                Err(StoreError::NotFound(_)) => {
                    warn!(goal_id = %id, "Pending goal no longer stored, dropping it");
                    settled.push(*id);
                }
                Err(e) => {
                    warn!(goal_id = %id, error = %e, "Pending goal save failed again");
                }
            }
        }
        for id in settled {
            pending.remove(&id);
        }

        info!(recovered, remaining = pending.len(), "Retried pending goal saves");
        recovered
    }

    async fn load_pass_inputs(
        &self,
        today: NaiveDate,
        pass: &'static str,
    ) -> Option<(MetricSnapshot, Vec<Goal>)> {
        let snapshot = match self.provider.fetch_snapshot(today).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(pass, date = %today, error = %e, "Metric fetch failed, skipping pass");
                return None;
            }
        };

        match self.list_goals().await {
            Ok(goals) => Some((snapshot, goals)),
            Err(e) => {
                error!(pass, error = %e, "Could not load goals, skipping pass");
                None
            }
        }
    }
}
