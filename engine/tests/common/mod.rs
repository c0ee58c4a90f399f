//! Common test utilities for integration tests
//!
//! Builds an engine over in-memory collaborators with a fixed UTC calendar.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use frisky_engine::config::EngineConfig;
use frisky_engine::providers::StaticSnapshotProvider;
use frisky_engine::repositories::{GoalStore, InMemoryGoalStore, InMemoryKeyValueStore};
use frisky_engine::services::{CelebrationEvent, GoalsService};
use frisky_engine::state::AppState;
use frisky_shared::{Goal, HabitType, MetricSnapshot, Period, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use uuid::Uuid;

/// Goal store whose saves can be made to fail on demand
#[derive(Default)]
pub struct FlakyGoalStore {
    inner: InMemoryGoalStore,
    fail_saves: AtomicBool,
}

impl FlakyGoalStore {
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GoalStore for FlakyGoalStore {
    async fn list_active(&self) -> Result<Vec<Goal>, StoreError> {
        self.inner.list_active().await
    }

    async fn list_all(&self) -> Result<Vec<Goal>, StoreError> {
        self.inner.list_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Goal>, StoreError> {
        self.inner.get(id).await
    }

    async fn insert(&self, goal: Goal) -> Result<(), StoreError> {
        self.inner.insert(goal).await
    }

    async fn save(&self, goal: &Goal) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Database("disk I/O error".to_string()));
        }
        self.inner.save(goal).await
    }
}

/// Test engine wrapper
pub struct TestEngine {
    pub state: AppState,
    pub store: Arc<FlakyGoalStore>,
    pub provider: Arc<StaticSnapshotProvider>,
    pub kv: Arc<InMemoryKeyValueStore>,
    pub events: UnboundedReceiver<CelebrationEvent>,
}

impl TestEngine {
    /// Create an engine whose celebration tracker starts on `now`'s day
    pub async fn new(now: DateTime<Utc>) -> Self {
        let store = Arc::new(FlakyGoalStore::default());
        let provider = Arc::new(StaticSnapshotProvider::new());
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let (tx, events) = unbounded_channel();

        let state = AppState::new(
            EngineConfig::default(),
            store.clone(),
            kv.clone(),
            provider.clone(),
            Arc::new(tx),
            utc(),
            now,
        )
        .await;

        Self {
            state,
            store,
            provider,
            kv,
            events,
        }
    }

    pub fn goals(&self) -> &GoalsService {
        self.state.goals()
    }

    /// Insert a goal directly into the store
    pub async fn add_goal(&self, goal: Goal) -> Goal {
        self.store.insert(goal.clone()).await.unwrap();
        goal
    }

    pub async fn stored(&self, id: Uuid) -> Goal {
        self.store.get(id).await.unwrap().unwrap()
    }

    pub async fn set_snapshot(&self, now: DateTime<Utc>, snapshot: MetricSnapshot) {
        self.provider.set_snapshot(now.date_naive(), snapshot).await;
    }

    /// Drain every event emitted so far
    pub fn drain_events(&mut self) -> Vec<CelebrationEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// Noon UTC on the given day
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn goal(
    name: &str,
    habit: HabitType,
    target: f64,
    period: Period,
    created_at: DateTime<Utc>,
) -> Goal {
    Goal::new(name, habit, target, period, created_at)
}

pub fn snapshot(steps: u32, sleep_hours: f64, exercise_minutes: f64) -> MetricSnapshot {
    MetricSnapshot {
        steps,
        sleep_hours,
        heart_rate_avg: 68,
        active_minutes: 0.0,
        exercise_minutes,
    }
}
