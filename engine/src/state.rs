//! Application state management
//!
//! Builds the process-wide collaborators once at startup: the goal store,
//! the celebration tracker and its key-value store, the metric provider and
//! the goals service. Exactly one tracker exists per running process; it is
//! handed to the service by reference rather than reached through a global.

use crate::config::EngineConfig;
use crate::db;
use crate::providers::{JsonFileSnapshotProvider, MetricSnapshotProvider};
use crate::repositories::{GoalStore, KeyValueStore, SqliteGoalStore, SqliteKeyValueStore};
use crate::services::{CelebrationSink, CelebrationTracker, GoalsService};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use frisky_shared::to_local_date;
use std::sync::Arc;

/// Shared application state
///
/// All fields are Arc'd, so cloning is O(1).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EngineConfig>,
    pub goals: Arc<GoalsService>,
    pub tracker: Arc<CelebrationTracker>,
}

impl AppState {
    /// Wire collaborators from configuration, backed by the SQLite database
    pub async fn from_config(
        config: EngineConfig,
        sink: Arc<dyn CelebrationSink>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let pool = db::create_pool(
            &config.storage.database_path(),
            config.storage.max_connections,
        )
        .await?;
        db::run_migrations(&pool).await?;
        db::health_check(&pool).await?;

        let store: Arc<dyn GoalStore> = Arc::new(SqliteGoalStore::new(pool.clone()));
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));

        let provider: Arc<dyn MetricSnapshotProvider> =
            Arc::new(JsonFileSnapshotProvider::new(&config.provider.snapshot_file));

        let offset = config.calendar.offset();
        Ok(Self::new(config, store, kv, provider, sink, offset, now).await)
    }

    /// Wire collaborators explicitly
    pub async fn new(
        config: EngineConfig,
        store: Arc<dyn GoalStore>,
        kv: Arc<dyn KeyValueStore>,
        provider: Arc<dyn MetricSnapshotProvider>,
        sink: Arc<dyn CelebrationSink>,
        offset: FixedOffset,
        now: DateTime<Utc>,
    ) -> Self {
        let tracker = Arc::new(CelebrationTracker::load(kv, to_local_date(now, offset)).await);
        let goals = Arc::new(GoalsService::new(
            store,
            provider,
            tracker.clone(),
            sink,
            offset,
        ));

        Self {
            config: Arc::new(config),
            goals,
            tracker,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn goals(&self) -> &GoalsService {
        &self.goals
    }
}
