//! Celebration de-duplication
//!
//! Tracks which goals already triggered a celebration today. One tracker is
//! built per process and shared by reference; it is the only authority on
//! "was this goal celebrated today". The set empties the first time any
//! call observes a new calendar day, so no timer is needed.

use crate::repositories::KeyValueStore;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Key holding the celebrated goal IDs
pub const CELEBRATED_GOALS_KEY: &str = "celebrated_goals";
/// Key holding the date of the last day check
pub const LAST_CHECK_DATE_KEY: &str = "last_check_date";

/// Day-scoped celebration state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationRecord {
    pub celebrated: BTreeSet<Uuid>,
    pub last_check_date: NaiveDate,
}

pub struct CelebrationTracker {
    store: Arc<dyn KeyValueStore>,
    record: Mutex<CelebrationRecord>,
}

impl CelebrationTracker {
    /// Restore persisted state and apply the day check for `today`
    ///
    /// Missing or malformed persisted values are treated as empty. A stored
    /// set without a stored date is kept and assumed to belong to `today`.
    pub async fn load(store: Arc<dyn KeyValueStore>, today: NaiveDate) -> Self {
        let celebrated = match store.get(CELEBRATED_GOALS_KEY).await {
            Ok(Some(value)) => parse_goal_ids(&value),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read celebrated goals, starting empty");
                BTreeSet::new()
            }
        };

        let last_check_date = match store.get(LAST_CHECK_DATE_KEY).await {
            Ok(Some(value)) => serde_json::from_value::<NaiveDate>(value).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read last check date");
                None
            }
        };

        let record = CelebrationRecord {
            celebrated,
            last_check_date: last_check_date.unwrap_or(today),
        };

        debug!(
            celebrated = record.celebrated.len(),
            last_check_date = %record.last_check_date,
            "Loaded celebration state"
        );

        let tracker = Self {
            store,
            record: Mutex::new(record),
        };
        tracker.reset_if_new_day(today).await;
        tracker
    }

    /// Whether the goal was already celebrated on `today`
    pub async fn has_been_celebrated(&self, goal_id: Uuid, today: NaiveDate) -> bool {
        let mut record = self.record.lock().await;
        self.roll_over(&mut record, today).await;
        record.celebrated.contains(&goal_id)
    }

    /// Record that the goal has been celebrated on `today`
    pub async fn mark_as_celebrated(&self, goal_id: Uuid, today: NaiveDate) {
        let mut record = self.record.lock().await;
        self.roll_over(&mut record, today).await;
        if record.celebrated.insert(goal_id) {
            self.persist(&record).await;
        }
    }

    /// Clear the set if `today` differs from the last checked day
    ///
    /// Returns `true` when a reset happened.
    pub async fn reset_if_new_day(&self, today: NaiveDate) -> bool {
        let mut record = self.record.lock().await;
        self.roll_over(&mut record, today).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> CelebrationRecord {
        self.record.lock().await.clone()
    }

    async fn roll_over(&self, record: &mut CelebrationRecord, today: NaiveDate) -> bool {
        if record.last_check_date == today {
            return false;
        }

        info!(
            previous = %record.last_check_date,
            today = %today,
            cleared = record.celebrated.len(),
            "New day, clearing celebrated goals"
        );
        record.celebrated.clear();
        record.last_check_date = today;
        self.persist(record).await;
        true
    }

    async fn persist(&self, record: &CelebrationRecord) {
        let ids: Vec<String> = record.celebrated.iter().map(Uuid::to_string).collect();

        if let Err(e) = self.store.set(CELEBRATED_GOALS_KEY, json!(ids)).await {
            error!(error = %e, "Failed to persist celebrated goals");
        }
        if let Err(e) = self
            .store
            .set(LAST_CHECK_DATE_KEY, json!(record.last_check_date))
            .await
        {
            error!(error = %e, "Failed to persist last check date");
        }
    }
}

fn parse_goal_ids(value: &Value) -> BTreeSet<Uuid> {
    let Some(items) = value.as_array() else {
        warn!("Celebrated goals entry is not an array, ignoring");
        return BTreeSet::new();
    };

    items
        .iter()
        .filter_map(|item| item.as_str().and_then(|s| Uuid::parse_str(s).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryKeyValueStore;
    use async_trait::async_trait;
    use frisky_shared::StoreError;
    use proptest::prelude::*;

    /// Store that reads nothing and refuses every write
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Database("attempt to write a readonly database".to_string()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    async fn tracker(today: NaiveDate) -> (Arc<InMemoryKeyValueStore>, CelebrationTracker) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let tracker = CelebrationTracker::load(store.clone(), today).await;
        (store, tracker)
    }

    #[tokio::test]
    async fn test_mark_and_query_same_day() {
        let (_, tracker) = tracker(day(12)).await;
        let id = Uuid::new_v4();

        assert!(!tracker.has_been_celebrated(id, day(12)).await);
        tracker.mark_as_celebrated(id, day(12)).await;
        assert!(tracker.has_been_celebrated(id, day(12)).await);
    }

    #[tokio::test]
    async fn test_new_day_clears_everything() {
        let (_, tracker) = tracker(day(12)).await;
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            tracker.mark_as_celebrated(*id, day(12)).await;
        }

        assert!(tracker.reset_if_new_day(day(13)).await);
        for id in &ids {
            assert!(!tracker.has_been_celebrated(*id, day(13)).await);
        }
        assert!(!tracker.reset_if_new_day(day(13)).await);
    }

    #[tokio::test]
    async fn test_query_folds_in_day_check() {
        let (_, tracker) = tracker(day(12)).await;
        let id = Uuid::new_v4();
        tracker.mark_as_celebrated(id, day(12)).await;

        assert!(!tracker.has_been_celebrated(id, day(13)).await);
        assert_eq!(tracker.snapshot().await.last_check_date, day(13));
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let (store, tracker) = tracker(day(12)).await;
        let id = Uuid::new_v4();
        tracker.mark_as_celebrated(id, day(12)).await;
        drop(tracker);

        let reloaded = CelebrationTracker::load(store.clone(), day(12)).await;
        assert!(reloaded.has_been_celebrated(id, day(12)).await);

        let next_day = CelebrationTracker::load(store.clone(), day(13)).await;
        assert!(next_day.snapshot().await.celebrated.is_empty());
        assert_eq!(
            store.get(CELEBRATED_GOALS_KEY).await.unwrap(),
            Some(json!(Vec::<String>::new()))
        );
        assert_eq!(
            store.get(LAST_CHECK_DATE_KEY).await.unwrap(),
            Some(json!("2024-06-13"))
        );
    }

    #[tokio::test]
    async fn test_malformed_state_loads_empty() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set(CELEBRATED_GOALS_KEY, json!(["not-a-uuid", 7]))
            .await
            .unwrap();
        store.set(LAST_CHECK_DATE_KEY, json!("yesterday-ish")).await.unwrap();

        let tracker = CelebrationTracker::load(store, day(12)).await;
        let record = tracker.snapshot().await;
        assert!(record.celebrated.is_empty());
        assert_eq!(record.last_check_date, day(12));
    }

    #[tokio::test]
    async fn test_set_without_date_is_kept_for_today() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let id = Uuid::new_v4();
        store
            .set(CELEBRATED_GOALS_KEY, json!([id.to_string()]))
            .await
            .unwrap();

        let tracker = CelebrationTracker::load(store, day(12)).await;
        assert!(tracker.has_been_celebrated(id, day(12)).await);
        assert!(!tracker.has_been_celebrated(id, day(13)).await);
    }

    #[tokio::test]
    async fn test_write_failures_keep_memory_authoritative() {
        let tracker = CelebrationTracker::load(Arc::new(ReadOnlyStore), day(12)).await;
        let id = Uuid::new_v4();

        tracker.mark_as_celebrated(id, day(12)).await;
        assert!(tracker.has_been_celebrated(id, day(12)).await);

        assert!(tracker.reset_if_new_day(day(13)).await);
        let record = tracker.snapshot().await;
        assert!(record.celebrated.is_empty());
        assert_eq!(record.last_check_date, day(13));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_date_change_forgets_every_goal(count in 1usize..8, first in 0u32..3_000, shift in -400i64..400) {
            prop_assume!(shift != 0);
            let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(i64::from(first));
            let other = base + chrono::Duration::days(shift);

            tokio_test::block_on(async {
                let (_, tracker) = tracker(base).await;
                let ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
                for id in &ids {
                    tracker.mark_as_celebrated(*id, base).await;
                }

                for id in &ids {
                    assert!(!tracker.has_been_celebrated(*id, other).await);
                }
            });
        }
    }
}
