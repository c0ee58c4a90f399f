//! Snapshot provider backed by a JSON export file
//!
//! The platform bridge writes one object keyed by ISO date:
//!
//! ```json
//! { "2024-06-12": { "steps": 8421, "sleep_hours": 7.2, "exercise_minutes": 31 } }
//! ```
//!
//! The file is re-read on every fetch so new exports are picked up by the
//! next pass without a restart.

use super::MetricSnapshotProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use frisky_shared::{MetricSnapshot, ProviderError};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileSnapshotProvider {
    path: PathBuf,
}

impl JsonFileSnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetricSnapshotProvider for JsonFileSnapshotProvider {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<MetricSnapshot, ProviderError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ProviderError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut snapshots: HashMap<NaiveDate, MetricSnapshot> = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let snapshot = snapshots.remove(&date).ok_or(ProviderError::NoData(date))?;
        if !snapshot.sleep_hours.is_finite()
            || snapshot.sleep_hours < 0.0
            || !snapshot.exercise_minutes.is_finite()
            || snapshot.exercise_minutes < 0.0
            || !snapshot.active_minutes.is_finite()
            || snapshot.active_minutes < 0.0
        {
            return Err(ProviderError::Malformed(format!(
                "negative or non-finite reading for {}",
                date
            )));
        }

        Ok(snapshot)
    }
}
