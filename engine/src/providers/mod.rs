//! Metric snapshot providers
//!
//! The platform health service is a black box: given a calendar day it
//! returns that day's aggregated readings or an error. A failed fetch means
//! "no update this cycle"; callers never apply partial results.

pub mod file;

use async_trait::async_trait;
use chrono::NaiveDate;
use frisky_shared::{MetricSnapshot, ProviderError};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub use file::JsonFileSnapshotProvider;

/// Source of daily metric snapshots
#[async_trait]
pub trait MetricSnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<MetricSnapshot, ProviderError>;
}

/// Provider serving snapshots from an in-memory table
#[derive(Debug, Default)]
pub struct StaticSnapshotProvider {
    snapshots: RwLock<HashMap<NaiveDate, MetricSnapshot>>,
}

impl StaticSnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot served for `date`
    pub async fn set_snapshot(&self, date: NaiveDate, snapshot: MetricSnapshot) {
        self.snapshots.write().await.insert(date, snapshot);
    }

    pub async fn clear(&self, date: NaiveDate) {
        self.snapshots.write().await.remove(&date);
    }
}

#[async_trait]
impl MetricSnapshotProvider for StaticSnapshotProvider {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<MetricSnapshot, ProviderError> {
        self.snapshots
            .read()
            .await
            .get(&date)
            .copied()
            .ok_or(ProviderError::NoData(date))
    }
}
