//! Error types shared by the goal engine and its collaborators

use thiserror::Error;

/// Failure reported by a metric snapshot provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Health data not available: {0}")]
    Unavailable(String),

    #[error("No metrics recorded for {0}")]
    NoData(chrono::NaiveDate),

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Malformed snapshot data: {0}")]
    Malformed(String),
}

/// Failure reported by a goal or key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),
}
