//! Engine error handling
//!
//! Passes never return these for per-goal failures; those are logged and
//! counted in the pass report. `EngineError` surfaces from the operations a
//! caller asked for directly (creating a goal, reading the mood).

use frisky_shared::{ProviderError, StoreError, ValidationError};
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Metric provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::Provider(_) => "PROVIDER_ERROR",
            EngineError::Store(_) => "STORAGE_ERROR",
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
