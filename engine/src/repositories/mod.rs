//! Storage repositories
//!
//! Traits for the goal store and key-value store the engine depends on,
//! with in-memory and SQLite implementations.

pub mod goals;
pub mod kv;

pub use goals::{GoalRecord, GoalStore, InMemoryGoalStore, SqliteGoalStore};
pub use kv::{InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
