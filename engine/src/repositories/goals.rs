//! Goal storage
//!
//! The engine only needs a small slice of an object store: list the active
//! goals, insert new ones and save mutations. Goals are never hard-deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use frisky_shared::{Goal, HabitType, Period, StoreError};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Persistent collection of goals
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Active goals in insertion order
    async fn list_active(&self) -> Result<Vec<Goal>, StoreError>;

    /// Every goal, including soft-deleted ones, in insertion order
    async fn list_all(&self) -> Result<Vec<Goal>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Goal>, StoreError>;

    async fn insert(&self, goal: Goal) -> Result<(), StoreError>;

    /// Overwrite the stored copy of an existing goal
    async fn save(&self, goal: &Goal) -> Result<(), StoreError>;

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.list_all().await?.is_empty())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Goal store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryGoalStore {
    goals: RwLock<Vec<Goal>>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_goals(goals: Vec<Goal>) -> Self {
        Self {
            goals: RwLock::new(goals),
        }
    }
}

#[async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn list_active(&self) -> Result<Vec<Goal>, StoreError> {
        let goals = self.goals.read().await;
        Ok(goals.iter().filter(|g| g.is_active).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Goal>, StoreError> {
        Ok(self.goals.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Goal>, StoreError> {
        let goals = self.goals.read().await;
        Ok(goals.iter().find(|g| g.id == id).cloned())
    }

    async fn insert(&self, goal: Goal) -> Result<(), StoreError> {
        let mut goals = self.goals.write().await;
        if goals.iter().any(|g| g.id == goal.id) {
            return Err(StoreError::Duplicate(goal.id.to_string()));
        }
        goals.push(goal);
        Ok(())
    }

    async fn save(&self, goal: &Goal) -> Result<(), StoreError> {
        let mut goals = self.goals.write().await;
        let slot = goals
            .iter_mut()
            .find(|g| g.id == goal.id)
            .ok_or_else(|| StoreError::NotFound(goal.id.to_string()))?;
        *slot = goal.clone();
        Ok(())
    }
}

// ============================================================================
// SQLite store
// ============================================================================

/// Goal row as stored in the `goals` table
///
/// Columns are read as plain text and numbers; conversion into a [`Goal`]
/// happens per row so one unreadable row never hides the others.
#[derive(Debug, Clone, FromRow)]
pub struct GoalRecord {
    pub id: String,
    pub name: String,
    pub habit_type: String,
    pub target: f64,
    pub period: String,
    pub streak: i64,
    pub last_completed: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid {column} {value:?}: {e}"))
}

impl TryFrom<GoalRecord> for Goal {
    type Error = String;

    fn try_from(record: GoalRecord) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&record.id).map_err(|e| format!("invalid id {:?}: {e}", record.id))?;
        let streak = u32::try_from(record.streak)
            .map_err(|_| format!("invalid streak {}", record.streak))?;
        let last_completed = record
            .last_completed
            .as_deref()
            .map(|value| parse_timestamp("last_completed", value))
            .transpose()?;
        let created_at = parse_timestamp("created_at", &record.created_at)?;

        Ok(Goal {
            id,
            name: record.name,
            habit_type: HabitType::from_stored(&record.habit_type),
            target: record.target,
            period: Period::from_stored(&record.period),
            streak,
            last_completed,
            is_active: record.is_active,
            created_at,
        })
    }
}

const SELECT_GOALS: &str = r#"
    SELECT id, name, habit_type, target, period, streak,
           last_completed, is_active, created_at
    FROM goals
"#;

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Decode a row, logging and dropping it if it cannot be read
fn decode_row(row: &SqliteRow) -> Option<Goal> {
    let record = match GoalRecord::from_row(row) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "Skipping unreadable goal row");
            return None;
        }
    };

    let id = record.id.clone();
    match Goal::try_from(record) {
        Ok(goal) => Some(goal),
        Err(e) => {
            warn!(goal_id = %id, error = %e, "Skipping malformed goal record");
            None
        }
    }
}

/// Goal store backed by the `goals` table
#[derive(Debug, Clone)]
pub struct SqliteGoalStore {
    pool: SqlitePool,
}

impl SqliteGoalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch(&self, only_active: bool) -> Result<Vec<Goal>, StoreError> {
        let sql = if only_active {
            format!("{SELECT_GOALS} WHERE is_active = 1 ORDER BY rowid")
        } else {
            format!("{SELECT_GOALS} ORDER BY rowid")
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(db_error)?;
        let goals: Vec<Goal> = rows.iter().filter_map(decode_row).collect();

        debug!(rows = rows.len(), goals = goals.len(), only_active, "Loaded goals");
        Ok(goals)
    }
}

#[async_trait]
impl GoalStore for SqliteGoalStore {
    async fn list_active(&self) -> Result<Vec<Goal>, StoreError> {
        self.fetch(true).await
    }

    async fn list_all(&self) -> Result<Vec<Goal>, StoreError> {
        self.fetch(false).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Goal>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_GOALS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().and_then(decode_row))
    }

    async fn insert(&self, goal: Goal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO goals (
                id, name, habit_type, target, period, streak,
                last_completed, is_active, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(goal.id.to_string())
        .bind(&goal.name)
        .bind(goal.habit_type.as_str())
        .bind(goal.target)
        .bind(goal.period.as_str())
        .bind(i64::from(goal.streak))
        .bind(goal.last_completed.map(|ts| ts.to_rfc3339()))
        .bind(goal.is_active)
        .bind(goal.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(goal.id.to_string())
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn save(&self, goal: &Goal) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET name = ?, habit_type = ?, target = ?, period = ?, streak = ?,
                last_completed = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&goal.name)
        .bind(goal.habit_type.as_str())
        .bind(goal.target)
        .bind(goal.period.as_str())
        .bind(i64::from(goal.streak))
        .bind(goal.last_completed.map(|ts| ts.to_rfc3339()))
        .bind(goal.is_active)
        .bind(goal.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(goal.id.to_string()));
        }
        Ok(())
    }
}
