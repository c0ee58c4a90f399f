//! Configuration management for the Frisky goal engine
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FRISKY__)

use anyhow::Result;
use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub storage: StorageConfig,
    pub provider: ProviderConfig,
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("frisky.db")
    }
}

/// Metric snapshot provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// JSON file of daily snapshots keyed by ISO date
    pub snapshot_file: PathBuf,
}

/// Pass scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub poll_interval_secs: u64,
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Calendar configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Offset used to turn timestamps into calendar days; local time if unset
    pub utc_offset_minutes: Option<i32>,
}

impl CalendarConfig {
    /// Resolve the effective offset, falling back to the host's local offset
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

/// Goal lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Seed the three default goals when the store is empty
    pub seed_defaults: bool,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self { seed_defaults: true }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
                max_connections: default_max_connections(),
            },
            provider: ProviderConfig {
                snapshot_file: PathBuf::from("./data/snapshots.json"),
            },
            schedule: ScheduleConfig {
                poll_interval_secs: 60,
            },
            calendar: CalendarConfig::default(),
            goals: GoalsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FRISKY__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., FRISKY__SCHEDULE__POLL_INTERVAL_SECS=30 sets schedule.poll_interval_secs
            .add_source(config::Environment::with_prefix("FRISKY").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
