//! Frisky Goal Engine
//!
//! Runs the streak reset-check and completion-check passes on a fixed
//! interval against the JSON-backed goal store and the snapshot export
//! written by the platform bridge.

use anyhow::Result;
use chrono::Utc;
use frisky_engine::{config, services::LoggingSink, state::AppState};
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::EngineConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::EngineConfig::is_production() { "production" } else { "development" },
        data_dir = %config.storage.data_dir.display(),
        "Starting Frisky goal engine"
    );

    let state = AppState::from_config(config.clone(), Arc::new(LoggingSink), Utc::now()).await?;

    if config.goals.seed_defaults {
        state.goals().seed_default_goals(Utc::now()).await?;
    }

    let mut ticker = interval(config.schedule.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => run_cycle(&state).await,
        }
    }

    info!("Engine shutdown complete");
    Ok(())
}

/// One refresh: reset lapsed streaks, then count new completions
async fn run_cycle(state: &AppState) {
    let now = Utc::now();

    let reset = state.goals().run_reset_check(now).await;
    let completion = state.goals().run_completion_check(now).await;

    info!(
        reset_skipped = reset.skipped,
        streaks_reset = reset.reset.len(),
        completion_skipped = completion.skipped,
        completed = completion.completed.len(),
        celebrated = completion.celebration.is_some(),
        save_failures = reset.save_failures + completion.save_failures,
        "Cycle complete"
    );

    match state.goals().current_mood(now).await {
        Ok(mood) => info!(mood = %mood, "Pet mood"),
        Err(e) => warn!(error = %e, "Could not compute pet mood"),
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::EngineConfig::is_production() {
            "frisky_engine=info,frisky_shared=info".into()
        } else {
            "frisky_engine=debug,frisky_shared=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::EngineConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
