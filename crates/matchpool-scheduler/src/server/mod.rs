//! Scheduler setup and tick loop

use std::sync::Arc;

use chrono::Utc;
use matchpool_cache::{Publisher, RedisNotificationDispatcher, RedisPool};
use matchpool_common::AppConfig;
use matchpool_common::AppError;
use matchpool_core::{Snowflake, SnowflakeGenerator};
use matchpool_db::{
    apply_schema, create_pool, DatabaseConfig, PgCompatibilityProvider, PgMatchResultRepository,
    PgPoolMemberRepository, PgPoolRepository,
};
use matchpool_service::{RoundOutcome, RoundScheduler, SchedulerOptions, ServiceContextBuilder};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::state::AppState;

/// Connect to Postgres and Redis and build the scheduler
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    apply_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    if let Err(e) = redis_pool.health_check().await {
        // Notifications are fire-and-forget; rounds still run without Redis
        warn!(error = %e, "Redis unreachable, match notifications will fail until it recovers");
    } else {
        info!("Redis connection established");
    }

    let members = Arc::new(PgPoolMemberRepository::new(pool.clone()));
    let context = ServiceContextBuilder::new()
        .pool_repo(Arc::new(PgPoolRepository::new(pool.clone())))
        .member_repo(members.clone())
        .membership(members)
        .match_repo(Arc::new(PgMatchResultRepository::new(pool.clone())))
        .compatibility(Arc::new(PgCompatibilityProvider::new(pool)))
        .notifier(Arc::new(RedisNotificationDispatcher::new(Publisher::new(redis_pool))))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .matching_config(config.matching)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let scheduler = RoundScheduler::new(context, SchedulerOptions::from(&config.scheduler));
    Ok(AppState::new(scheduler, config))
}

/// Tick until Ctrl-C
///
/// A tick in progress when the signal arrives finishes before returning.
pub async fn run_ticks(state: &AppState) -> Result<(), AppError> {
    let mut ticker = interval(state.config().scheduler.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        tick_secs = state.config().scheduler.tick_secs,
        workers = state.scheduler().options().workers,
        "Scheduler started"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_tick(state).await,
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutdown signal received, stopping scheduler");
                return Ok(());
            }
        }
    }
}

async fn run_tick(state: &AppState) {
    match state.scheduler().run_due_rounds(Utc::now()).await {
        Ok(outcomes) => {
            for outcome in outcomes.iter().filter(|o| !o.is_generated()) {
                info!(
                    pool_id = %outcome.pool_id,
                    round = ?outcome.round,
                    status = outcome.status.label(),
                    "Pool not generated this tick"
                );
            }
        }
        // Loading due pools failed; the next tick retries
        Err(e) => error!(error = %e, "Tick failed"),
    }
}

/// Run one round for a single pool immediately
pub async fn trigger(state: &AppState, pool_id: Snowflake) -> Result<RoundOutcome, AppError> {
    let outcome = state.scheduler().trigger_round_now(pool_id, Utc::now()).await?;
    Ok(outcome)
}

/// Run the daemon with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_app_state(config).await?;
    run_ticks(&state).await
}
