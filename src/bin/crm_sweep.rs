//! Runs one sales sequence sweep against `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://crm@localhost/crm crm_sweep
//! ```
//!
//! Variables may also come from a `.env` file in the working directory. The
//! sweep settings are read from `CRM_SCHEDULE_POLICY` and
//! `CRM_SWEEP_BATCH_LIMIT`; log filtering follows `RUST_LOG`. Schedule the
//! binary externally (cron, a systemd timer) to run sweeps periodically.

use crm_engine::config::{ConfigError, EngineConfig};
use crm_engine::outreach::adapters::postgres::{PostgresActivityRecorder, PostgresEmailQueue};
use crm_engine::sequence::adapters::postgres::{PostgresSequenceRepository, SequencePgPool};
use crm_engine::sequence::services::{SequenceService, SequenceServiceError};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a sweep run.
#[derive(Debug, Error)]
enum SweepError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build connection pool: {0}")]
    Pool(#[source] PoolError),
    #[error("sweep failed: {0}")]
    Sweep(#[from] SequenceServiceError),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv_outcome = dotenvy::dotenv();
    init_tracing();
    match dotenv_outcome {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => debug!("no environment file found"),
        Err(err) => warn!(error = %err, "ignoring unreadable environment file"),
    }

    run_sweep().await.map_err(Into::into)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true))
        .init();
}

async fn run_sweep() -> Result<(), SweepError> {
    let config = EngineConfig::from_env()?;
    let database_url = std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(SweepError::MissingDatabaseUrl)?;
    let pool = build_pool(&database_url)?;

    let service = SequenceService::new(
        Arc::new(PostgresSequenceRepository::new(pool.clone())),
        Arc::new(PostgresEmailQueue::new(pool.clone())),
        Arc::new(PostgresActivityRecorder::new(pool)),
        Arc::new(DefaultClock),
    )
    .with_config(config.sequence);

    info!(
        schedule_policy = %config.sequence.schedule_policy,
        batch_limit = config.sequence.batch_limit.get(),
        "starting sequence sweep"
    );
    let results = service.process_due_steps().await?;

    let failed = results
        .iter()
        .filter(|result| result.outcome.is_error())
        .count();
    let completed = results.iter().filter(|result| result.completed).count();
    if failed > 0 {
        warn!(failed, "some enrollments failed and will be retried");
    }
    info!(
        processed = results.len(),
        completed,
        failed,
        "sequence sweep finished"
    );
    Ok(())
}

fn build_pool(database_url: &str) -> Result<SequencePgPool, SweepError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager).map_err(SweepError::Pool)
}
