/// Implementation of the job scheduler using postgres
mod scheduler;

use common::err_context::ErrorContextExt;
use common::settings::DatabaseSettings;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::ports::secondary::SchedulerError as Error;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Recurring jobs stored in the `recurring_jobs` table, unique per
/// `(name, frequency, email, delegator_address)`.
#[derive(Debug, Clone)]
pub struct PostgresScheduler {
    pub pool: PgPool,
}

impl PostgresScheduler {
    /// Connects, and brings the schema up to date.
    pub async fn new(config: &DatabaseSettings) -> Result<PostgresScheduler, Error> {
        let pool = connect_with_options(config).await?;
        tracing::debug!("Connected Postgres Pool to {}", config.connection_string());
        MIGRATOR
            .run(&pool)
            .await
            .context("Could not run scheduler migrations")?;
        Ok(PostgresScheduler { pool })
    }
}

pub async fn connect_with_options(config: &DatabaseSettings) -> Result<PgPool, Error> {
    let options = config.connect_options();
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(config.connection_timeout))
        .connect_with(options)
        .await
        .context(format!(
            "Could not establish connection to {} with timeout {}",
            config.connection_string(),
            config.connection_timeout
        ))?;

    Ok(pool)
}
