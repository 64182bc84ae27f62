use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::err_context::ErrorContextExt;
use sqlx::Row;
use uuid::Uuid;

use super::PostgresScheduler;
use crate::domain::{
    ports::secondary::JobScheduler, ports::secondary::SchedulerError, RecurringJob, Subscription,
};

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    name: String,
    frequency: String,
    email: String,
    delegator_address: String,
    cron_expression: String,
    next_run_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for RecurringJob {
    type Error = SchedulerError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let subscription = Subscription::parse(&row.email, &row.frequency, &row.delegator_address)
            .map_err(|err| SchedulerError::Validation {
                context: format!("Invalid job stored in the database: {err}"),
            })?;
        Ok(RecurringJob {
            name: row.name,
            subscription,
            cron_expression: row.cron_expression,
            next_run_at: row.next_run_at,
        })
    }
}

#[async_trait]
impl JobScheduler for PostgresScheduler {
    #[tracing::instrument(name = "Scheduling a recurring job in postgres", skip(self))]
    async fn schedule(&self, job: &RecurringJob) -> Result<bool, SchedulerError> {
        let email: &str = job.subscription.email.as_ref();
        let delegator_address: &str = job.subscription.delegator_address.as_ref();
        // xmax is only zero on rows this statement inserted.
        let row = sqlx::query(
            r#"
            INSERT INTO recurring_jobs
                (id, name, frequency, email, delegator_address, cron_expression, next_run_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name, frequency, email, delegator_address)
            DO UPDATE SET
                cron_expression = EXCLUDED.cron_expression,
                next_run_at = EXCLUDED.next_run_at,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.name)
        .bind(job.subscription.frequency.as_str())
        .bind(email)
        .bind(delegator_address)
        .bind(&job.cron_expression)
        .bind(job.next_run_at)
        .fetch_one(&self.pool)
        .await
        .context(format!("Could not schedule job {}", job.name))?;

        let inserted: bool = row
            .try_get("inserted")
            .context("Could not read upsert outcome")?;
        Ok(inserted)
    }

    #[tracing::instrument(name = "Cancelling recurring jobs in postgres", skip(self))]
    async fn cancel(&self, name: &str, subscription: &Subscription) -> Result<u64, SchedulerError> {
        let email: &str = subscription.email.as_ref();
        let delegator_address: &str = subscription.delegator_address.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM recurring_jobs
            WHERE name = $1 AND frequency = $2 AND email = $3 AND delegator_address = $4
            "#,
        )
        .bind(name)
        .bind(subscription.frequency.as_str())
        .bind(email)
        .bind(delegator_address)
        .execute(&self.pool)
        .await
        .context(format!("Could not cancel job {name}"))?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "Listing recurring jobs in postgres", skip(self))]
    async fn list_jobs(&self) -> Result<Vec<RecurringJob>, SchedulerError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT name, frequency, email, delegator_address, cron_expression, next_run_at
            FROM recurring_jobs
            ORDER BY next_run_at, email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Could not list jobs")?;

        rows.into_iter().map(RecurringJob::try_from).collect()
    }
}
