use async_trait::async_trait;
use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::{RecurringJob, Subscription};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobScheduler {
    /// Stores the job, replacing the one with the same key if any.
    /// Returns true when a new job was created.
    async fn schedule(&self, job: &RecurringJob) -> Result<bool, Error>;

    /// Removes the jobs named `name` for this subscription, and returns how
    /// many were removed.
    async fn cancel(&self, name: &str, subscription: &Subscription) -> Result<u64, Error>;

    async fn list_jobs(&self) -> Result<Vec<RecurringJob>, Error>;
}

#[derive(Debug)]
pub enum Error {
    /// Error returned by sqlx
    Database {
        context: String,
        source: sqlx::Error,
    },
    /// Stored data cannot be turned back into a job
    Validation {
        context: String,
    },
    /// Connection issue with the database
    Connection {
        context: String,
        source: sqlx::Error,
    },
    Migration {
        context: String,
        source: sqlx::migrate::MigrateError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database { context, source } => {
                write!(fmt, "Scheduler Database: {context} | {source}")
            }
            Error::Validation { context } => {
                write!(fmt, "Scheduler Data: {context}")
            }
            Error::Connection { context, source } => {
                write!(fmt, "Scheduler Connection: {context} | {source}")
            }
            Error::Migration { context, source } => {
                write!(fmt, "Scheduler Migration: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<sqlx::Error>> for Error {
    fn from(err: ErrorContext<sqlx::Error>) -> Self {
        match err.1 {
            sqlx::Error::PoolTimedOut => Error::Connection {
                context: format!("PostgreSQL Scheduler: Connection Timeout: {}", err.0),
                source: err.1,
            },
            sqlx::Error::Database(_) => Error::Database {
                context: format!("PostgreSQL Scheduler: Database: {}", err.0),
                source: err.1,
            },
            _ => Error::Connection {
                context: format!(
                    "PostgreSQL Scheduler: Could not establish a connection: {}",
                    err.0
                ),
                source: err.1,
            },
        }
    }
}

impl From<ErrorContext<sqlx::migrate::MigrateError>> for Error {
    fn from(err: ErrorContext<sqlx::migrate::MigrateError>) -> Self {
        Error::Migration {
            context: err.0,
            source: err.1,
        }
    }
}
