use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::ports::secondary::{ContactError, SchedulerError};

#[derive(Debug)]
pub enum Error {
    /// The request does not describe a valid subscription.
    InvalidRequest {
        context: String,
        source: String,
    },
    /// The webhook access token is missing or wrong.
    Unauthorized {
        context: String,
    },
    /// The webhook body is not an array of events.
    InvalidPayload {
        context: String,
        source: serde_json::Error,
    },
    Contact {
        context: String,
        source: ContactError,
    },
    Scheduler {
        context: String,
        source: SchedulerError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest { context, source } => {
                write!(fmt, "Invalid Request: {context} | {source}")
            }
            Error::Unauthorized { context } => {
                write!(fmt, "Unauthorized: {context}")
            }
            Error::InvalidPayload { context, source } => {
                write!(fmt, "Invalid Payload: {context} | {source}")
            }
            Error::Contact { context, source } => {
                write!(fmt, "Contact Service: {context} | {source}")
            }
            Error::Scheduler { context, source } => {
                write!(fmt, "Job Scheduler: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<String>> for Error {
    fn from(err: ErrorContext<String>) -> Self {
        Error::InvalidRequest {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<serde_json::Error>> for Error {
    fn from(err: ErrorContext<serde_json::Error>) -> Self {
        Error::InvalidPayload {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<ContactError>> for Error {
    fn from(err: ErrorContext<ContactError>) -> Self {
        Error::Contact {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<SchedulerError>> for Error {
    fn from(err: ErrorContext<SchedulerError>) -> Self {
        Error::Scheduler {
            context: err.0,
            source: err.1,
        }
    }
}
