use common::err_context::ErrorContext;
use std::fmt;

use super::listener::Error as ListenerError;
use crate::domain::ports::secondary::{ContactError, SchedulerError};

#[derive(Debug)]
pub enum Error {
    Listener {
        context: String,
        source: ListenerError,
    },
    Contact {
        context: String,
        source: ContactError,
    },
    Scheduler {
        context: String,
        source: SchedulerError,
    },
    Server {
        context: String,
        source: hyper::Error,
    },
    Configuration {
        context: String,
    },
    /// A component was not given to the builder.
    Missing {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Listener { context, source } => {
                write!(fmt, "Could not build TCP listener: {context} | {source}")
            }
            Error::Contact { context, source } => {
                write!(fmt, "Contact Service Error: {context} | {source}")
            }
            Error::Scheduler { context, source } => {
                write!(fmt, "Job Scheduler Error: {context} | {source}")
            }
            Error::Server { context, source } => {
                write!(fmt, "Application Server Error: {context} | {source}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Application Configuration Error: {context}")
            }
            Error::Missing { context } => {
                write!(fmt, "Application Builder: Missing {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<ListenerError>> for Error {
    fn from(err: ErrorContext<ListenerError>) -> Self {
        Error::Listener {
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

impl From<ErrorContext<hyper::Error>> for Error {
    fn from(err: ErrorContext<hyper::Error>) -> Self {
        Error::Server {
            context: err.0,
            source: err.1,
        }
    }
}
