use config::ConfigError;
use std::fmt;

use crate::err_context::ErrorContext;

#[derive(Debug)]
pub enum Error {
    Configuration {
        context: String,
        source: ConfigError,
    },
    /// A `key=value` override could not be read as TOML.
    Override {
        assignment: String,
        source: ConfigError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { context, source } => {
                write!(fmt, "Could not merge configuration: {context} | {source}")
            }
            Error::Override { assignment, source } => {
                write!(fmt, "Invalid setting override '{assignment}' | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<ConfigError>> for Error {
    fn from(ctx: ErrorContext<ConfigError>) -> Error {
        let ErrorContext(context, source) = ctx;
        Error::Configuration { context, source }
    }
}
