use clap::Parser;
use std::fmt;

use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::Settings;
use token_alert::application::opts::{Command, Error as OptsError, Opts};
use token_alert::application::{ApplicationBuilder, Error as ApplicationError};
use token_alert::telemetry::{self, Error as TelemetryError};

#[derive(Debug)]
pub enum Error {
    Telemetry {
        context: String,
        source: TelemetryError,
    },
    Options {
        context: String,
        source: OptsError,
    },
    Application {
        context: String,
        source: ApplicationError,
    },
    Serialization {
        context: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Telemetry { context, source } => {
                write!(fmt, "Could not set up telemetry: {context} | {source}")
            }
            Error::Application { context, source } => {
                write!(fmt, "Could not build application: {context} | {source}")
            }
            Error::Options { context, source } => {
                write!(fmt, "Options Error: {context} | {source}")
            }
            Error::Serialization { context, source } => {
                write!(fmt, "Serialization Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<TelemetryError>> for Error {
    fn from(err: ErrorContext<TelemetryError>) -> Self {
        Error::Telemetry {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<ApplicationError>> for Error {
    fn from(err: ErrorContext<ApplicationError>) -> Self {
        Error::Application {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<OptsError>> for Error {
    fn from(err: ErrorContext<OptsError>) -> Self {
        Error::Options {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<serde_json::Error>> for Error {
    fn from(err: ErrorContext<serde_json::Error>) -> Self {
        Error::Serialization {
            context: err.0,
            source: err.1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let subscriber =
        telemetry::get_subscriber("token-alert".to_string(), "info".to_string(), std::io::stdout);
    telemetry::init_subscriber(subscriber).context("Initializing tracing")?;

    let opts = Opts::parse();

    let cmd = opts.cmd.clone();

    let settings: Settings = opts.try_into().context("Compiling Application Settings")?;

    match cmd {
        Command::Config => {
            let settings =
                serde_json::to_string_pretty(&settings).context("Serializing settings")?;
            println!("{settings}");
        }
        Command::Run => {
            let app = ApplicationBuilder::new(settings)
                .await
                .context("could not build application")?
                .build()
                .context("could not build application")?;
            app.run_until_stopped()
                .await
                .context("application runtime error")?;
        }
    }
    Ok(())
}
