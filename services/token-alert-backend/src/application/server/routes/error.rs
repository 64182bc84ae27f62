use axum::extract::Json;
use axum::http::status::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::fmt;

use crate::coordinator::Error as CoordinatorError;
use crate::domain::ports::secondary::ContactError;
use common::err_context::ErrorContext;

#[derive(Debug)]
pub enum Error {
    InvalidRequest {
        context: String,
        source: String,
    },
    Unauthorized {
        context: String,
    },
    /// The provider refused or failed the call.
    Provider {
        context: String,
        source: ContactError,
    },
    Internal {
        context: String,
        source: CoordinatorError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest { context, source } => {
                write!(fmt, "Invalid Request: {context} {source}")
            }
            Error::Unauthorized { context } => {
                write!(fmt, "Unauthorized: {context}")
            }
            Error::Provider { context, source } => {
                write!(fmt, "Provider: {context} {source}")
            }
            Error::Internal { context, source } => {
                write!(fmt, "Internal: {context} {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.standardize().into_response()
    }
}

impl From<ErrorContext<String>> for Error {
    fn from(err: ErrorContext<String>) -> Self {
        Error::InvalidRequest {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<CoordinatorError>> for Error {
    fn from(err: ErrorContext<CoordinatorError>) -> Self {
        let ErrorContext(context, source) = err;
        match source {
            CoordinatorError::InvalidRequest { source, .. } => {
                Error::InvalidRequest { context, source }
            }
            CoordinatorError::InvalidPayload { source, .. } => Error::InvalidRequest {
                context,
                source: source.to_string(),
            },
            CoordinatorError::Unauthorized { .. } => Error::Unauthorized { context },
            CoordinatorError::Contact { source, .. } => Error::Provider { context, source },
            source @ CoordinatorError::Scheduler { .. } => Error::Internal { context, source },
        }
    }
}

impl Error {
    pub fn standardize(&self) -> (StatusCode, Json<Value>) {
        match self {
            Error::InvalidRequest { context, source } => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": format!("{context}: {source}"),
                    "code": "request/invalid"
                })),
            ),
            Error::Unauthorized { context } => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "webhook/unauthorized"
                })),
            ),
            // The provider's own error payload is handed back untouched.
            Error::Provider { context, source } => {
                let raw = source.body();
                let error = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "status": "fail",
                        "message": context,
                        "code": "provider/failure",
                        "error": error
                    })),
                )
            }
            Error::Internal { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "internal"
                })),
            ),
        }
    }
}
