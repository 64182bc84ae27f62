/// Interface to the email provider: contacts, lists and transactional mail.
use async_trait::async_trait;
use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::{ContactList, Mail, ProviderResponse, RecipientId, SubscriberEmail};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactService {
    /// Sends a templated email, and returns the provider's answer.
    async fn send_mail(&self, mail: Mail) -> Result<ProviderResponse, Error>;

    /// Creates the contact, or returns the existing one.
    async fn create_recipient(&self, email: &SubscriberEmail) -> Result<RecipientId, Error>;

    async fn find_recipient(&self, email: &SubscriberEmail) -> Result<Option<RecipientId>, Error>;

    /// All the lists known to the provider.
    async fn lists(&self) -> Result<Vec<ContactList>, Error>;

    async fn create_list(&self, name: &str) -> Result<ContactList, Error>;

    /// Adding a contact which is already a member is not an error.
    async fn add_recipient_to_list(&self, list_id: i64, recipient: &RecipientId)
        -> Result<(), Error>;

    /// The lists the contact is a member of.
    async fn recipient_lists(&self, recipient: &RecipientId) -> Result<Vec<ContactList>, Error>;

    async fn remove_recipient_from_list(
        &self,
        list_id: i64,
        recipient: &RecipientId,
    ) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Error {
    /// The request could not be sent, or timed out.
    Connection {
        context: String,
        source: reqwest::Error,
    },
    /// The response body is not what we expected.
    Decoding {
        context: String,
        source: reqwest::Error,
    },
    /// The provider answered with a non success status.
    Status {
        context: String,
        status: u16,
        body: String,
    },
    Missing {
        context: String,
    },
    Configuration {
        context: String,
    },
}

impl Error {
    /// Raw payload to hand back to the caller.
    pub fn body(&self) -> String {
        match self {
            Error::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection { context, source } => {
                write!(fmt, "Provider Connection: {context} | {source}")
            }
            Error::Decoding { context, source } => {
                write!(fmt, "Provider Response: {context} | {source}")
            }
            Error::Status {
                context,
                status,
                body,
            } => {
                write!(fmt, "Provider Status: {context} | {status} {body}")
            }
            Error::Missing { context } => {
                write!(fmt, "Missing: {context}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Provider Configuration: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<reqwest::Error>> for Error {
    fn from(err: ErrorContext<reqwest::Error>) -> Self {
        if err.1.is_decode() {
            Error::Decoding {
                context: err.0,
                source: err.1,
            }
        } else {
            Error::Connection {
                context: err.0,
                source: err.1,
            }
        }
    }
}
