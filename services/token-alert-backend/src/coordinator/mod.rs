//! Subscription lifecycle.
//!
//! The coordinator validates inbound requests and webhook events, and drives
//! the contact provider and the job scheduler accordingly. It holds no state
//! of its own: the provider and the scheduler are the source of truth.

mod confirmation;
mod enroll;
mod error;
mod unsubscribe;

pub use self::confirmation::{ConfirmationRequest, CONFIRMATION_SUBJECT};
pub use self::enroll::EnrollOutcome;
pub use self::error::Error;
pub use self::unsubscribe::{ListRemoval, UnsubscribeReport};

use chrono::Utc;
use common::err_context::ErrorContextExt;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::domain::ports::secondary::{ContactService, JobScheduler};
use crate::domain::{ConfirmationSigner, WebhookEvent, WebhookRoute};

pub type DynContacts = Arc<dyn ContactService + Send + Sync>;
pub type DynScheduler = Arc<dyn JobScheduler + Send + Sync>;

pub struct Coordinator {
    contacts: DynContacts,
    scheduler: DynScheduler,
    signer: ConfirmationSigner,
    // Public url of the site, used to build confirmation links.
    base_url: String,
    access_token: Secret<String>,
}

/// What became of a webhook delivery.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The batch held no event.
    Empty,
    /// The event's url is neither an unsubscribe nor a confirmation link.
    Ignored,
    Enrollment(Result<EnrollOutcome, Error>),
    Unsubscription(Result<UnsubscribeReport, Error>),
}

impl Coordinator {
    pub fn new(
        contacts: DynContacts,
        scheduler: DynScheduler,
        signer: ConfirmationSigner,
        base_url: String,
        access_token: Secret<String>,
    ) -> Self {
        Coordinator {
            contacts,
            scheduler,
            signer,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Handles a delivery of the provider's event webhook.
    ///
    /// Only the first event of the batch is processed. Failures inside the
    /// triggered flow are logged and reported in the outcome; only an
    /// unauthorized delivery or a malformed body is an error.
    #[tracing::instrument(name = "Dispatching webhook", skip_all)]
    pub async fn dispatch_webhook(
        &self,
        access_token: Option<&str>,
        payload: &[u8],
    ) -> Result<DispatchOutcome, Error> {
        self.authorize(access_token)?;

        let events: Vec<WebhookEvent> =
            serde_json::from_slice(payload).context("Expected an array of webhook events")?;
        if events.len() > 1 {
            tracing::debug!("Skipping {} trailing events", events.len() - 1);
        }
        let Some(event) = events.into_iter().next() else {
            return Ok(DispatchOutcome::Empty);
        };

        let outcome = match event.route() {
            WebhookRoute::Unsubscribe => {
                let report = self.unsubscribe(&event.metadata()).await;
                match &report {
                    Ok(report) if !report.is_complete() => {
                        tracing::warn!("Unsubscription left inconsistencies: {report:?}");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!("Unsubscription failed: {err}"),
                }
                DispatchOutcome::Unsubscription(report)
            }
            WebhookRoute::Confirm => {
                let enrollment = self.enroll(&event.metadata(), Utc::now()).await;
                if let Err(err) = &enrollment {
                    tracing::error!("Enrollment failed: {err}");
                }
                DispatchOutcome::Enrollment(enrollment)
            }
            WebhookRoute::Ignored => {
                tracing::debug!("Ignoring event for url {:?}", event.url);
                DispatchOutcome::Ignored
            }
        };
        Ok(outcome)
    }

    fn authorize(&self, access_token: Option<&str>) -> Result<(), Error> {
        let expected = self.access_token.expose_secret().as_bytes();
        match access_token {
            Some(token) if bool::from(token.as_bytes().ct_eq(expected)) => Ok(()),
            Some(_) => Err(Error::Unauthorized {
                context: "Webhook access token mismatch".to_string(),
            }),
            None => Err(Error::Unauthorized {
                context: "Missing webhook access token".to_string(),
            }),
        }
    }
}
