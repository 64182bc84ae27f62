use chrono::{DateTime, Utc};
use common::err_context::ErrorContextExt;

use super::{Coordinator, Error};
use crate::domain::{
    ContactList, EventMetadata, ListName, RecipientId, RecurringJob, Rejection, Subscription,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled {
        subscription: Subscription,
        recipient: RecipientId,
        list: ContactList,
        /// False when the job already existed, and was only refreshed.
        job_created: bool,
    },
    /// The confirmation was not valid; nothing was created.
    Rejected(Rejection),
}

impl Coordinator {
    /// Confirms a subscription from a confirmation link click, then adds the
    /// subscriber to the delegator's list and schedules the digest.
    #[tracing::instrument(name = "Enrolling subscriber", skip(self, metadata))]
    pub async fn enroll(
        &self,
        metadata: &EventMetadata,
        now: DateTime<Utc>,
    ) -> Result<EnrollOutcome, Error> {
        let subscription = match self.signer.verify(&metadata.confirmation_claims(), now) {
            Ok(subscription) => subscription,
            Err(rejection) => {
                tracing::debug!("Confirmation rejected: {rejection}");
                return Ok(EnrollOutcome::Rejected(rejection));
            }
        };

        let recipient = self
            .contacts
            .create_recipient(&subscription.email)
            .await
            .context("Could not create recipient")?;

        let list = self.resolve_list(&subscription.list_name()).await?;

        self.contacts
            .add_recipient_to_list(list.id, &recipient)
            .await
            .context(format!("Could not add recipient to list {}", list.name))?;

        let job = RecurringJob::digest(subscription.clone(), now);
        let job_created = self
            .scheduler
            .schedule(&job)
            .await
            .context("Could not schedule digest")?;

        tracing::info!(
            list = %list.name,
            next_run_at = %job.next_run_at,
            job_created,
            "Subscriber enrolled"
        );
        Ok(EnrollOutcome::Enrolled {
            subscription,
            recipient,
            list,
            job_created,
        })
    }

    /// Finds the list with that exact name, or creates it.
    async fn resolve_list(&self, name: &ListName) -> Result<ContactList, Error> {
        let lists = self
            .contacts
            .lists()
            .await
            .context("Could not fetch contact lists")?;
        if let Some(list) = lists.into_iter().find(|list| name.matches(&list.name)) {
            return Ok(list);
        }
        tracing::info!(list = %name, "Creating contact list");
        let list = self
            .contacts
            .create_list(name.as_ref())
            .await
            .context(format!("Could not create list {name}"))?;
        Ok(list)
    }
}
