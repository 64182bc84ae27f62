use common::err_context::ErrorContextExt;

use super::{Coordinator, Error};
use crate::domain::{EventMetadata, Subscription, DIGEST_JOB_NAME};

/// How the subscriber's list membership was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRemoval {
    Removed { list_id: i64 },
    /// The provider does not know this email.
    UnknownRecipient,
    /// The recipient is not a member of the subscription's list.
    NotAMember,
}

/// Outcome of the two independent unsubscription steps.
#[derive(Debug)]
pub struct UnsubscribeReport {
    pub subscription: Subscription,
    pub list_removal: Result<ListRemoval, Error>,
    /// Number of jobs cancelled.
    pub job_cancellation: Result<u64, Error>,
}

impl UnsubscribeReport {
    pub fn is_complete(&self) -> bool {
        self.list_removal.is_ok() && self.job_cancellation.is_ok()
    }
}

impl Coordinator {
    /// Removes the subscriber from the delegator's list, and cancels the
    /// digest. The job is cancelled even if the list removal failed.
    #[tracing::instrument(name = "Unsubscribing", skip(self, metadata))]
    pub async fn unsubscribe(&self, metadata: &EventMetadata) -> Result<UnsubscribeReport, Error> {
        let subscription = metadata
            .subscription()
            .context("Invalid unsubscribe event")?;

        let list_removal = self.remove_from_list(&subscription).await;
        match &list_removal {
            Ok(removal) => tracing::info!("List removal: {removal:?}"),
            Err(err) => tracing::error!("List removal failed: {err}"),
        }

        let job_cancellation = self
            .scheduler
            .cancel(DIGEST_JOB_NAME, &subscription)
            .await
            .context("Could not cancel digest")
            .map_err(Error::from);
        match &job_cancellation {
            Ok(count) => tracing::info!("Cancelled {count} digest jobs"),
            Err(err) => tracing::error!("Job cancellation failed: {err}"),
        }

        Ok(UnsubscribeReport {
            subscription,
            list_removal,
            job_cancellation,
        })
    }

    async fn remove_from_list(&self, subscription: &Subscription) -> Result<ListRemoval, Error> {
        let Some(recipient) = self
            .contacts
            .find_recipient(&subscription.email)
            .await
            .context("Could not search recipient")?
        else {
            return Ok(ListRemoval::UnknownRecipient);
        };

        let name = subscription.list_name();
        let lists = self
            .contacts
            .recipient_lists(&recipient)
            .await
            .context("Could not fetch recipient lists")?;
        let Some(list) = lists.into_iter().find(|list| name.matches(&list.name)) else {
            return Ok(ListRemoval::NotAMember);
        };

        self.contacts
            .remove_recipient_from_list(list.id, &recipient)
            .await
            .context(format!("Could not remove recipient from list {name}"))?;
        Ok(ListRemoval::Removed { list_id: list.id })
    }
}
