use chrono::{DateTime, Utc};

use super::Subscription;

/// Name under which digest jobs are registered with the scheduler.
pub const DIGEST_JOB_NAME: &str = "email";

/// A scheduled task triggering the periodic digest of a subscription.
///
/// Jobs are unique per `(name, frequency, email, delegator address)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringJob {
    pub name: String,
    pub subscription: Subscription,
    pub cron_expression: String,
    pub next_run_at: DateTime<Utc>,
}

impl RecurringJob {
    pub fn digest(subscription: Subscription, now: DateTime<Utc>) -> Self {
        let frequency = subscription.frequency;
        RecurringJob {
            name: DIGEST_JOB_NAME.to_string(),
            cron_expression: frequency.cron_expression().to_string(),
            next_run_at: frequency.next_run_after(now),
            subscription,
        }
    }
}
