use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::ports::secondary::{JobScheduler, SchedulerError};
use crate::domain::{RecurringJob, Subscription};

type JobKey = (String, Subscription);

/// Process local scheduler, for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    jobs: Mutex<HashMap<JobKey, RecurringJob>>,
}

impl InMemoryScheduler {
    fn key(name: &str, subscription: &Subscription) -> JobKey {
        (name.to_string(), subscription.clone())
    }
}

#[async_trait]
impl JobScheduler for InMemoryScheduler {
    async fn schedule(&self, job: &RecurringJob) -> Result<bool, SchedulerError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = jobs.insert(Self::key(&job.name, &job.subscription), job.clone());
        Ok(previous.is_none())
    }

    async fn cancel(&self, name: &str, subscription: &Subscription) -> Result<u64, SchedulerError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = jobs.remove(&Self::key(name, subscription));
        Ok(u64::from(removed.is_some()))
    }

    async fn list_jobs(&self) -> Result<Vec<RecurringJob>, SchedulerError> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut jobs: Vec<RecurringJob> = jobs.values().cloned().collect();
        jobs.sort_by_key(|job| (job.next_run_at, job.subscription.email.to_string()));
        Ok(jobs)
    }
}
