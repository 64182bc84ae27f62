pub mod contact_service;
pub mod job_scheduler;

pub use contact_service::{ContactService, Error as ContactError};
pub use job_scheduler::{Error as SchedulerError, JobScheduler};

#[cfg(test)]
pub use contact_service::MockContactService;

#[cfg(test)]
pub use job_scheduler::MockJobScheduler;
