pub mod confirmation;
pub mod contact;
pub mod delegator_address;
pub mod frequency;
pub mod ports;
pub mod recurring_job;
pub mod subscriber_email;
pub mod subscription;
pub mod webhook_event;

pub use confirmation::{ConfirmationClaims, ConfirmationSigner, ConfirmationToken, Rejection};
pub use contact::{ContactList, Mail, ProviderResponse, RecipientId};
pub use delegator_address::DelegatorAddress;
pub use frequency::Frequency;
pub use recurring_job::{RecurringJob, DIGEST_JOB_NAME};
pub use subscriber_email::SubscriberEmail;
pub use subscription::{ListName, Subscription};
pub use webhook_event::{EventMetadata, WebhookEvent, WebhookRoute};
