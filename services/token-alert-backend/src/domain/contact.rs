use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::SubscriberEmail;

/// Identifier the provider assigns to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub String);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contact list, as stored by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactList {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub recipient_count: u64,
}

/// A transactional email rendered by a provider template.
///
/// The sender, reply-to address and template are filled in by the
/// `ContactService` implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: SubscriberEmail,
    pub subject: String,
    /// Metadata echoed back by the provider in webhook events.
    pub custom_args: BTreeMap<String, String>,
    /// Variables substituted in the template.
    pub template_data: BTreeMap<String, String>,
}

/// Status and body returned by the provider, forwarded as is to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub status_code: u16,
    pub body: serde_json::Value,
}
