//! Events posted by the provider's event webhook.

use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::confirmation::{ConfirmationClaims, SIGNATURE_FIELD, TIME_SENT_FIELD, TYPE_FIELD};
use super::Subscription;

/// An event record. Only the clicked `url` is interpreted; the custom args of
/// the originating email are flattened in the remaining fields.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// What a webhook event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookRoute {
    Unsubscribe,
    Confirm,
    Ignored,
}

impl WebhookEvent {
    pub fn route(&self) -> WebhookRoute {
        let Some(url) = self.parsed_url() else {
            return WebhookRoute::Ignored;
        };
        match url.path() {
            "/unsubscribe" => WebhookRoute::Unsubscribe,
            "/" if url
                .query_pairs()
                .any(|(key, value)| key == "verify" && !value.is_empty()) =>
            {
                WebhookRoute::Confirm
            }
            _ => WebhookRoute::Ignored,
        }
    }

    /// Query parameters of the url, overridden by the event's own fields.
    pub fn metadata(&self) -> EventMetadata {
        let mut values = HashMap::new();
        if let Some(url) = self.parsed_url() {
            for (key, value) in url.query_pairs() {
                values.insert(key.into_owned(), value.into_owned());
            }
        }
        for (key, value) in &self.fields {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            values.insert(key.clone(), value);
        }
        EventMetadata(values)
    }

    // Links may be relative, in which case only the path and query matter.
    fn parsed_url(&self) -> Option<Url> {
        let raw = self.url.as_deref()?;
        Url::parse(raw)
            .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(raw)))
            .ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMetadata(HashMap<String, String>);

impl EventMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn confirmation_claims(&self) -> ConfirmationClaims {
        let field = |key: &str| self.0.get(key).cloned();
        ConfirmationClaims {
            kind: field(TYPE_FIELD),
            time_sent: field(TIME_SENT_FIELD),
            signature: field(SIGNATURE_FIELD),
            email: field("email"),
            frequency: field("frequency"),
            delegator_address: field("delegatorAddress"),
        }
    }

    pub fn subscription(&self) -> Result<Subscription, String> {
        Subscription::parse(
            self.get("email").ok_or("Missing email")?,
            self.get("frequency").ok_or("Missing frequency")?,
            self.get("delegatorAddress")
                .ok_or("Missing delegatorAddress")?,
        )
    }
}
