//! Stateless opt-in confirmation.
//!
//! The confirmation email carries `type`, `timeSent` and `signature` as
//! custom metadata, which the provider echoes back in the click event. The
//! signature is an HMAC-SHA256 over the opt-in type, the subscription and the
//! send time, so a click event can be validated without any local state.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;

use super::Subscription;

type HmacSha256 = Hmac<Sha256>;

/// Type marker of confirmation emails.
pub const OPT_IN: &str = "opt-in";
/// A confirmation link is valid for one day.
pub const DEFAULT_WINDOW_SECS: u64 = 86_400;

pub const TYPE_FIELD: &str = "type";
pub const TIME_SENT_FIELD: &str = "timeSent";
pub const SIGNATURE_FIELD: &str = "signature";

#[derive(Debug, Clone)]
pub struct ConfirmationSigner {
    key: Secret<String>,
    window_ms: i64,
}

impl ConfirmationSigner {
    pub fn new(key: Secret<String>, window_secs: u64) -> Self {
        let window_ms = i64::try_from(window_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        ConfirmationSigner { key, window_ms }
    }

    /// Issues the token attached to a confirmation email sent at `now`.
    pub fn issue(&self, subscription: &Subscription, now: DateTime<Utc>) -> ConfirmationToken {
        let time_sent = now.timestamp_millis();
        let signature = hex::encode(
            self.mac(OPT_IN, subscription, time_sent)
                .finalize()
                .into_bytes(),
        );
        ConfirmationToken {
            kind: OPT_IN.to_string(),
            time_sent,
            signature,
        }
    }

    /// Checks claims echoed back by the provider, and returns the confirmed
    /// subscription.
    ///
    /// The link must be clicked strictly less than the window after it was
    /// sent.
    pub fn verify(
        &self,
        claims: &ConfirmationClaims,
        now: DateTime<Utc>,
    ) -> Result<Subscription, Rejection> {
        let kind = required(&claims.kind, TYPE_FIELD)?;
        if kind != OPT_IN {
            return Err(Rejection::NotOptIn(kind.to_string()));
        }

        let time_sent = required(&claims.time_sent, TIME_SENT_FIELD)?;
        let time_sent: i64 = time_sent
            .trim()
            .parse()
            .map_err(|_| Rejection::MalformedTimestamp(time_sent.to_string()))?;

        let elapsed_ms = now.timestamp_millis().saturating_sub(time_sent);
        if elapsed_ms >= self.window_ms {
            return Err(Rejection::Expired {
                elapsed_secs: elapsed_ms / 1000,
            });
        }

        let subscription = Subscription::parse(
            required(&claims.email, "email")?,
            required(&claims.frequency, "frequency")?,
            required(&claims.delegator_address, "delegatorAddress")?,
        )
        .map_err(Rejection::InvalidSubscription)?;

        let signature = required(&claims.signature, SIGNATURE_FIELD)?;
        let signature = hex::decode(signature).map_err(|_| Rejection::BadSignature)?;
        self.mac(kind, &subscription, time_sent)
            .verify_slice(&signature)
            .map_err(|_| Rejection::BadSignature)?;

        Ok(subscription)
    }

    fn mac(&self, kind: &str, subscription: &Subscription, time_sent: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(
            format!(
                "{kind}|{}|{}|{}|{time_sent}",
                subscription.email, subscription.frequency, subscription.delegator_address
            )
            .as_bytes(),
        );
        mac
    }
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, Rejection> {
    field.as_deref().ok_or(Rejection::Missing(name))
}

/// Metadata attached to a confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationToken {
    pub kind: String,
    /// Milliseconds since the Unix epoch.
    pub time_sent: i64,
    /// Hex encoded HMAC-SHA256.
    pub signature: String,
}

impl ConfirmationToken {
    pub fn custom_args(&self) -> [(&'static str, String); 3] {
        [
            (TYPE_FIELD, self.kind.clone()),
            (TIME_SENT_FIELD, self.time_sent.to_string()),
            (SIGNATURE_FIELD, self.signature.clone()),
        ]
    }
}

/// Confirmation fields found in a click event. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationClaims {
    pub kind: Option<String>,
    pub time_sent: Option<String>,
    pub signature: Option<String>,
    pub email: Option<String>,
    pub frequency: Option<String>,
    pub delegator_address: Option<String>,
}

/// Why a confirmation click does not enroll anybody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Missing(&'static str),
    NotOptIn(String),
    MalformedTimestamp(String),
    Expired { elapsed_secs: i64 },
    InvalidSubscription(String),
    BadSignature,
}

impl fmt::Display for Rejection {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Missing(field) => write!(fmt, "Missing field: {field}"),
            Rejection::NotOptIn(kind) => write!(fmt, "Not an opt-in confirmation: {kind}"),
            Rejection::MalformedTimestamp(raw) => write!(fmt, "Malformed timestamp: {raw}"),
            Rejection::Expired { elapsed_secs } => {
                write!(fmt, "Confirmation expired: sent {elapsed_secs}s ago")
            }
            Rejection::InvalidSubscription(reason) => {
                write!(fmt, "Invalid subscription: {reason}")
            }
            Rejection::BadSignature => write!(fmt, "Signature mismatch"),
        }
    }
}
