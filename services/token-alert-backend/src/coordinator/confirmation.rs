use chrono::{DateTime, Utc};
use common::err_context::ErrorContextExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{Coordinator, Error};
use crate::domain::{ConfirmationToken, Mail, ProviderResponse, Subscription};

pub const CONFIRMATION_SUBJECT: &str = "Please Confirm Your Email Address";

/// Subscription request, as posted by the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub email: String,
    pub frequency: String,
    pub delegator_address: String,
    /// Any other field, echoed back by the provider in webhook events.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Coordinator {
    /// Sends the email asking the subscriber to confirm the subscription.
    #[tracing::instrument(
        name = "Sending confirmation email",
        skip(self, request),
        fields(frequency = %request.frequency, delegator = %request.delegator_address)
    )]
    pub async fn send_confirmation(
        &self,
        request: ConfirmationRequest,
    ) -> Result<ProviderResponse, Error> {
        let subscription = Subscription::parse(
            &request.email,
            &request.frequency,
            &request.delegator_address,
        )
        .context("Invalid confirmation request")?;

        let now = Utc::now();
        let token = self.signer.issue(&subscription, now);
        let mail = self.confirmation_mail(&request.metadata, &subscription, &token, now);

        let response = self
            .contacts
            .send_mail(mail)
            .await
            .context("Could not send confirmation email")?;
        tracing::info!(status = response.status_code, "Confirmation email sent");
        Ok(response)
    }

    fn confirmation_mail(
        &self,
        metadata: &Map<String, Value>,
        subscription: &Subscription,
        token: &ConfirmationToken,
        now: DateTime<Utc>,
    ) -> Mail {
        let mut custom_args = BTreeMap::new();
        for (key, value) in metadata {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            custom_args.insert(key.clone(), value);
        }
        // Written last, so the request cannot override them.
        custom_args.insert("email".to_string(), subscription.email.to_string());
        custom_args.insert("frequency".to_string(), subscription.frequency.to_string());
        custom_args.insert(
            "delegatorAddress".to_string(),
            subscription.delegator_address.to_string(),
        );
        for (key, value) in token.custom_args() {
            custom_args.insert(key.to_string(), value);
        }

        let template_data = BTreeMap::from([
            ("todaysDate".to_string(), now.format("%b %-d, %Y").to_string()),
            (
                "confirmationLink".to_string(),
                format!(
                    "{}/?verify=true&frequency={}",
                    self.base_url, subscription.frequency
                ),
            ),
            ("frequency".to_string(), subscription.frequency.to_string()),
            (
                "delegatorAddress".to_string(),
                subscription.delegator_address.to_string(),
            ),
        ]);

        Mail {
            to: subscription.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            custom_args,
            template_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use serde_json::json;
    use speculoos::prelude::*;

    use super::*;
    use crate::coordinator::testing::{coordinator, signer, BASE_URL};
    use crate::domain::ports::secondary::{ContactError, MockContactService, MockJobScheduler};
    use crate::domain::ConfirmationClaims;

    fn request(value: Value) -> ConfirmationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn accepted() -> ProviderResponse {
        ProviderResponse {
            status_code: 202,
            body: Value::Null,
        }
    }

    #[tokio::test]
    async fn confirmation_link_carries_the_requested_frequency() {
        for frequency in ["weekly", "monthly"] {
            let email: String = SafeEmail().fake();
            let mut contacts = MockContactService::new();
            contacts
                .expect_send_mail()
                .withf(move |mail| {
                    mail.template_data.get("confirmationLink")
                        == Some(&format!("{BASE_URL}/?verify=true&frequency={frequency}"))
                        && mail.template_data.get("frequency").map(String::as_str)
                            == Some(frequency)
                })
                .times(1)
                .returning(|_| Ok(accepted()));

            let coordinator = coordinator(contacts, MockJobScheduler::new());
            let response = coordinator
                .send_confirmation(request(json!({
                    "email": email,
                    "frequency": frequency,
                    "delegatorAddress": "0xabc",
                })))
                .await;
            assert_that(&response).is_ok_containing(accepted());
        }
    }

    #[tokio::test]
    async fn confirmation_mail_carries_a_verifiable_token() {
        let mut contacts = MockContactService::new();
        contacts
            .expect_send_mail()
            .withf(|mail| {
                let arg = |key: &str| mail.custom_args.get(key).cloned();
                let claims = ConfirmationClaims {
                    kind: arg("type"),
                    time_sent: arg("timeSent"),
                    signature: arg("signature"),
                    email: arg("email"),
                    frequency: arg("frequency"),
                    delegator_address: arg("delegatorAddress"),
                };
                mail.subject == CONFIRMATION_SUBJECT
                    && mail.to.as_ref() == "ursula@domain.com"
                    && signer().verify(&claims, Utc::now()).is_ok()
            })
            .times(1)
            .returning(|_| Ok(accepted()));

        let coordinator = coordinator(contacts, MockJobScheduler::new());
        let response = coordinator
            .send_confirmation(request(json!({
                "email": "ursula@domain.com",
                "frequency": "weekly",
                "delegatorAddress": "0xabc",
            })))
            .await;
        assert_that(&response).is_ok();
    }

    #[tokio::test]
    async fn passthrough_fields_are_attached_but_cannot_forge_the_token() {
        let mut contacts = MockContactService::new();
        contacts
            .expect_send_mail()
            .withf(|mail| {
                mail.custom_args.get("campaign").map(String::as_str) == Some("spring")
                    && mail.custom_args.get("count").map(String::as_str) == Some("3")
                    && mail.custom_args.get("type").map(String::as_str) == Some("opt-in")
                    && mail.custom_args.get("signature").map(String::as_str) != Some("forged")
            })
            .times(1)
            .returning(|_| Ok(accepted()));

        let coordinator = coordinator(contacts, MockJobScheduler::new());
        let response = coordinator
            .send_confirmation(request(json!({
                "email": "ursula@domain.com",
                "frequency": "monthly",
                "delegatorAddress": "0xabc",
                "campaign": "spring",
                "count": 3,
                "type": "digest",
                "signature": "forged",
            })))
            .await;
        assert_that(&response).is_ok();
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_without_sending() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().never();
        let coordinator = coordinator(contacts, MockJobScheduler::new());

        let response = coordinator
            .send_confirmation(request(json!({
                "email": "ursula@domain.com",
                "frequency": "daily",
                "delegatorAddress": "0xabc",
            })))
            .await;
        assert!(matches!(response, Err(Error::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().times(1).returning(|_| {
            Err(ContactError::Status {
                context: "mail/send".to_string(),
                status: 400,
                body: r#"{"errors":[{"message":"bad"}]}"#.to_string(),
            })
        });
        let coordinator = coordinator(contacts, MockJobScheduler::new());

        let response = coordinator
            .send_confirmation(request(json!({
                "email": "ursula@domain.com",
                "frequency": "weekly",
                "delegatorAddress": "0xabc",
            })))
            .await;
        match response {
            Err(Error::Contact { source, .. }) => {
                assert_eq!(source.body(), r#"{"errors":[{"message":"bad"}]}"#)
            }
            other => panic!("unexpected response {other:?}"),
        }
    }
}
