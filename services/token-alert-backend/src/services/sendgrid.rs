//! SendGrid v3 client: transactional mail and the legacy contact database.
use async_trait::async_trait;
use common::err_context::ErrorContextExt;
use common::settings::ProviderSettings;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::ports::secondary::{ContactError as Error, ContactService};
use crate::domain::{ContactList, Mail, ProviderResponse, RecipientId, SubscriberEmail};

#[derive(Debug, Clone)]
pub struct SendGridClient {
    http_client: Client,
    // Base URL of the API, without the version prefix.
    server_url: String,
    api_key: Secret<String>,
    // Sender and reply-to of every email.
    sender: SubscriberEmail,
    sender_name: String,
    template_id: String,
}

impl SendGridClient {
    pub fn new(settings: ProviderSettings) -> Result<SendGridClient, Error> {
        let sender =
            SubscriberEmail::parse(settings.sender_email).map_err(|err| Error::Configuration {
                context: format!("Could not parse provider sender email: {err}"),
            })?;
        let http_client = Client::builder()
            .user_agent(settings.user_agent)
            .timeout(std::time::Duration::from_secs(settings.timeout))
            .build()
            .context("Could not build http client")?;
        Ok(SendGridClient {
            http_client,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            sender,
            sender_name: settings.sender_name,
            template_id: settings.template_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v3{path}", self.server_url)
    }

    /// Sends the request, and turns non success statuses into errors
    /// carrying the response body.
    async fn execute(&self, request: RequestBuilder, context: &str) -> Result<Response, Error> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .context(format!("http client request: {context}"))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Provider rejected request: {context}");
            Err(Error::Status {
                context: context.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl ContactService for SendGridClient {
    #[tracing::instrument(name = "Sending email with sendgrid", skip(self, mail))]
    async fn send_mail(&self, mail: Mail) -> Result<ProviderResponse, Error> {
        let Mail {
            to,
            subject,
            custom_args,
            template_data,
        } = mail;
        let sender = Address {
            email: self.sender.as_ref(),
            name: Some(&self.sender_name),
        };
        let request_body = SendMailRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: to.as_ref(),
                    name: None,
                }],
                subject: &subject,
                custom_args: &custom_args,
                dynamic_template_data: &template_data,
            }],
            from: sender.clone(),
            reply_to: sender,
            template_id: &self.template_id,
        };

        let response = self
            .execute(
                self.http_client
                    .post(self.url("/mail/send"))
                    .json(&request_body),
                "mail send",
            )
            .await?;

        let status_code = response.status().as_u16();
        let text = response
            .text()
            .await
            .context("Could not read mail send response")?;
        // mail/send usually answers 202 with an empty body.
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ProviderResponse { status_code, body })
    }

    #[tracing::instrument(name = "Creating recipient with sendgrid", skip(self))]
    async fn create_recipient(&self, email: &SubscriberEmail) -> Result<RecipientId, Error> {
        let email: &str = email.as_ref();
        let response: PersistedRecipients = self
            .execute(
                self.http_client
                    .post(self.url("/contactdb/recipients"))
                    .json(&[NewRecipient { email }]),
                "create recipient",
            )
            .await?
            .json()
            .await
            .context("Could not decode created recipients")?;
        response
            .persisted_recipients
            .into_iter()
            .next()
            .map(RecipientId)
            .ok_or_else(|| Error::Missing {
                context: format!("No recipient persisted for {email}"),
            })
    }

    #[tracing::instrument(name = "Searching recipient with sendgrid", skip(self))]
    async fn find_recipient(&self, email: &SubscriberEmail) -> Result<Option<RecipientId>, Error> {
        let email: &str = email.as_ref();
        let response: RecipientSearch = self
            .execute(
                self.http_client
                    .get(self.url("/contactdb/recipients/search"))
                    .query(&[("email", email)]),
                "search recipient",
            )
            .await?
            .json()
            .await
            .context("Could not decode recipient search")?;
        Ok(response.recipients.into_iter().next().map(|r| r.id))
    }

    #[tracing::instrument(name = "Fetching lists with sendgrid", skip(self))]
    async fn lists(&self) -> Result<Vec<ContactList>, Error> {
        let response: Lists = self
            .execute(self.http_client.get(self.url("/contactdb/lists")), "lists")
            .await?
            .json()
            .await
            .context("Could not decode lists")?;
        Ok(response.lists)
    }

    #[tracing::instrument(name = "Creating list with sendgrid", skip(self))]
    async fn create_list(&self, name: &str) -> Result<ContactList, Error> {
        let list = self
            .execute(
                self.http_client
                    .post(self.url("/contactdb/lists"))
                    .json(&NewList { name }),
                "create list",
            )
            .await?
            .json()
            .await
            .context("Could not decode created list")?;
        Ok(list)
    }

    #[tracing::instrument(name = "Adding recipient to list with sendgrid", skip(self))]
    async fn add_recipient_to_list(
        &self,
        list_id: i64,
        recipient: &RecipientId,
    ) -> Result<(), Error> {
        self.execute(
            self.http_client.post(self.url(&format!(
                "/contactdb/lists/{list_id}/recipients/{recipient}"
            ))),
            "add recipient to list",
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetching recipient lists with sendgrid", skip(self))]
    async fn recipient_lists(&self, recipient: &RecipientId) -> Result<Vec<ContactList>, Error> {
        let response: Lists = self
            .execute(
                self.http_client
                    .get(self.url(&format!("/contactdb/recipients/{recipient}/lists"))),
                "recipient lists",
            )
            .await?
            .json()
            .await
            .context("Could not decode recipient lists")?;
        Ok(response.lists)
    }

    #[tracing::instrument(name = "Removing recipient from list with sendgrid", skip(self))]
    async fn remove_recipient_from_list(
        &self,
        list_id: i64,
        recipient: &RecipientId,
    ) -> Result<(), Error> {
        self.execute(
            self.http_client.delete(self.url(&format!(
                "/contactdb/lists/{list_id}/recipients/{recipient}"
            ))),
            "remove recipient from list",
        )
        .await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    reply_to: Address<'a>,
    template_id: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    subject: &'a str,
    custom_args: &'a BTreeMap<String, String>,
    dynamic_template_data: &'a BTreeMap<String, String>,
}

#[derive(Clone, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct NewRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct NewList<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct PersistedRecipients {
    #[serde(default)]
    persisted_recipients: Vec<String>,
}

#[derive(Deserialize)]
struct RecipientSearch {
    #[serde(default)]
    recipients: Vec<FoundRecipient>,
}

#[derive(Deserialize)]
struct FoundRecipient {
    id: RecipientId,
}

#[derive(Deserialize)]
struct Lists {
    #[serde(default)]
    lists: Vec<ContactList>,
}
