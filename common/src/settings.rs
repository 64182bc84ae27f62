use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, Serializer};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Secrets are never printed, not even by `token-alert config`.
fn redact<S>(_secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Public URL of the site, used to build confirmation links.
    pub base_url: String,
}

/// Settings for the email delivery provider (contact lists and mail send).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub server_url: String,
    #[serde(serialize_with = "redact")]
    pub api_key: Secret<String>,
    pub user_agent: String,
    /// Request timeout, in seconds.
    pub timeout: u64,
    pub sender_email: String,
    pub sender_name: String,
    pub template_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Shared secret expected in the `accessToken` query parameter.
    #[serde(serialize_with = "redact")]
    pub access_token: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationSettings {
    #[serde(serialize_with = "redact")]
    pub signing_key: Secret<String>,
    /// Validity of a confirmation link, in seconds.
    pub window: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    pub kind: SchedulerKind,
    /// Only needed by the postgres scheduler.
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    #[serde(serialize_with = "redact")]
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
    /// Pool acquisition timeout, in milliseconds.
    pub connection_timeout: u64,
}

impl DatabaseSettings {
    /// Connection string without the password, suitable for logs.
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database_name
        )
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database_name)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub mode: String,
    pub application: ApplicationSettings,
    pub provider: ProviderSettings,
    pub webhook: WebhookSettings,
    pub confirmation: ConfirmationSettings,
    pub scheduler: SchedulerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_settings_should_not_leak_secrets() {
        let webhook = WebhookSettings {
            access_token: Secret::new("s3cr3t".to_string()),
        };
        let json = serde_json::to_string(&webhook).expect("serialize settings");
        assert!(!json.contains("s3cr3t"));
        assert_eq!(json, r#"{"access_token":"[REDACTED]"}"#);
    }

    #[test]
    fn connection_string_should_not_contain_the_password() {
        let settings = DatabaseSettings {
            username: "scheduler".to_string(),
            password: Secret::new("hunter2".to_string()),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "jobs".to_string(),
            require_ssl: false,
            connection_timeout: 500,
        };
        assert_eq!(
            settings.connection_string(),
            "postgres://scheduler@localhost:5432/jobs"
        );
    }
}
