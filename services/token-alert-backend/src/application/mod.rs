mod error;
mod listener;
pub mod opts;
pub mod server;

pub use self::error::Error;

use common::err_context::ErrorContextExt;
use common::settings::{
    ApplicationSettings, ConfirmationSettings, ProviderSettings, SchedulerKind, SchedulerSettings,
    Settings,
};
use secrecy::Secret;
use std::net::TcpListener;
use std::sync::Arc;

use self::listener::listen_with_host_port;
use self::server::AppState;
use crate::coordinator::{Coordinator, DynContacts, DynScheduler};
use crate::domain::ConfirmationSigner;
use crate::services::memory::InMemoryScheduler;
use crate::services::postgres::PostgresScheduler;
use crate::services::sendgrid::SendGridClient;

pub struct Application {
    port: u16,
    server: server::AppServer,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    pub contacts: Option<DynContacts>,
    pub scheduler: Option<DynScheduler>,
    pub listener: Option<TcpListener>,
    pub url: Option<String>,
    pub access_token: Option<Secret<String>>,
    pub signer: Option<ConfirmationSigner>,
}

impl ApplicationBuilder {
    pub async fn new(settings: Settings) -> Result<Self, Error> {
        let Settings {
            application,
            provider,
            webhook,
            confirmation,
            scheduler,
            mode: _,
        } = settings;
        let builder = Self::default()
            .contacts(provider)?
            .scheduler(scheduler)
            .await?
            .listener(application.clone())?
            .url(application.base_url)
            .access_token(webhook.access_token)
            .confirmation(confirmation);

        Ok(builder)
    }

    pub fn contacts(mut self, settings: ProviderSettings) -> Result<Self, Error> {
        let contacts = Arc::new(
            SendGridClient::new(settings).context("Establishing an email provider client")?,
        );
        self.contacts = Some(contacts);
        Ok(self)
    }

    pub async fn scheduler(mut self, settings: SchedulerSettings) -> Result<Self, Error> {
        let scheduler: DynScheduler = match settings.kind {
            SchedulerKind::Memory => {
                tracing::warn!("Using an in memory job scheduler, jobs will not survive restarts");
                Arc::new(InMemoryScheduler::default())
            }
            SchedulerKind::Postgres => {
                let database = settings.database.ok_or_else(|| Error::Configuration {
                    context: "The postgres scheduler needs a scheduler.database section"
                        .to_string(),
                })?;
                Arc::new(
                    PostgresScheduler::new(&database)
                        .await
                        .context("Establishing a scheduler database connection")?,
                )
            }
        };
        self.scheduler = Some(scheduler);
        Ok(self)
    }

    pub fn listener(mut self, settings: ApplicationSettings) -> Result<Self, Error> {
        let listener = listen_with_host_port(settings.host.as_str(), settings.port).context(
            format!(
                "Could not create listener for {}:{}",
                settings.host, settings.port
            ),
        )?;
        self.listener = Some(listener);
        Ok(self)
    }

    pub fn url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn access_token(mut self, access_token: Secret<String>) -> Self {
        self.access_token = Some(access_token);
        self
    }

    pub fn confirmation(mut self, settings: ConfirmationSettings) -> Self {
        self.signer = Some(ConfirmationSigner::new(
            settings.signing_key,
            settings.window,
        ));
        self
    }

    pub fn build(self) -> Result<Application, Error> {
        let ApplicationBuilder {
            contacts,
            scheduler,
            listener,
            url,
            access_token,
            signer,
        } = self;
        let listener = listener.ok_or_else(|| missing("listener"))?;
        let port = listener
            .local_addr()
            .map_err(|err| Error::Configuration {
                context: format!("Could not read listener address: {err}"),
            })?
            .port();
        let coordinator = Coordinator::new(
            contacts.ok_or_else(|| missing("contact service"))?,
            scheduler.ok_or_else(|| missing("job scheduler"))?,
            signer.ok_or_else(|| missing("confirmation signer"))?,
            url.ok_or_else(|| missing("base url"))?,
            access_token.ok_or_else(|| missing("webhook access token"))?,
        );
        let state = AppState {
            coordinator: Arc::new(coordinator),
        };
        let server =
            server::new(listener, state).context("Could not start the application server")?;
        Ok(Application { port, server })
    }
}

fn missing(component: &str) -> Error {
    Error::Missing {
        context: component.to_string(),
    }
}

impl Application {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), Error> {
        tracing::info!("Listening on port {}", self.port);
        self.server
            .await
            .context("server execution error".to_string())?;
        Ok(())
    }
}
