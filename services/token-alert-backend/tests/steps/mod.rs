mod confirmation;
mod health;
mod provider;
mod response;
mod webhook;
