pub mod confirm;
mod error;
pub mod health;
pub mod webhook;

use super::AppState;
use axum::routing::{get, post, Router};

pub use self::error::Error;
use self::{confirm::confirm, health::health, webhook::webhook};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/confirm", post(confirm))
        .route("/webhook", post(webhook))
        .with_state(state)
}
