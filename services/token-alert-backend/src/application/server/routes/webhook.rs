use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;

use crate::application::server::AppState;
use crate::coordinator::DispatchOutcome;
use common::err_context::ErrorContextExt;

/// POST handler for the provider's event webhook.
///
/// Once the delivery is authorized and parsed, it is acknowledged with 200
/// whatever happens in the triggered flow.
#[tracing::instrument(
    name = "Receiving webhook events",
    skip(state, params, body),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    Query(params): Query<WebhookParams>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let outcome = state
        .coordinator
        .dispatch_webhook(params.access_token.as_deref(), &body)
        .await
        .context("Could not dispatch webhook")?;

    let outcome = match outcome {
        DispatchOutcome::Empty => "empty",
        DispatchOutcome::Ignored => "ignored",
        DispatchOutcome::Enrollment(_) => "enrollment",
        DispatchOutcome::Unsubscription(_) => "unsubscription",
    };
    tracing::debug!("Webhook dispatched: {outcome}");

    Ok(Json(serde_json::json!({
        "status": "success"
    })))
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WebhookParams {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}
