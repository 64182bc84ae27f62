use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::Error;

use crate::application::server::AppState;
use crate::coordinator::ConfirmationRequest;
use common::err_context::ErrorContextExt;

/// POST handler sending the confirmation email of a new subscription.
///
/// The provider's status and response are forwarded to the caller.
#[tracing::instrument(
    name = "Requesting subscription confirmation",
    skip(state, request),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    request: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(request) = request
        .map_err(|rejection| rejection.body_text())
        .context("Invalid confirmation request")?;

    let response = state
        .coordinator
        .send_confirmation(request)
        .await
        .context("Could not send confirmation email")?;

    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
    Ok((status, Json(response)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{post, Router},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::*;
    use crate::coordinator::testing::coordinator;
    use crate::domain::ports::secondary::{ContactError, MockContactService, MockJobScheduler};
    use crate::domain::ProviderResponse;

    /// This is a helper function to build an App with axum.
    fn confirm_route(contacts: MockContactService) -> Router {
        let state = AppState {
            coordinator: Arc::new(coordinator(contacts, MockJobScheduler::new())),
        };
        Router::new()
            .route("/confirm", post(confirm))
            .with_state(state)
    }

    fn send_confirm_request(body: String) -> Request<Body> {
        Request::builder()
            .uri("/confirm")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn confirm_should_forward_the_provider_status() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().times(1).returning(|_| {
            Ok(ProviderResponse {
                status_code: 202,
                body: Value::Null,
            })
        });

        let response = confirm_route(contacts)
            .oneshot(send_confirm_request(
                json!({
                    "email": "ursula@domain.com",
                    "frequency": "weekly",
                    "delegatorAddress": "0xabc",
                })
                .to_string(),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(json_body(response).await["statusCode"], 202);
    }

    #[tokio::test]
    async fn confirm_with_provider_failure_should_return_bad_request_with_the_raw_error() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().times(1).returning(|_| {
            Err(ContactError::Status {
                context: "mail send".to_string(),
                status: 401,
                body: r#"{"errors":[{"message":"authorization required"}]}"#.to_string(),
            })
        });

        let response = confirm_route(contacts)
            .oneshot(send_confirm_request(
                json!({
                    "email": "ursula@domain.com",
                    "frequency": "monthly",
                    "delegatorAddress": "0xabc",
                })
                .to_string(),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["errors"][0]["message"],
            "authorization required"
        );
    }

    #[tokio::test]
    async fn confirm_with_invalid_frequency_should_return_bad_request() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().never();

        let response = confirm_route(contacts)
            .oneshot(send_confirm_request(
                json!({
                    "email": "ursula@domain.com",
                    "frequency": "daily",
                    "delegatorAddress": "0xabc",
                })
                .to_string(),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "request/invalid");
    }

    #[tokio::test]
    async fn confirm_with_missing_fields_should_return_bad_request() {
        let mut contacts = MockContactService::new();
        contacts.expect_send_mail().never();

        let response = confirm_route(contacts)
            .oneshot(send_confirm_request(
                json!({ "email": "ursula@domain.com" }).to_string(),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
