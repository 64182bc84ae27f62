use cucumber::{given, then, when};
use serde_json::{json, Value};
use speculoos::prelude::*;
use token_alert::domain::ports::secondary::JobScheduler as _;

use super::provider::{LIST_ID, RECIPIENT_ID};
use crate::state::TestWorld;

/// Posts the click event the provider would send when the confirmation
/// link is followed: the custom args of the email, flattened, with the link.
async fn click_confirmation_link(world: &mut TestWorld, access_token: &str) {
    let mut event = world.confirmation.clone().expect("confirmation email");
    event.insert("event".to_string(), json!("click"));
    event.insert(
        "url".to_string(),
        json!(world.confirmation_link.clone().expect("confirmation link")),
    );
    let resp = world
        .app
        .post_webhook(access_token, &json!([Value::Object(event)]))
        .await;
    world.resp = Some(resp);
}

#[when("the subscriber follows the confirmation link")]
async fn follow_confirmation_link(world: &mut TestWorld) {
    let access_token = world.app.access_token.clone();
    click_confirmation_link(world, &access_token).await;
}

#[given("the subscriber followed the confirmation link")]
async fn followed_confirmation_link(world: &mut TestWorld) {
    follow_confirmation_link(world).await;
}

#[when("an impostor replays the click without the access token")]
async fn replay_without_token(world: &mut TestWorld) {
    click_confirmation_link(world, "not-the-token").await;
}

#[when(regex = r#"the subscriber "(.+)" unsubscribes from the (\w+) digest of "(.+)""#)]
async fn unsubscribe(world: &mut TestWorld, email: String, frequency: String, delegator: String) {
    let events = json!([{
        "event": "click",
        "email": email,
        "frequency": frequency,
        "delegatorAddress": delegator,
        "url": "https://alerts.example.com/unsubscribe"
    }]);
    let access_token = world.app.access_token.clone();
    let resp = world.app.post_webhook(&access_token, &events).await;
    world.resp = Some(resp);
}

#[when("the provider posts a malformed batch")]
async fn malformed_batch(world: &mut TestWorld) {
    let access_token = world.app.access_token.clone();
    let resp = world
        .app
        .post_webhook(&access_token, &json!({ "event": "click" }))
        .await;
    world.resp = Some(resp);
}

#[then(regex = r#"^there (?:is|are) (\d+) scheduled jobs?$"#)]
async fn count_jobs(world: &mut TestWorld, count: usize) {
    let jobs = world.app.scheduler.list_jobs().await.expect("list jobs");
    assert_that(&jobs).has_length(count);
}

#[then(regex = r#"the (\w+) digest of "(.+)" is scheduled for "(.+)""#)]
async fn verify_job(world: &mut TestWorld, frequency: String, delegator: String, email: String) {
    let jobs = world.app.scheduler.list_jobs().await.expect("list jobs");
    let job = jobs
        .iter()
        .find(|job| job.subscription.email.as_ref() == email.as_str())
        .expect("a job for the subscriber");
    assert_that(&job.name.as_str()).is_equal_to("email");
    assert_that(&job.subscription.frequency.as_str()).is_equal_to(frequency.as_str());
    assert_that(&job.subscription.delegator_address.as_ref()).is_equal_to(delegator.as_str());
}

#[then("the subscriber is added to the list")]
async fn verify_added_to_list(world: &mut TestWorld) {
    let requests = world
        .app
        .provider_requests(&format!(
            "/v3/contactdb/lists/{LIST_ID}/recipients/{RECIPIENT_ID}"
        ))
        .await;
    assert!(requests
        .iter()
        .any(|request| request.method == wiremock::http::Method::Post));
}

#[then("the subscriber is removed from the list")]
async fn verify_removed_from_list(world: &mut TestWorld) {
    let requests = world
        .app
        .provider_requests(&format!(
            "/v3/contactdb/lists/{LIST_ID}/recipients/{RECIPIENT_ID}"
        ))
        .await;
    assert!(requests
        .iter()
        .any(|request| request.method == wiremock::http::Method::Delete));
}

#[then("the contact lists are left untouched")]
async fn verify_no_contact_changes(world: &mut TestWorld) {
    let requests = world.app.provider_requests("/v3/contactdb").await;
    assert_that(&requests).is_empty();
}
