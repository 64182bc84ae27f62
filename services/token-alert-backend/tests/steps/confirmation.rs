use cucumber::{given, then, when};
use serde_json::{json, Value};
use speculoos::prelude::*;

use crate::state::TestWorld;

#[when(regex = r#"a visitor asks for a (\w+) digest of "(.+)" for "(.*)""#)]
async fn request_confirmation(
    world: &mut TestWorld,
    frequency: String,
    delegator: String,
    email: String,
) {
    let body = json!({
        "email": email,
        "frequency": frequency,
        "delegatorAddress": delegator,
    });
    let resp = world.app.post_confirm(&body).await;
    world.resp = Some(resp);
}

#[then(regex = r#"the provider sends a confirmation email to "(.+)""#)]
async fn verify_confirmation_email(world: &mut TestWorld, email: String) {
    let requests = world.app.provider_requests("/v3/mail/send").await;
    assert_that(&requests).has_length(1);
    let body: Value = serde_json::from_slice(&requests[0].body).expect("mail send body");
    let personalization = &body["personalizations"][0];
    assert_that(&personalization["to"][0]["email"].as_str()).is_equal_to(Some(email.as_str()));

    let custom_args = personalization["custom_args"]
        .as_object()
        .cloned()
        .expect("custom args");
    assert_that(&custom_args.get("type").and_then(Value::as_str)).is_equal_to(Some("opt-in"));
    world.confirmation = Some(custom_args);
    world.confirmation_link = personalization["dynamic_template_data"]["confirmationLink"]
        .as_str()
        .map(String::from);
}

#[given(regex = r#"a visitor asked for a (\w+) digest of "(.+)" for "(.*)""#)]
async fn requested_confirmation(
    world: &mut TestWorld,
    frequency: String,
    delegator: String,
    email: String,
) {
    request_confirmation(world, frequency, delegator, email).await;
}

#[given(regex = r#"the provider sent a confirmation email to "(.+)""#)]
async fn sent_confirmation_email(world: &mut TestWorld, email: String) {
    verify_confirmation_email(world, email).await;
}

#[then(regex = r#"the confirmation link asks for a (\w+) digest"#)]
fn verify_confirmation_link(world: &mut TestWorld, frequency: String) {
    let link = world.confirmation_link.as_deref().expect("confirmation link");
    assert_that(&link).starts_with("http://127.0.0.1/?verify=true");
    assert_that(&link).ends_with(format!("frequency={frequency}").as_str());
}

#[then("no email is sent")]
async fn verify_no_email(world: &mut TestWorld) {
    let requests = world.app.provider_requests("/v3/mail/send").await;
    assert_that(&requests).is_empty();
}
