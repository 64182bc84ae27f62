use cucumber::given;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

use crate::state::TestWorld;

pub const RECIPIENT_ID: &str = "YWxpY2VAZXhhbXBsZS5jb20=";
pub const LIST_ID: i64 = 7;

#[given("the provider accepts emails")]
async fn provider_accepts_emails(world: &mut TestWorld) {
    Mock::given(path("/v3/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&world.app.provider)
        .await;
}

#[given("the provider rejects emails")]
async fn provider_rejects_emails(world: &mut TestWorld) {
    Mock::given(path("/v3/mail/send"))
        .and(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "errors": [{ "message": "bad api key" }] })),
        )
        .mount(&world.app.provider)
        .await;
}

/// The contact database starts empty, and the list for the subscription is
/// created on the first confirmation.
#[given(regex = r#"the provider manages the list "(.+)""#)]
async fn provider_manages_list(world: &mut TestWorld, name: String) {
    let provider = &world.app.provider;
    Mock::given(path("/v3/contactdb/recipients"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "new_count": 1,
            "updated_count": 0,
            "error_count": 0,
            "persisted_recipients": [RECIPIENT_ID]
        })))
        .mount(provider)
        .await;
    Mock::given(path("/v3/contactdb/recipients/search"))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipients": [{ "id": RECIPIENT_ID }]
        })))
        .mount(provider)
        .await;
    Mock::given(path("/v3/contactdb/lists"))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "lists": [] })))
        .mount(provider)
        .await;
    Mock::given(path("/v3/contactdb/lists"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": LIST_ID,
            "name": name,
            "recipient_count": 0
        })))
        .mount(provider)
        .await;
    Mock::given(path_regex(r"^/v3/contactdb/lists/\d+/recipients/.+$"))
        .respond_with(ResponseTemplate::new(201))
        .mount(provider)
        .await;
    Mock::given(path(format!("/v3/contactdb/recipients/{RECIPIENT_ID}/lists")))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{ "id": LIST_ID, "name": name, "recipient_count": 1 }]
        })))
        .mount(provider)
        .await;
}
