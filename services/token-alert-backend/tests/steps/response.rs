use cucumber::then;
use reqwest::StatusCode;
use speculoos::prelude::*;

use crate::state::TestWorld;

#[then("the response is 200 OK")]
fn response_is_ok(world: &mut TestWorld) {
    assert_that(&world.resp.as_ref().unwrap().status()).is_equal_to(StatusCode::OK);
}

#[then("the response is 202 Accepted")]
fn response_is_accepted(world: &mut TestWorld) {
    assert_that(&world.resp.as_ref().unwrap().status()).is_equal_to(StatusCode::ACCEPTED);
}

#[then("the response is 400 Bad Request")]
fn response_is_bad_request(world: &mut TestWorld) {
    assert_that(&world.resp.as_ref().unwrap().status()).is_equal_to(StatusCode::BAD_REQUEST);
}

#[then("the response is 401 Unauthorized")]
fn response_is_unauthorized(world: &mut TestWorld) {
    assert_that(&world.resp.as_ref().unwrap().status()).is_equal_to(StatusCode::UNAUTHORIZED);
}
