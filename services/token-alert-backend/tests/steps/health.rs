use cucumber::when;

use crate::state::TestWorld;

// Steps are defined with `given`, `when` and `then` attributes.
#[when("the user requests a health check")]
async fn health_check(world: &mut TestWorld) {
    let resp = world.app.get_health().await;
    world.resp = Some(resp);
}
