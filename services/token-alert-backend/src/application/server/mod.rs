pub mod routes;

use axum::routing::{IntoMakeService, Router};
use axum::Server;
use hyper::server::conn::AddrIncoming;
use std::net::TcpListener;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::coordinator::Coordinator;

pub type AppServer = Server<AddrIncoming, IntoMakeService<Router>>;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

pub fn new(listener: TcpListener, state: AppState) -> Result<AppServer, hyper::Error> {
    let router = Router::new()
        .merge(routes::routes(state))
        .layer(TraceLayer::new_for_http());

    let server = Server::from_tcp(listener)?.serve(router.into_make_service());

    Ok(server)
}
