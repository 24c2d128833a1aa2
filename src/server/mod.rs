//! HTTP boundary: auth resolution, chat routes, and router assembly.
//! The agent core stays transport-agnostic behind [`TurnRunner`].

pub mod auth;
pub mod routes;

pub use auth::{Authenticator, StaticTokenAuth};

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::TurnRunner;
use crate::store::ChatStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub runner: TurnRunner,
    pub store: Arc<dyn ChatStore>,
    pub auth: Arc<dyn Authenticator>,
}

/// Builds the API router.
pub fn configure(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(routes::chat))
        .route("/api/chats", get(routes::list_chats))
        .route("/api/chats/{chat_id}/messages", get(routes::list_messages))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
