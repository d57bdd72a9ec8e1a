//! Route table and middleware stack.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/save-message", post(handlers::save_message::save_message))
        .route("/chat/history", get(handlers::history::history))
        .route("/webhooks/stripe", post(handlers::webhook::stripe))
        .route("/webhooks/polar", post(handlers::webhook::polar));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
