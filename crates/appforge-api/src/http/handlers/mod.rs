//! HTTP request handlers.

use axum::Json;
use serde_json::{Value, json};

pub mod chat;
pub mod history;
pub mod save_message;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
