//! CompletionGateway trait definition.
//!
//! The abstraction over remote completion services. Uses RPITIT for
//! `complete` and `Pin<Box<dyn Stream>>` for `stream` (streams need to
//! be object-safe for the BoxCompletionGateway wrapper).

pub mod boxed;

use std::pin::Pin;

use futures_util::Stream;

use appforge_types::llm::{CompletionRequest, CompletionResponse, GatewayError, StreamEvent};

pub use boxed::BoxCompletionGateway;

/// Trait for remote completion backends.
///
/// Uses native async fn in traits (RPITIT) for `complete`. The `stream`
/// method returns a boxed stream because streams need to be object-safe
/// for `BoxCompletionGateway`.
///
/// Implementations live in appforge-infra (e.g. `OpenRouterClient`).
/// Failures surface as `GatewayError` with no automatic retry.
pub trait CompletionGateway: Send + Sync {
    /// Human-readable gateway name (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Send a completion request and receive the fully materialized response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, GatewayError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>>;
}
