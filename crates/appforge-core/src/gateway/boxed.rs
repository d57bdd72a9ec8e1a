//! BoxCompletionGateway -- object-safe dynamic dispatch wrapper.
//!
//! 1. Define an object-safe `CompletionGatewayDyn` trait with boxed futures
//! 2. Blanket-impl `CompletionGatewayDyn` for all `T: CompletionGateway`
//! 3. `BoxCompletionGateway` wraps `Box<dyn CompletionGatewayDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use appforge_types::llm::{CompletionRequest, CompletionResponse, GatewayError, StreamEvent};

use super::CompletionGateway;

/// Object-safe version of [`CompletionGateway`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation
/// covers every `CompletionGateway`.
pub trait CompletionGatewayDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, GatewayError>> + Send + 'a>>;

    fn stream_boxed(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>>;
}

impl<T: CompletionGateway> CompletionGatewayDyn for T {
    fn name(&self) -> &str {
        CompletionGateway::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, GatewayError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }

    fn stream_boxed(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>> {
        self.stream(request)
    }
}

/// Type-erased completion gateway.
///
/// Since `CompletionGateway` uses RPITIT it cannot be a trait object
/// directly; this wrapper provides equivalent methods that delegate to
/// the inner `CompletionGatewayDyn` object. Handlers and tests hold the
/// gateway through this type so the backing implementation can be
/// swapped (OpenRouter in production, mocks in tests).
pub struct BoxCompletionGateway {
    inner: Box<dyn CompletionGatewayDyn + Send + Sync>,
}

impl BoxCompletionGateway {
    /// Wrap a concrete `CompletionGateway` in a type-erased box.
    pub fn new<T: CompletionGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }

    /// Human-readable gateway name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.inner.complete_boxed(request).await
    }

    /// Send a streaming completion request. Returns a stream of events.
    pub fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>> {
        self.inner.stream_boxed(request)
    }
}
