//! OpenRouter SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! gateway-agnostic [`StreamEvent`] enum. Usage arrives in a final chunk
//! with an empty choices array (requires `stream_options.include_usage`
//! on the request).

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use async_openai::types::chat::ChatCompletionResponseStream;

use appforge_types::llm::{GatewayError, StreamEvent, Usage};

/// Map an async-openai [`ChatCompletionResponseStream`] to a stream of
/// [`StreamEvent`]s.
///
/// Emitted in order: `TextDelta` per content chunk, `Usage` once when
/// the provider reports it, `Done` at the end of the stream.
pub fn map_openrouter_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| GatewayError::Stream(e.to_string()))?;

            // The final chunk carries usage with an empty choices array.
            if let Some(usage) = chunk.usage.as_ref() {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "usage chunk received"
                );
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }

            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.clone() {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text };
                    }
                }
            }
        }

        yield StreamEvent::Done;
    })
}
