//! OpenRouter completion gateway implementation.
//!
//! OpenRouter speaks the OpenAI chat completions protocol, so the client
//! is built on [`async_openai`] pointed at the OpenRouter base URL. The
//! client also owns quota accumulation: every completion's token usage
//! is recorded into the shared [`QuotaTracker`], for both materialized
//! and streamed responses.

pub mod streaming;

use std::pin::Pin;
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionStreamOptions,
    CreateChatCompletionRequest,
};
use async_openai::Client;
use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use appforge_core::gateway::CompletionGateway;
use appforge_core::quota::QuotaTracker;
use appforge_types::llm::{
    CompletionRequest, CompletionResponse, GatewayError, MessageRole, StreamEvent, Usage,
};

use self::streaming::map_openrouter_stream;

/// OpenRouter API base URL.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Completion client for the OpenRouter API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenRouterClient {
    client: Client<OpenAIConfig>,
    default_model: String,
    quota: Arc<QuotaTracker>,
}

impl OpenRouterClient {
    /// Create a client against the OpenRouter base URL.
    pub fn new(api_key: &SecretString, default_model: &str, quota: Arc<QuotaTracker>) -> Self {
        Self::with_base_url(api_key, OPENROUTER_BASE_URL, default_model, quota)
    }

    /// Create a client against an arbitrary OpenAI-compatible base URL.
    pub fn with_base_url(
        api_key: &SecretString,
        base_url: &str,
        default_model: &str,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);

        Self {
            client: Client::with_config(config),
            default_model: default_model.to_string(),
            quota,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> CreateChatCompletionRequest {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                msg.content.clone(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            })
            .collect();

        // Empty model means "use the configured default".
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        if stream {
            req.stream = Some(true);
            req.stream_options = Some(ChatCompletionStreamOptions {
                include_usage: Some(true),
                include_obfuscation: None,
            });
        }

        req
    }
}

impl CompletionGateway for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        let or_request = self.build_request(request, false);

        let response = self
            .client
            .chat()
            .create(or_request)
            .await
            .map_err(map_openrouter_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            model = %response.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "openrouter completion usage recorded"
        );
        self.quota.record(usage.total());

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            usage,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>> {
        let or_request = self.build_request(&request, true);

        // Clone for the 'static stream closure
        let client = self.client.clone();
        let quota = Arc::clone(&self.quota);

        Box::pin(async_stream::try_stream! {
            let or_stream = client
                .chat()
                .create_stream(or_request)
                .await
                .map_err(map_openrouter_error)?;

            let mut inner = map_openrouter_stream(or_stream);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                let event = event?;
                if let StreamEvent::Usage(usage) = &event {
                    tracing::debug!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "openrouter stream usage recorded"
                    );
                    quota.record(usage.total());
                }
                yield event;
            }
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`GatewayError`].
fn map_openrouter_error(err: async_openai::error::OpenAIError) -> GatewayError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                return GatewayError::AuthenticationFailed;
            }
            if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                return GatewayError::RateLimited {
                    retry_after_ms: None,
                };
            }
            if code == "invalid_request_error" || error_type == "invalid_request_error" {
                return GatewayError::InvalidRequest(api_err.message.clone());
            }
            GatewayError::Provider {
                message: api_err.message.clone(),
            }
        }
        OpenAIError::StreamError(msg) => GatewayError::Stream(msg.to_string()),
        OpenAIError::JSONDeserialize(e, _) => GatewayError::Provider {
            message: format!("response deserialization: {e}"),
        },
        other => GatewayError::Provider {
            message: other.to_string(),
        },
    }
}
