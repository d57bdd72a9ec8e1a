//! Environment-driven application configuration.
//!
//! Everything the pipeline consumes directly lives here: completion
//! service credentials and default model, the token quota limit, the
//! fan-out roster, and the payment-webhook signing secret.

use secrecy::SecretString;

use crate::llm::ModelCandidate;

/// Default model when the caller supplies none.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default process-wide token limit (zero = unlimited).
pub const DEFAULT_TOKEN_LIMIT: u64 = 1_000_000;

/// Maximum output tokens per generation request.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Application configuration resolved from the environment.
#[derive(Clone)]
pub struct AppConfig {
    /// OpenRouter API key (`OPENROUTER_API_KEY`).
    pub openrouter_api_key: SecretString,
    /// Default completion model (`APPFORGE_DEFAULT_MODEL`).
    pub default_model: String,
    /// Process-wide token quota (`APPFORGE_TOKEN_LIMIT`, 0 = unlimited).
    pub token_limit: u64,
    /// Stripe webhook signing secret (`APPFORGE_STRIPE_WEBHOOK_SECRET`).
    pub stripe_webhook_secret: Option<SecretString>,
    /// Fixed candidate roster for multi-model fan-out.
    pub model_roster: Vec<ModelCandidate>,
}

impl AppConfig {
    /// Resolve configuration from environment variables.
    ///
    /// Missing `OPENROUTER_API_KEY` is an error; everything else has a
    /// default.
    pub fn from_env() -> Result<Self, String> {
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| "OPENROUTER_API_KEY is not set".to_string())?
            .into();

        let default_model = std::env::var("APPFORGE_DEFAULT_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let token_limit = match std::env::var("APPFORGE_TOKEN_LIMIT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("APPFORGE_TOKEN_LIMIT is not a number: '{raw}'"))?,
            Err(_) => DEFAULT_TOKEN_LIMIT,
        };

        let stripe_webhook_secret = std::env::var("APPFORGE_STRIPE_WEBHOOK_SECRET")
            .ok()
            .map(SecretString::from);

        Ok(Self {
            openrouter_api_key,
            default_model,
            token_limit,
            stripe_webhook_secret,
            model_roster: default_roster(),
        })
    }
}

/// The fixed fan-out roster.
///
/// Independent of the caller's primary model id, aside from the primary
/// being prioritized first when it appears here.
pub fn default_roster() -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new("openai/gpt-4o-mini", "GPT-4o Mini"),
        ModelCandidate::new("anthropic/claude-3.5-haiku", "Claude 3.5 Haiku"),
        ModelCandidate::new("meta-llama/llama-3.1-8b-instruct", "Llama 3.1 8B"),
        ModelCandidate::new("google/gemini-2.0-flash-001", "Gemini 2.0 Flash"),
    ]
}
