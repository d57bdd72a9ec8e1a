//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use appforge_core::chat::ChatService;
use appforge_core::fanout::FanOut;
use appforge_core::gateway::BoxCompletionGateway;
use appforge_core::quota::QuotaTracker;
use appforge_infra::openrouter::OpenRouterClient;
use appforge_infra::sqlite::chat::SqliteChatStore;
use appforge_infra::sqlite::pool::DatabasePool;
use appforge_types::config::AppConfig;
use appforge_types::llm::ModelCandidate;

/// State shared across all HTTP handlers.
///
/// Handlers hold the completion gateway through [`BoxCompletionGateway`]
/// so tests can swap in scripted implementations.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabasePool,
    pub chat_service: Arc<ChatService<SqliteChatStore>>,
    pub gateway: Arc<BoxCompletionGateway>,
    pub quota: Arc<QuotaTracker>,
    pub fanout: Arc<FanOut>,
    pub default_model: String,
    pub stripe_webhook_secret: Option<SecretString>,
}

impl AppState {
    /// Initialize production state: resolve the data directory, open the
    /// SQLite pools, and wire the OpenRouter gateway.
    pub async fn init(config: &AppConfig, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(appforge_infra::resolve_data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        let database_url = format!("sqlite://{}/appforge.db?mode=rwc", data_dir.display());
        let db = DatabasePool::new(&database_url)
            .await
            .context("opening database pools")?;

        let quota = Arc::new(QuotaTracker::new(config.token_limit));
        let gateway = BoxCompletionGateway::new(OpenRouterClient::new(
            &config.openrouter_api_key,
            &config.default_model,
            Arc::clone(&quota),
        ));

        Ok(Self::from_parts(
            db,
            gateway,
            quota,
            config.model_roster.clone(),
            config.default_model.clone(),
            config.stripe_webhook_secret.clone(),
        ))
    }

    /// Assemble state from pre-built parts. Tests use this to inject a
    /// scripted gateway and a temp-file database.
    pub fn from_parts(
        db: DatabasePool,
        gateway: BoxCompletionGateway,
        quota: Arc<QuotaTracker>,
        roster: Vec<ModelCandidate>,
        default_model: String,
        stripe_webhook_secret: Option<SecretString>,
    ) -> Self {
        let chat_service = Arc::new(ChatService::new(SqliteChatStore::new(db.clone())));
        Self {
            db,
            chat_service,
            gateway: Arc::new(gateway),
            quota,
            fanout: Arc::new(FanOut::new(roster)),
            default_model,
            stripe_webhook_secret,
        }
    }
}
