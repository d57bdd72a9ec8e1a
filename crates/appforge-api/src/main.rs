//! Appforge API server binary.

mod http;
mod state;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use appforge_observe::{init_tracing, shutdown_tracing};
use appforge_types::config::AppConfig;

use crate::http::router::build_router;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "appforge", about = "AI app-builder chat API server")]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "APPFORGE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "APPFORGE_PORT", default_value_t = 8080)]
    port: u16,

    /// Directory for the SQLite database. Defaults to `~/.appforge`.
    #[arg(long, env = "APPFORGE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Emit OpenTelemetry spans to stdout alongside log output.
    #[arg(long, env = "APPFORGE_OTEL", default_value_t = false)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.otel).map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let state = AppState::init(&config, cli.data_dir).await?;
    let router = build_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, model = %config.default_model, "appforge api listening");

    axum::serve(listener, router).await.context("server error")?;

    shutdown_tracing();
    Ok(())
}
