use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use documind_core::{Assistant, Config};
use documind_gateway::GatewayServer;
use documind_llm::any::AnyProvider;
use documind_llm::gemini::GeminiProvider;
use documind_memory::IndexStore;
use tokio::sync::watch;

#[derive(Parser)]
#[command(
    name = "documind",
    version,
    about = "Answer questions about indexed documents with Gemini"
)]
struct Cli {
    /// Path to the TOML config file (falls back to DOCUMIND_CONFIG, then config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config);
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.validate()?;

    let provider = create_provider(&config)?;
    let store = IndexStore::open(&config.storage.index_dir)
        .await
        .context("failed to open index store")?;
    if config.storage.clear_on_startup {
        store
            .clear()
            .await
            .context("failed to clear index store on startup")?;
    }

    let assistant = Arc::new(Assistant::new(
        store.clone(),
        config.retrieval.retriever(),
        config.retrieval.prompt_builder(),
        provider,
        config.llm.model.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        model = %config.llm.model,
        index_dir = %config.storage.index_dir.display(),
        top_k = config.retrieval.top_k,
        "starting documind"
    );

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        assistant,
        shutdown_rx,
    )
    .with_max_body_size(config.gateway.max_body_size)
    .with_cors(config.gateway.cors)
    .serve()
    .await?;

    if config.storage.clear_on_shutdown {
        match store.clear().await {
            Ok(removed) => tracing::info!(removed, "cleared index store on shutdown"),
            Err(e) => tracing::warn!("failed to clear index store on shutdown: {e}"),
        }
    }

    Ok(())
}

fn create_provider(config: &Config) -> anyhow::Result<Option<AnyProvider>> {
    let Some(api_key) = config.llm.api_key.as_ref() else {
        tracing::warn!("GEMINI_API_KEY not set, /api/chat will fail until it is configured");
        return Ok(None);
    };

    let provider = GeminiProvider::new(
        api_key.expose().to_owned(),
        config.llm.base_url.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .context("failed to create Gemini provider")?;
    Ok(Some(AnyProvider::Gemini(provider)))
}

fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    if let Ok(path) = std::env::var("DOCUMIND_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
