use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use banter::agent::{Agent, AgentConfig, TurnRunner};
use banter::config::Settings;
use banter::llm::ModelClientBuilder;
use banter::server::{self, AppState, StaticTokenAuth};
use banter::store::{ChatStore, SqliteStore};
use banter::tool::ToolExecutor;
use banter::tools;

/// Chat server: an assistant with weather and news tools.
#[derive(Debug, Parser)]
#[command(name = "banter-server")]
struct Args {
    /// Bind host (overrides BANTER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides BANTER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database path (overrides BANTER_DB)
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut settings = Settings::from_env()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(db) = args.db {
        settings.database_path = db;
    }

    let mut builder = ModelClientBuilder::new().with_api_key(settings.openai_api_key.clone());
    if let Some(base_url) = &settings.openai_base_url {
        builder = builder.with_base_url(base_url.clone());
    }
    let model_client = builder.build_openai()?;

    let registry = Arc::new(tools::default_registry(
        settings.weather_api_key.clone(),
        settings.news_api_key.clone(),
    ));
    info!(tools = registry.len(), "Tool registry ready");

    let agent = Agent::new(
        model_client,
        ToolExecutor::new(registry),
        AgentConfig {
            model: settings.model.clone(),
            system_prompt: settings.system_prompt.clone(),
            ..AgentConfig::default()
        },
    );
    let runner = TurnRunner::new(agent);

    let store: Arc<dyn ChatStore> = Arc::new(SqliteStore::new(&settings.database_path).await?);
    let auth: Arc<dyn server::Authenticator> =
        Arc::new(StaticTokenAuth::from_spec(&settings.auth_tokens));

    let app = server::configure(AppState {
        runner,
        store,
        auth,
    });

    let listener =
        tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
