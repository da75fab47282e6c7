use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use studyplan_generator::{router, ChatClient, GeneratorConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "studyplan-generator", version, about = "Generates study plans with a chat-completion model")]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Listening port.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// API key for the chat-completion endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// OpenAI-compatible API root.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Model name sent with every request.
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    #[arg(long, default_value_t = 300)]
    max_tokens: u32,

    #[arg(long, default_value_t = 0.4)]
    temperature: f32,

    /// Per-call timeout for the chat endpoint, in seconds.
    #[arg(long, default_value_t = 60)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(!cli.api_key.trim().is_empty(), "OPENAI_API_KEY is empty");

    let config = GeneratorConfig {
        host: cli.host,
        port: cli.port,
        api_key: cli.api_key,
        api_base: cli.api_base,
        model: cli.model,
        max_tokens: cli.max_tokens,
        temperature: cli.temperature,
        request_timeout: Duration::from_secs(cli.request_timeout_secs),
    };

    info!("starting generator with config: {:?}", config);

    let chat = ChatClient::new(&config)?;
    let app = router(Arc::new(chat));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
