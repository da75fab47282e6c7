use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use studyplan_relay::{router, HttpPlanUpstream, RelayConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "studyplan-relay", version, about = "Relays assignment batches to the study-plan generator")]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Listening port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Plan generator base URL, e.g. http://127.0.0.1:5000
    #[arg(long, env = "UPSTREAM_URL", default_value = "http://backend-flask:5000")]
    upstream_url: String,

    /// Give up on the plan generator after this many seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    upstream_timeout_secs: u64,
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
    let config = RelayConfig {
        host: cli.host,
        port: cli.port,
        upstream_url: cli.upstream_url,
        upstream_timeout: Duration::from_secs(cli.upstream_timeout_secs),
    };

    info!("starting relay with config: {:?}", config);

    let upstream = HttpPlanUpstream::new(&config.upstream_url, config.upstream_timeout)?;
    let app = router(Arc::new(upstream));

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
