use anyhow::{Context, Result};
use clap::Parser;
use llmgate_core::config::{self, GatewayConfig};
use llmgate_core::gateway::Gateway;
use llmgate_core::store::{ExhaustionStore, MemoryExhaustionStore, RedisExhaustionStore};
use llmgate_server::app;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "llmgate", version, about = "Failover gateway over a pool of API providers", long_about = None)]
struct Args {
    /// Path to a YAML or JSON configuration file. Without it the
    /// configuration is read from the environment (PROVIDERS_JSON,
    /// REDIS_URL, LISTEN_ADDR).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(short, long)]
    listen: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => {
            let config = if path.extension().is_some_and(|ext| ext == "json") {
                config::load_from_json(path)?
            } else {
                config::load_from_yaml(path)?
            };
            Ok(config)
        }
        None => config::load_from_env().context(
            "no --config given and environment configuration is incomplete",
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    let store: Arc<dyn ExhaustionStore> = match &config.store.redis_url {
        Some(url) => {
            info!(url = %url, "connecting exhaustion store to redis");
            Arc::new(RedisExhaustionStore::connect(url).await?)
        }
        None => {
            warn!("no redis_url configured, exhaustion records are per-process only");
            Arc::new(MemoryExhaustionStore::new())
        }
    };

    let gateway = Gateway::from_config(&config, store)?;

    info!(
        providers = gateway.pool_size(),
        listen = %config.server.listen_addr,
        "starting llmgate"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;

    axum::serve(listener, app(Arc::new(gateway))).await?;
    Ok(())
}
