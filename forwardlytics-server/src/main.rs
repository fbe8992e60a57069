//! Forwardlytics Server
//!
//! Accepts identify events over HTTP and forwards each one, synchronously and
//! in order, to every enabled integration.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use forwardlytics_core::config::SharedIntegrationConfig;
use forwardlytics_core::dispatcher::Dispatcher;
use forwardlytics_core::integrations::default_registry;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Forwardlytics - forward identify events to analytics integrations
#[derive(Parser, Debug)]
#[command(name = "forwardlytics-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./forwardlytics.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Shared key every identify request must carry
    #[arg(long, env = "FORWARDLYTICS_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting forwardlytics-server v{}", env!("CARGO_PKG_VERSION"));

    if args.api_key.is_empty() {
        tracing::error!("FORWARDLYTICS_API_KEY must not be empty");
        anyhow::bail!("FORWARDLYTICS_API_KEY must not be empty");
    }

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.listen;
    let integrations = SharedIntegrationConfig::new(loaded_config.integrations);

    // Register integrations
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("forwardlytics/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let registry = default_registry(&integrations, http_client)?;
    for (name, integration) in registry.iter() {
        tracing::info!(
            integration = name,
            enabled = integration.enabled(),
            "Integration registered"
        );
    }

    // Create application state
    let state = AppState::new(
        args.api_key,
        Dispatcher::new(Arc::new(registry)),
        integrations,
    );

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
