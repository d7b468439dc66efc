//! Service entry point.
//!
//! Startup order: tracing → config → metrics → breaker registry →
//! pipeline → HTTP server with graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::catalog::InMemoryCatalog;
use recommendation_service::config::{load_config, ServiceConfig};
use recommendation_service::observability::metrics;
use recommendation_service::recommend::{HttpRecommendationClient, RecommendationPipeline};
use recommendation_service::resilience::BreakerRegistry;
use recommendation_service::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "recommendation-service")]
#[command(about = "Related-books service with a resilient recommendation fetch", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommendation_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("recommendation-service v0.1.0 starting");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        engine_url = %config.engine.base_url,
        endpoint_style = ?config.engine.endpoint_style,
        call_budget_ms = config.timeouts.call_ms,
        breaker = %config.breaker.name,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let registry = BreakerRegistry::new();
    let breaker = registry.get_or_create(&config.breaker);

    let client = HttpRecommendationClient::new(&config.engine)?;
    let catalog = InMemoryCatalog::from_seed(&config.catalog.books);
    let pipeline = Arc::new(RecommendationPipeline::new(
        client,
        catalog,
        breaker,
        Duration::from_millis(config.timeouts.call_ms),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(&config, pipeline);
    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
